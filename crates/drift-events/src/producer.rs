//! Producer capability handed to the engine
//!
//! The engine invokes the event callback synchronously from its own internal
//! threads, possibly nested. The handle here is the harness's side of that
//! callback: decode, register the transfer id, push. It must never block
//! (beyond the mailbox's O(1) critical section) and never panic — a payload
//! the harness cannot decode is logged and dropped, not raised into the
//! engine.

use std::sync::Arc;

use crate::event::Event;
use crate::mailbox::EventMailbox;
use crate::slots::SlotRegistry;
use crate::wire::RawEvent;

/// Cheaply cloneable callback handle feeding one peer's mailbox.
#[derive(Debug, Clone)]
pub struct EventProducer {
    mailbox: Arc<EventMailbox>,
    slots: Arc<SlotRegistry>,
}

impl EventProducer {
    /// Creates a producer feeding the given mailbox and registry.
    pub fn new(mailbox: Arc<EventMailbox>, slots: Arc<SlotRegistry>) -> Self {
        Self { mailbox, slots }
    }

    /// Engine callback entry point: decode a JSON payload and push it.
    ///
    /// Safe to call from any thread. Undecodable payloads are logged at
    /// error level and dropped; the callback never fails into the engine.
    pub fn on_event(&self, payload: &str) {
        match serde_json::from_str::<RawEvent>(payload) {
            Ok(raw) => self.on_raw(raw),
            Err(error) => {
                tracing::error!(%error, payload, "dropping undecodable event payload");
            }
        }
    }

    /// Pushes an already-decoded raw event.
    pub fn on_raw(&self, raw: RawEvent) {
        self.mailbox.push(Event::from_raw(raw, &self.slots));
    }
}

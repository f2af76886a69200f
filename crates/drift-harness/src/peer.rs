//! Per-peer harness context
//!
//! Each simulated peer owns an independent mailbox/registry pair and its own
//! engine instance; there is no cross-peer shared state in the harness.
//! Peer-to-peer correlation is the engine's concern and shows up here only
//! as events.

use std::sync::Arc;

use drift_events::{EventMailbox, EventProducer, SlotRegistry, WaitConfig, MISSING_ID};

use crate::engine::EngineHandle;
use crate::error::HarnessError;

/// One simulated peer: its event state and its engine command capability.
pub struct Peer {
    name: String,
    mailbox: Arc<EventMailbox>,
    slots: Arc<SlotRegistry>,
    engine: Box<dyn EngineHandle>,
}

impl Peer {
    /// Creates a peer with the default wait cadence.
    pub fn new(name: impl Into<String>, engine: Box<dyn EngineHandle>) -> Self {
        Self::with_config(name, engine, WaitConfig::default())
    }

    /// Creates a peer with an explicit wait cadence (tests shrink it).
    pub fn with_config(
        name: impl Into<String>,
        engine: Box<dyn EngineHandle>,
        config: WaitConfig,
    ) -> Self {
        Self {
            name: name.into(),
            mailbox: Arc::new(EventMailbox::with_config(config)),
            slots: Arc::new(SlotRegistry::new()),
            engine,
        }
    }

    /// The peer's logical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The peer's mailbox, for waits issued outside the action vocabulary.
    pub fn mailbox(&self) -> &EventMailbox {
        &self.mailbox
    }

    /// The peer's slot registry.
    pub fn slots(&self) -> &SlotRegistry {
        &self.slots
    }

    /// The engine command capability.
    pub fn engine(&self) -> &dyn EngineHandle {
        &*self.engine
    }

    /// Hands out the callback capability the engine invokes for every event.
    pub fn producer(&self) -> EventProducer {
        EventProducer::new(Arc::clone(&self.mailbox), Arc::clone(&self.slots))
    }

    /// Resolves a slot for an engine command.
    ///
    /// Unlike the diagnostics-only [`SlotRegistry::slot_to_id`], commands
    /// against an unassigned slot are scenario bugs and fail fast.
    pub fn resolve_slot(&self, slot: usize) -> Result<String, HarnessError> {
        let id = self.slots.slot_to_id(slot);
        if id == MISSING_ID {
            return Err(HarnessError::UnknownSlot { slot });
        }
        Ok(id)
    }
}

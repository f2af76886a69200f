//! Event correlation core for the Drift transfer verification harness
//!
//! The Drift engine is reached only through a callback-based foreign
//! interface: it pushes an unordered, concurrently produced stream of
//! life-cycle events. This crate turns that stream into something scenarios
//! can assert against:
//!
//! - [`event::Event`] — closed model of every life-cycle event with partial
//!   (wildcard-aware, multiset-aware) equality
//! - [`slots::SlotRegistry`] — first-seen virtualization of opaque transfer
//!   ids into small slots for readable assertions
//! - [`mailbox::EventMailbox`] — the FIFO buffer between the engine's
//!   callback threads and the scenario task, with the bounded-polling
//!   matching primitives (`wait_for`, `wait_racy`, `wait_for_any_event`,
//!   `gather_all`)
//! - [`wire::RawEvent`] / [`producer::EventProducer`] — the raw payload
//!   contract and the callback handle given to the engine
//!
//! Scenario sequencing lives in the `drift-harness` crate.

pub mod error;
pub mod event;
pub mod mailbox;
pub mod producer;
pub mod slots;
pub mod wire;

pub use error::MatchError;
pub use event::{Event, FileInfo};
pub use mailbox::{EventMailbox, NoiseFilter, WaitConfig};
pub use producer::EventProducer;
pub use slots::{SlotRegistry, MISSING_ID};
pub use wire::{RawEvent, RawFile, RawStatus};

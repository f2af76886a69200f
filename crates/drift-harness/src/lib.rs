//! Scenario driver for the Drift transfer verification harness
//!
//! Glue around the correlation core in `drift-events`: the opaque engine
//! command capability ([`EngineHandle`]), the per-peer context ([`Peer`]),
//! and the ordered action vocabulary ([`Action`]) that scenarios are written
//! in. The matching semantics themselves — fail-fast ordered waits, racy
//! multiset waits, silence windows — live in the core crate; this one only
//! sequences them.

pub mod action;
pub mod engine;
pub mod error;
pub mod logging;
pub mod peer;
pub mod scenario;

pub use action::Action;
pub use engine::EngineHandle;
pub use error::HarnessError;
pub use peer::Peer;
pub use scenario::Scenario;

// Scenario code matches on events and filters constantly; spare it the extra
// crate import.
pub use drift_events::{Event, FileInfo, MatchError, NoiseFilter, WaitConfig};

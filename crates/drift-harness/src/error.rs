//! Harness-level failures
//!
//! Any of these aborts the current scenario's action sequence for the peer
//! that hit it. Nothing is retried at this layer: engine-level retries are
//! the engine's own concern and surface only as additional or absent events.

use drift_events::{Event, MatchError};

/// A scenario action failed.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// A matching primitive reported a violation or timeout.
    #[error(transparent)]
    Match(#[from] MatchError),

    /// An engine command capability returned a failure.
    #[error("engine command failed: {message}")]
    Engine {
        /// Opaque failure description from the engine
        message: String,
    },

    /// An action referenced a slot the registry has never assigned.
    #[error("slot {slot} has no registered transfer id")]
    UnknownSlot {
        /// The unresolved slot
        slot: usize,
    },

    /// A silence assertion observed an event inside its window.
    #[error("expected silence, received:\n{event}")]
    UnexpectedEvent {
        /// The event that broke the silence
        event: Box<Event>,
    },
}

impl HarnessError {
    /// Wraps an opaque engine failure.
    pub fn engine(error: anyhow::Error) -> Self {
        Self::Engine {
            message: format!("{error:#}"),
        }
    }
}

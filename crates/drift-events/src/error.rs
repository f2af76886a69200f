//! Correlation failures
//!
//! Every variant is fatal to the scenario that hit it. The display strings
//! carry the full expected/actual/outstanding context so a failure can be
//! root-caused from the report alone, without re-running the scenario.

use crate::event::Event;

/// Renders an event list for error messages.
fn fmt_events(events: &[Event]) -> String {
    let entries: Vec<String> = events.iter().map(Event::to_string).collect();
    entries.join(", ")
}

/// A matching primitive detected a violation or ran out of polls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    /// An ordered wait dequeued an event that is not the expected one.
    #[error("events don't match\nexpected:\n{expected}\nreceived:\n{actual}")]
    Mismatch {
        /// The sole event the wait was looking for
        expected: Box<Event>,
        /// The surviving event actually dequeued
        actual: Box<Event>,
    },

    /// An unordered wait dequeued an event matching none of its remaining
    /// expectations.
    #[error(
        "unexpected event:\n{actual}\nwhile looking for (racy):\n{}",
        fmt_events(.outstanding)
    )]
    Unexpected {
        /// The surviving event actually dequeued
        actual: Box<Event>,
        /// Expectations still outstanding at that moment
        outstanding: Vec<Event>,
    },

    /// The poll bound elapsed with expectations still unmet.
    #[error("events not received, remained:\n{}", fmt_events(.outstanding))]
    Timeout {
        /// Expectations still outstanding when the bound elapsed
        outstanding: Vec<Event>,
    },
}

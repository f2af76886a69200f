//! Concurrent event mailbox and matching primitives
//!
//! The engine pushes events synchronously from its own threads; the scenario
//! task drains them through bounded polling waits. Two rules govern every
//! primitive here:
//!
//! - FIFO is absolute: arrival order is observation order, filtering only
//!   removes, never reorders.
//! - Fail fast on violation, retry only on emptiness. A wrong or unexpected
//!   event aborts the wait immediately; only an empty queue earns another
//!   poll. Ordered waits never silently skip an inconvenient event.
//!
//! Consumed events are never restored, even when the wait fails. The mailbox
//! grows without bound if nothing drains it.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::MatchError;
use crate::event::Event;

/// Poll cadence for the matching primitives.
///
/// The total timeout of a wait is `max_polls * poll_interval`. Both values
/// are part of the harness's behavioral contract with scenario authors, not
/// tuning knobs; tests shrink them to keep suites fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Suspension between two polls of an empty mailbox
    pub poll_interval: Duration,
    /// Number of polls before a wait gives up
    pub max_polls: u32,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_polls: 100,
        }
    }
}

/// Noise classes discarded while draining the mailbox.
///
/// Each flag marks a high-frequency event class as noise for the current
/// call; the default discards all four. Use [`NoiseFilter::none`] to keep
/// everything, or clear individual flags to assert on a normally-noisy
/// class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseFilter {
    /// Discard [`Event::Progress`]
    pub progress: bool,
    /// Discard [`Event::Throttled`]
    pub throttled: bool,
    /// Discard [`Event::FinalizeChecksumProgress`]
    pub finalize_checksum_progress: bool,
    /// Discard [`Event::VerifyChecksumProgress`]
    pub verify_checksum_progress: bool,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self {
            progress: true,
            throttled: true,
            finalize_checksum_progress: true,
            verify_checksum_progress: true,
        }
    }
}

impl NoiseFilter {
    /// Keeps every event: nothing is treated as noise.
    pub fn none() -> Self {
        Self {
            progress: false,
            throttled: false,
            finalize_checksum_progress: false,
            verify_checksum_progress: false,
        }
    }

    /// Default noise set, except progress events are kept.
    pub fn keep_progress() -> Self {
        Self {
            progress: false,
            ..Self::default()
        }
    }

    /// Whether `event` belongs to a class this filter discards.
    pub fn discards(&self, event: &Event) -> bool {
        match event {
            Event::Progress { .. } => self.progress,
            Event::Throttled { .. } => self.throttled,
            Event::FinalizeChecksumProgress { .. } => self.finalize_checksum_progress,
            Event::VerifyChecksumProgress { .. } => self.verify_checksum_progress,
            _ => false,
        }
    }
}

/// Insertion-ordered buffer between the engine callback and the scenario
/// task.
///
/// `push` may be called from any thread, including nested invocations from
/// inside the engine; it only ever takes the lock for the O(1) append. The
/// async waits suspend between polls with the lock released and never block
/// the producer.
#[derive(Debug, Default)]
pub struct EventMailbox {
    events: Mutex<VecDeque<Event>>,
    config: WaitConfig,
}

impl EventMailbox {
    /// Creates a mailbox with the default [`WaitConfig`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mailbox with an explicit poll cadence.
    pub fn with_config(config: WaitConfig) -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            config,
        }
    }

    /// The poll cadence this mailbox's waits run under.
    pub fn config(&self) -> WaitConfig {
        self.config
    }

    /// Appends an event. Producer side; never blocks beyond the critical
    /// section and never drops.
    pub fn push(&self, event: Event) {
        tracing::debug!(%event, "event received");
        self.events.lock().push_back(event);
    }

    /// Removes and returns the first event the filter keeps, permanently
    /// discarding every filtered event ahead of it. `None` when nothing
    /// survives.
    pub fn pop_surviving(&self, filter: &NoiseFilter) -> Option<Event> {
        let mut events = self.events.lock();
        while let Some(event) = events.pop_front() {
            if filter.discards(&event) {
                continue;
            }
            return Some(event);
        }
        None
    }

    /// Atomically discards all buffered events. Used between scenario phases
    /// to drop stale signals.
    pub fn clear(&self) {
        let dropped = {
            let mut events = self.events.lock();
            let dropped = events.len();
            events.clear();
            dropped
        };
        if dropped > 0 {
            tracing::debug!(dropped, "mailbox cleared");
        }
    }

    /// Atomically swaps out and returns the entire buffer, unfiltered and in
    /// arrival order.
    pub fn take_all(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock()).into()
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Waits for exactly `target` to arrive next among surviving events.
    ///
    /// The first surviving event decides the call: equal to `target` means
    /// success, anything else is [`MatchError::Mismatch`] immediately — a
    /// mismatch is never transient, even if the target arrives later.
    /// Only an empty mailbox is retried, up to the poll bound;
    /// exhausting it is [`MatchError::Timeout`].
    pub async fn wait_for(&self, target: &Event, filter: &NoiseFilter) -> Result<(), MatchError> {
        for _ in 0..self.config.max_polls {
            if let Some(actual) = self.pop_surviving(filter) {
                if actual == *target {
                    tracing::debug!(event = %actual, "matched expected event");
                    return Ok(());
                }
                tracing::warn!(expected = %target, %actual, "event mismatch");
                return Err(MatchError::Mismatch {
                    expected: Box::new(target.clone()),
                    actual: Box::new(actual),
                });
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }

        tracing::warn!(expected = %target, "wait_for timed out");
        Err(MatchError::Timeout {
            outstanding: vec![target.clone()],
        })
    }

    /// Waits for every event in `targets`, in any arrival order.
    ///
    /// Keeps a remaining multiset of expectations; each surviving event must
    /// match one of them (first equal element wins and is removed) or the
    /// call fails with [`MatchError::Unexpected`] immediately. Succeeds the
    /// moment the multiset empties, without consuming further queued events.
    /// Exhausting the poll bound with expectations left is
    /// [`MatchError::Timeout`], listing what remains.
    pub async fn wait_racy(
        &self,
        targets: &[Event],
        filter: &NoiseFilter,
    ) -> Result<(), MatchError> {
        let mut remaining: Vec<Event> = targets.to_vec();
        if remaining.is_empty() {
            return Ok(());
        }

        for _ in 0..self.config.max_polls {
            while let Some(actual) = self.pop_surviving(filter) {
                match remaining.iter().position(|expected| *expected == actual) {
                    Some(index) => {
                        tracing::debug!(event = %actual, "matched racy expectation");
                        remaining.remove(index);
                        if remaining.is_empty() {
                            return Ok(());
                        }
                    }
                    None => {
                        tracing::warn!(%actual, "unexpected event during racy wait");
                        return Err(MatchError::Unexpected {
                            actual: Box::new(actual),
                            outstanding: remaining,
                        });
                    }
                }
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }

        tracing::warn!(outstanding = remaining.len(), "wait_racy timed out");
        Err(MatchError::Timeout {
            outstanding: remaining,
        })
    }

    /// Returns the first surviving event to arrive within `duration`, or
    /// `None` if the window closes in silence. Used to assert quiet periods;
    /// the caller decides whether an arrival is a failure.
    pub async fn wait_for_any_event(
        &self,
        duration: Duration,
        filter: &NoiseFilter,
    ) -> Option<Event> {
        let deadline = tokio::time::Instant::now() + duration;
        loop {
            if let Some(event) = self.pop_surviving(filter) {
                return Some(event);
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Sleeps for the full `duration`, then atomically returns everything
    /// that accumulated, unfiltered.
    ///
    /// For phases where exact correlation is impossible (nondeterministic
    /// final paths, bulk restarts); the caller inspects the history
    /// structurally.
    pub async fn gather_all(&self, duration: Duration) -> Vec<Event> {
        tokio::time::sleep(duration).await;
        self.take_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(slot: usize, transferred: u64) -> Event {
        Event::Progress {
            slot,
            file: "f1".to_string(),
            transferred: Some(transferred),
        }
    }

    fn start(slot: usize) -> Event {
        Event::Start {
            slot,
            file: "f1".to_string(),
            transferred: None,
        }
    }

    #[test]
    fn pop_surviving_discards_noise_ahead_of_the_survivor() {
        let mailbox = EventMailbox::new();
        mailbox.push(progress(0, 5));
        mailbox.push(progress(0, 10));
        mailbox.push(start(0));

        let filter = NoiseFilter::default();
        assert_eq!(mailbox.pop_surviving(&filter), Some(start(0)));
        // The filtered events are gone for good.
        assert!(mailbox.is_empty());
    }

    #[test]
    fn pop_surviving_preserves_fifo() {
        let mailbox = EventMailbox::new();
        mailbox.push(start(0));
        mailbox.push(progress(0, 5));
        mailbox.push(start(1));

        let keep_all = NoiseFilter::none();
        assert_eq!(mailbox.pop_surviving(&keep_all), Some(start(0)));
        assert_eq!(mailbox.pop_surviving(&keep_all), Some(progress(0, 5)));
        assert_eq!(mailbox.pop_surviving(&keep_all), Some(start(1)));
        assert_eq!(mailbox.pop_surviving(&keep_all), None);
    }

    #[test]
    fn take_all_returns_everything_unfiltered() {
        let mailbox = EventMailbox::new();
        mailbox.push(progress(0, 5));
        mailbox.push(start(0));

        let drained = mailbox.take_all();
        assert_eq!(drained, vec![progress(0, 5), start(0)]);
        assert!(mailbox.is_empty());
    }

    #[test]
    fn clear_discards_everything() {
        let mailbox = EventMailbox::new();
        mailbox.push(start(0));
        mailbox.push(start(1));
        mailbox.clear();
        assert!(mailbox.is_empty());
    }

    #[test]
    fn filter_classes_toggle_independently() {
        let throttled = Event::Throttled {
            slot: 0,
            file: "f1".to_string(),
            transferred: None,
        };
        let verify = Event::VerifyChecksumProgress {
            slot: 0,
            file: "f1".to_string(),
            bytes: None,
        };

        let keep_progress = NoiseFilter::keep_progress();
        assert!(!keep_progress.discards(&progress(0, 5)));
        assert!(keep_progress.discards(&throttled));
        assert!(keep_progress.discards(&verify));

        assert!(!NoiseFilter::none().discards(&progress(0, 5)));
        assert!(NoiseFilter::default().discards(&verify));
        assert!(!NoiseFilter::default().discards(&start(0)));
    }
}

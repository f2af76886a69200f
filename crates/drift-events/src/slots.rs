//! Transfer id virtualization
//!
//! The engine reports transfers under opaque ids (UUID strings). Scenarios
//! assert against small sequential slots instead, assigned in first-seen
//! order. One registry exists per simulated peer; it only ever grows.

use parking_lot::Mutex;

/// Sentinel returned when a slot was never assigned.
pub const MISSING_ID: &str = "MISSING";

/// Append-only map from opaque transfer id to a small sequential slot.
///
/// Safe to share between the engine's callback thread (registering ids while
/// decoding raw events) and the scenario task (resolving slots for commands).
/// The lock is only ever held for the O(1) mutation or lookup.
#[derive(Debug, Default)]
pub struct SlotRegistry {
    ids: Mutex<Vec<String>>,
}

impl SlotRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `id`, assigning the next free slot if the id has
    /// not been seen before.
    ///
    /// Slot assignment is deterministic: replaying the same first-seen order
    /// yields the same slots, and a known id always keeps its original slot.
    pub fn register_if_new(&self, id: &str) -> usize {
        let mut ids = self.ids.lock();
        match ids.iter().position(|known| known == id) {
            Some(slot) => slot,
            None => {
                let slot = ids.len();
                ids.push(id.to_string());
                tracing::debug!(slot, id, "assigned transfer slot");
                slot
            }
        }
    }

    /// Resolves a slot back to its transfer id, or the [`MISSING_ID`]
    /// sentinel when the slot was never assigned. Diagnostics only, never
    /// fails.
    pub fn slot_to_id(&self, slot: usize) -> String {
        self.ids
            .lock()
            .get(slot)
            .cloned()
            .unwrap_or_else(|| MISSING_ID.to_string())
    }

    /// Human-readable form of a slot for logs and error messages.
    pub fn describe(&self, slot: usize) -> String {
        format!("{} (slot {slot})", self.slot_to_id(slot))
    }

    /// Number of slots assigned so far.
    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    /// Whether no slot has been assigned yet.
    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_follow_first_seen_order() {
        let registry = SlotRegistry::new();
        assert_eq!(registry.register_if_new("xf-b"), 0);
        assert_eq!(registry.register_if_new("xf-a"), 1);
        assert_eq!(registry.register_if_new("xf-c"), 2);

        // Known ids keep their original slot.
        assert_eq!(registry.register_if_new("xf-a"), 1);
        assert_eq!(registry.register_if_new("xf-b"), 0);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn replay_yields_identical_assignment() {
        let ids = ["one", "two", "one", "three", "two"];
        let first = SlotRegistry::new();
        let second = SlotRegistry::new();

        let slots_a: Vec<usize> = ids.iter().map(|id| first.register_if_new(id)).collect();
        let slots_b: Vec<usize> = ids.iter().map(|id| second.register_if_new(id)).collect();
        assert_eq!(slots_a, slots_b);
        assert_eq!(slots_a, vec![0, 1, 0, 2, 1]);
    }

    #[test]
    fn unknown_slot_resolves_to_sentinel() {
        let registry = SlotRegistry::new();
        registry.register_if_new("xf-a");

        assert_eq!(registry.slot_to_id(0), "xf-a");
        assert_eq!(registry.slot_to_id(7), MISSING_ID);
        assert_eq!(registry.describe(7), "MISSING (slot 7)");
    }
}

//! In-flight tracking
//!
//! Records which jobs are currently inside the engine so the shutdown
//! drain can recover them. Slot ids are caller-assigned and unique for
//! the life of the process. Insert, remove, and enumeration are
//! synchronized; nothing awaits while the lock is held.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Tracks jobs handed to the engine but not yet completed
pub struct InFlightTracker {
    entries: Mutex<HashMap<u64, String>>,
    next_slot: AtomicU64,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_slot: AtomicU64::new(0),
        }
    }

    /// Reserves a fresh slot id
    pub fn reserve_slot(&self) -> u64 {
        self.next_slot.fetch_add(1, Ordering::Relaxed)
    }

    /// Records a job under the given slot
    pub fn insert(&self, slot: u64, url: &str) {
        self.entries.lock().unwrap().insert(slot, url.to_string());
    }

    /// Removes a completed job; returns its URL if the slot was still
    /// tracked with one (drained entries return `None`)
    pub fn remove(&self, slot: u64) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .remove(&slot)
            .filter(|url| !url.is_empty())
    }

    /// Number of jobs currently in flight; drained entries excluded
    pub fn active_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap()
            .values()
            .filter(|url| !url.is_empty())
            .count()
    }

    /// Returns every in-flight URL and blanks the entries, so a second
    /// enumeration cannot double-count. Slot keys are retained.
    pub fn drain_urls(&self) -> Vec<String> {
        let mut entries = self.entries.lock().unwrap();
        let mut urls = Vec::new();
        for value in entries.values_mut() {
            if !value.is_empty() {
                urls.push(std::mem::take(value));
            }
        }
        urls
    }
}

impl Default for InFlightTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_slot_is_unique() {
        let tracker = InFlightTracker::new();
        let a = tracker.reserve_slot();
        let b = tracker.reserve_slot();
        assert_ne!(a, b);
    }

    #[test]
    fn test_insert_and_remove() {
        let tracker = InFlightTracker::new();
        let slot = tracker.reserve_slot();

        tracker.insert(slot, "https://example.com/a");
        assert_eq!(tracker.active_count(), 1);

        let url = tracker.remove(slot);
        assert_eq!(url, Some("https://example.com/a".to_string()));
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn test_remove_unknown_slot() {
        let tracker = InFlightTracker::new();
        assert_eq!(tracker.remove(42), None);
    }

    #[test]
    fn test_drain_returns_all_urls_once() {
        let tracker = InFlightTracker::new();
        for i in 0..3 {
            let slot = tracker.reserve_slot();
            tracker.insert(slot, &format!("https://example.com/{}", i));
        }

        let first = tracker.drain_urls();
        assert_eq!(first.len(), 3);
        assert_eq!(tracker.active_count(), 0);

        // Entries were blanked, so a second drain finds nothing
        let second = tracker.drain_urls();
        assert!(second.is_empty());
    }

    #[test]
    fn test_remove_after_drain_returns_none() {
        let tracker = InFlightTracker::new();
        let slot = tracker.reserve_slot();
        tracker.insert(slot, "https://example.com/a");

        tracker.drain_urls();
        assert_eq!(tracker.remove(slot), None);
    }
}

//! Completion tracking.
//!
//! Tracks which keys have a fetch in flight and the batch lifecycle. A
//! settled key is removed from the outstanding map outright, so "anything
//! outstanding" is simply "map is non-empty".
//!
//! The pending queue is owned by the controller; its length is passed in
//! wherever exhaustion is evaluated.

use std::collections::HashMap;

use seqload_core::{BatchState, LoaderEvent, ResourceKey, ResultSummary};

use crate::dispatcher::EventDispatcher;

/// Outstanding fetch counts and batch state.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    outstanding: HashMap<ResourceKey, u32>,
    state: BatchState,
}

impl CompletionTracker {
    /// Create a tracker in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current batch state.
    pub const fn state(&self) -> BatchState {
        self.state
    }

    /// Number of keys with a fetch in flight.
    pub fn outstanding_len(&self) -> usize {
        self.outstanding.len()
    }

    /// Whether `key` has a fetch in flight.
    pub fn is_outstanding(&self, key: &ResourceKey) -> bool {
        self.outstanding.contains_key(key)
    }

    /// Record a fetch issued for `key`.
    pub fn mark_outstanding(&mut self, key: &ResourceKey) {
        *self.outstanding.entry(key.clone()).or_insert(0) += 1;
    }

    /// Record that the fetch for `key` settled.
    ///
    /// Removes the key entirely rather than decrementing it. Returns `false`
    /// if the key was not outstanding.
    pub fn mark_settled(&mut self, key: &ResourceKey) -> bool {
        self.outstanding.remove(key).is_some()
    }

    /// Enter the running state (from idle or finished).
    pub const fn begin(&mut self) {
        self.state = BatchState::Running;
    }

    /// Nothing outstanding and nothing pending.
    pub fn is_exhausted(&self, pending_len: usize) -> bool {
        self.outstanding.is_empty() && pending_len == 0
    }

    /// Finish the batch if it is running and exhausted.
    ///
    /// Fires `complete` exactly once per running → finished transition.
    /// A no-op in the idle and finished states. Returns `true` if the batch
    /// finished on this call.
    pub fn recompute_and_notify<F>(
        &mut self,
        pending_len: usize,
        dispatcher: &mut EventDispatcher,
        summary: F,
    ) -> bool
    where
        F: FnOnce() -> ResultSummary,
    {
        if self.state != BatchState::Running || !self.is_exhausted(pending_len) {
            return false;
        }

        self.state = BatchState::Finished;
        dispatcher.emit(&LoaderEvent::Complete { summary: summary() });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_dispatcher() -> (EventDispatcher, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = EventDispatcher::new();
        let seen = Arc::clone(&count);
        dispatcher.on(
            "complete",
            Box::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (dispatcher, count)
    }

    #[test]
    fn test_outstanding_counts_and_removal() {
        let mut tracker = CompletionTracker::new();
        let key = ResourceKey::from("a.bin");

        tracker.mark_outstanding(&key);
        tracker.mark_outstanding(&key);
        assert!(tracker.is_outstanding(&key));
        assert_eq!(tracker.outstanding_len(), 1);

        // Settling removes the key even with a count above one
        assert!(tracker.mark_settled(&key));
        assert!(!tracker.is_outstanding(&key));
        assert_eq!(tracker.outstanding_len(), 0);
        assert!(!tracker.mark_settled(&key));
    }

    #[test]
    fn test_exhaustion_requires_empty_queue() {
        let mut tracker = CompletionTracker::new();
        assert!(tracker.is_exhausted(0));
        assert!(!tracker.is_exhausted(1));

        tracker.mark_outstanding(&ResourceKey::from("a.bin"));
        assert!(!tracker.is_exhausted(0));
    }

    #[test]
    fn test_idle_never_finishes() {
        let (mut dispatcher, count) = counting_dispatcher();
        let mut tracker = CompletionTracker::new();

        assert!(!tracker.recompute_and_notify(0, &mut dispatcher, ResultSummary::default));
        assert_eq!(tracker.state(), BatchState::Idle);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_complete_fires_once_per_transition() {
        let (mut dispatcher, count) = counting_dispatcher();
        let mut tracker = CompletionTracker::new();
        let key = ResourceKey::from("a.bin");

        tracker.begin();
        tracker.mark_outstanding(&key);
        assert!(!tracker.recompute_and_notify(0, &mut dispatcher, ResultSummary::default));

        tracker.mark_settled(&key);
        assert!(tracker.recompute_and_notify(0, &mut dispatcher, ResultSummary::default));
        assert!(!tracker.recompute_and_notify(0, &mut dispatcher, ResultSummary::default));
        assert_eq!(tracker.state(), BatchState::Finished);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // New work re-enters running and can finish again
        tracker.begin();
        assert!(tracker.recompute_and_notify(0, &mut dispatcher, ResultSummary::default));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_summary_only_built_on_transition() {
        let (mut dispatcher, _count) = counting_dispatcher();
        let mut tracker = CompletionTracker::new();
        tracker.begin();

        let built = AtomicUsize::new(0);
        let summary = || {
            built.fetch_add(1, Ordering::SeqCst);
            ResultSummary::default()
        };
        tracker.recompute_and_notify(3, &mut dispatcher, summary);
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }
}

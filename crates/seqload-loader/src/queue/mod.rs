//! Pending queue.
//!
//! A plain FIFO of descriptors awaiting dispatch. Insertion order is
//! dispatch order; the only mutations are append (enqueue) and remove-head
//! (drain). No reordering, no dedup: duplicate keys are filtered at dispatch
//! time by the controller, not here.
//!
//! # Design
//!
//! - Pure synchronous container (no async, no IO, no tracing)
//! - The controller owns it exclusively; no internal locking

use std::collections::VecDeque;

use seqload_core::{ResourceDescriptor, ResourceKey};

/// FIFO of descriptors awaiting dispatch.
#[derive(Debug, Default)]
pub struct PendingQueue {
    items: VecDeque<ResourceDescriptor>,
}

impl PendingQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Number of descriptors waiting.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append descriptors, preserving their order.
    ///
    /// Returns how many were appended.
    pub fn extend<I>(&mut self, descriptors: I) -> usize
    where
        I: IntoIterator<Item = ResourceDescriptor>,
    {
        let before = self.items.len();
        self.items.extend(descriptors);
        self.items.len() - before
    }

    /// Remove and return the head of the queue.
    pub fn pop_front(&mut self) -> Option<ResourceDescriptor> {
        self.items.pop_front()
    }

    /// Whether any waiting descriptor has this key.
    pub fn contains_key(&self, key: &ResourceKey) -> bool {
        self.items.iter().any(|item| &item.key == key)
    }

    /// Keys in dispatch order.
    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.items.iter().map(|item| &item.key)
    }
}

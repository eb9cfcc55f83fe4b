//! Queue controller.
//!
//! A synchronous state machine that owns the pending queue, completion
//! tracker, result store and event dispatcher. It performs no I/O: every
//! operation that may start a fetch returns the descriptor to fetch, and the
//! caller reports the outcome back through [`QueueController::settle`].
//!
//! # Drain
//!
//! Draining pops descriptors off the head of the queue until one needs a
//! real fetch. A descriptor is skipped when its key is already outstanding
//! or already loaded. The loop stops at the first real fetch, so at most one
//! fetch is ever in flight, and it never drains while cancelled.
//!
//! Every settlement continues the drain. Completion is recomputed exactly
//! once per settlement, after the per-item event, so `complete` is always the
//! last event of a batch.

mod trace;

use std::sync::Arc;

use bytes::Bytes;

use seqload_core::{
    BatchState, DecoratorPort, EventName, FetchError, LoaderConfig, LoaderEvent, LoaderStatus,
    ResourceDescriptor, ResourceKey,
};

use crate::completion::CompletionTracker;
use crate::dispatcher::{EventDispatcher, EventHandler};
use crate::queue::PendingQueue;
use crate::store::{LoadedRecord, ResultStore};

pub use trace::DebugTrace;

/// Orchestrates the one-at-a-time drain of a pending queue.
///
/// All state is owned by this value; there is no internal locking. The
/// async runner in this crate owns one exclusively.
pub struct QueueController {
    config: LoaderConfig,
    decorator: Arc<dyn DecoratorPort>,
    pending: PendingQueue,
    tracker: CompletionTracker,
    store: ResultStore,
    dispatcher: EventDispatcher,
    in_flight: Option<ResourceKey>,
    cancelled: bool,
    traces: Vec<DebugTrace>,
}

impl QueueController {
    /// Create a controller.
    ///
    /// With `auto_start` set the controller calls `start()` immediately,
    /// which on a fresh controller only records the empty-queue trace.
    pub fn new(config: LoaderConfig, decorator: Arc<dyn DecoratorPort>) -> Self {
        let auto_start = config.auto_start;
        let mut controller = Self {
            config,
            decorator,
            pending: PendingQueue::new(),
            tracker: CompletionTracker::new(),
            store: ResultStore::new(),
            dispatcher: EventDispatcher::new(),
            in_flight: None,
            cancelled: false,
            traces: Vec::new(),
        };
        if auto_start {
            // Nothing can be queued yet, so this never yields a fetch
            let _ = controller.start();
        }
        controller
    }

    /// The configuration this controller was built with.
    pub const fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Register `handler` for `name`, replacing any previous handler.
    ///
    /// Returns `true` if a previous handler was replaced.
    pub fn on(&mut self, name: impl Into<EventName>, handler: EventHandler) -> bool {
        self.dispatcher.on(name, handler)
    }

    /// Remove the handler for `name`.
    pub fn off(&mut self, name: &EventName) -> bool {
        self.dispatcher.off(name)
    }

    /// Append descriptors to the queue, preserving order.
    ///
    /// Dropped silently (with a debug trace) once cancelled. If the batch is
    /// not running, this starts it and returns the first descriptor to fetch.
    /// While running, the new items wait behind the fetch in flight.
    pub fn enqueue<I>(&mut self, descriptors: I) -> Option<ResourceDescriptor>
    where
        I: IntoIterator<Item = ResourceDescriptor>,
    {
        if self.cancelled {
            let dropped = descriptors.into_iter().count();
            self.trace(None, format!("enqueue after cancel: dropped {dropped} item(s)"));
            return None;
        }

        let added = self.pending.extend(descriptors);
        tracing::debug!(
            target: "seqload.loader",
            added,
            pending = self.pending.len(),
            state = %self.tracker.state(),
            "Enqueued"
        );

        if self.tracker.state() == BatchState::Running {
            None
        } else {
            self.start()
        }
    }

    /// Start draining the queue.
    ///
    /// On an empty queue this only records a debug trace and leaves the
    /// batch state alone. Returns the descriptor to fetch, if any.
    pub fn start(&mut self) -> Option<ResourceDescriptor> {
        if self.pending.is_empty() {
            self.trace(None, "start() called on empty queue");
            return None;
        }
        if self.cancelled {
            self.trace(None, "start() called after cancel");
            return None;
        }

        self.tracker.begin();
        let next = self.drain();
        self.recompute();
        next
    }

    /// Stop draining.
    ///
    /// A fetch already in flight is not aborted; its settlement is processed
    /// normally. Queued items stay queued but are never dispatched.
    pub fn cancel(&mut self) {
        if !self.cancelled {
            tracing::info!(
                target: "seqload.loader",
                pending = self.pending.len(),
                in_flight = ?self.in_flight.as_ref().map(ResourceKey::as_str),
                "Loader cancelled"
            );
        }
        self.cancelled = true;
    }

    /// Whether `cancel()` has been called.
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Nothing outstanding and nothing queued.
    pub fn is_complete(&self) -> bool {
        self.tracker.is_exhausted(self.pending.len())
    }

    /// Current batch state.
    pub const fn state(&self) -> BatchState {
        self.tracker.state()
    }

    /// Key of the fetch currently in flight.
    pub const fn in_flight(&self) -> Option<&ResourceKey> {
        self.in_flight.as_ref()
    }

    /// Whether a descriptor with this key is waiting in the queue.
    pub fn is_queued(&self, key: &ResourceKey) -> bool {
        self.pending.contains_key(key)
    }

    /// Keys waiting in the queue, in dispatch order.
    pub fn pending_keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.pending.keys()
    }

    /// Report the outcome of the fetch issued for `descriptor`.
    ///
    /// Updates the store, fires `itemLoaded` or `itemError`, continues the
    /// drain and recomputes completion. Returns the next descriptor to
    /// fetch, if any.
    pub fn settle(
        &mut self,
        descriptor: &ResourceDescriptor,
        outcome: Result<Bytes, FetchError>,
    ) -> Option<ResourceDescriptor> {
        let key = &descriptor.key;
        if self.in_flight.as_ref() != Some(key) {
            self.trace(Some(key), "settlement for a fetch that is not in flight; ignored");
            return None;
        }
        self.in_flight = None;
        self.tracker.mark_settled(key);

        match outcome {
            Ok(raw) => self.on_loaded(descriptor, raw),
            Err(error) => self.on_failed(descriptor, error),
        }

        let next = self.drain();
        self.recompute();
        next
    }

    /// Emit a caller-defined event through the dispatcher.
    ///
    /// Returns `true` if a handler ran.
    pub fn emit_custom(&mut self, name: impl Into<String>, payload: serde_json::Value) -> bool {
        self.dispatcher.emit(&LoaderEvent::Custom {
            name: name.into(),
            payload,
        })
    }

    /// Settled results.
    pub const fn results(&self) -> &ResultStore {
        &self.store
    }

    /// Point-in-time status.
    pub fn status(&self) -> LoaderStatus {
        LoaderStatus {
            state: self.tracker.state(),
            pending: self.pending.len(),
            outstanding: self.tracker.outstanding_len(),
            cancelled: self.cancelled,
            results: self.store.summary(),
        }
    }

    /// Traces recorded while `debug` is enabled, oldest first.
    pub fn debug_traces(&self) -> &[DebugTrace] {
        &self.traces
    }

    fn on_loaded(&mut self, descriptor: &ResourceDescriptor, raw: Bytes) {
        let handle = self.decorator.decorate(descriptor, &raw);
        tracing::debug!(
            target: "seqload.loader",
            key = %descriptor.key,
            bytes = raw.len(),
            mime = %handle.mime,
            "Resource loaded"
        );

        self.store.put_loaded(
            raw,
            LoadedRecord {
                descriptor: descriptor.clone(),
                handle: handle.clone(),
            },
        );
        self.dispatcher.emit(&LoaderEvent::ItemLoaded {
            result: handle,
            item: descriptor.clone(),
        });
    }

    fn on_failed(&mut self, descriptor: &ResourceDescriptor, error: FetchError) {
        self.store.append_error(&descriptor.key, error.clone());
        self.trace(Some(&descriptor.key), format!("fetch failed: {error}"));
        self.dispatcher
            .emit(&LoaderEvent::item_error(descriptor.clone(), error));
    }

    /// Pop descriptors until one needs a real fetch.
    fn drain(&mut self) -> Option<ResourceDescriptor> {
        while !self.cancelled && self.in_flight.is_none() {
            let item = self.pending.pop_front()?;

            if self.tracker.is_outstanding(&item.key) {
                tracing::debug!(target: "seqload.loader", key = %item.key, "Skipping: already outstanding");
                continue;
            }
            if self.store.has_loaded(&item.key) {
                tracing::debug!(target: "seqload.loader", key = %item.key, "Skipping: already loaded");
                continue;
            }

            tracing::debug!(
                target: "seqload.loader",
                key = %item.key,
                remaining = self.pending.len(),
                "Dispatching fetch"
            );
            self.tracker.mark_outstanding(&item.key);
            self.in_flight = Some(item.key.clone());
            return Some(item);
        }
        None
    }

    fn recompute(&mut self) {
        let store = &self.store;
        let finished = self.tracker.recompute_and_notify(
            self.pending.len(),
            &mut self.dispatcher,
            || store.summary(),
        );
        if finished {
            let summary = self.store.summary();
            tracing::info!(
                target: "seqload.loader",
                loaded = summary.loaded,
                errored = summary.errored,
                "Batch complete"
            );
        }
    }

    fn trace(&mut self, key: Option<&ResourceKey>, message: impl Into<String>) {
        let message = message.into();
        if self.config.debug {
            tracing::warn!(
                target: "seqload.loader",
                key = ?key.map(ResourceKey::as_str),
                "{message}"
            );
            self.traces.push(DebugTrace::new(key.cloned(), message));
        } else {
            tracing::debug!(
                target: "seqload.loader",
                key = ?key.map(ResourceKey::as_str),
                "{message}"
            );
        }
    }
}

impl std::fmt::Debug for QueueController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueController")
            .field("config", &self.config)
            .field("status", &self.status())
            .field("in_flight", &self.in_flight)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

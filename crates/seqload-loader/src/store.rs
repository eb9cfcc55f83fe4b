//! Result storage.
//!
//! Holds, per key, the raw payload and decorated record of a successful
//! fetch, plus an append-only error history. Nothing is ever evicted; the
//! store lives as long as its controller and cleanup is left to the caller.
//!
//! Keys are kept in settlement order so listings are deterministic.

use bytes::Bytes;
use indexmap::IndexMap;

use seqload_core::{FetchError, MediaHandle, ResourceDescriptor, ResourceKey, ResultSummary};

/// The decorated result of a successful fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedRecord {
    /// The descriptor as it was enqueued.
    pub descriptor: ResourceDescriptor,
    /// The handle produced by the decorator.
    pub handle: MediaHandle,
}

/// Loaded payloads and error histories keyed by resource.
#[derive(Debug, Default)]
pub struct ResultStore {
    raw: IndexMap<ResourceKey, Bytes>,
    loaded: IndexMap<ResourceKey, LoadedRecord>,
    errors: IndexMap<ResourceKey, Vec<FetchError>>,
}

impl ResultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a successful result, overwriting any previous one for the key.
    ///
    /// Error history for the key is left untouched.
    pub fn put_loaded(&mut self, raw: Bytes, record: LoadedRecord) {
        let key = record.descriptor.key.clone();
        self.raw.insert(key.clone(), raw);
        self.loaded.insert(key, record);
    }

    /// Append a failure to the key's error history.
    pub fn append_error(&mut self, key: &ResourceKey, error: FetchError) {
        self.errors.entry(key.clone()).or_default().push(error);
    }

    /// Whether the key has a loaded result.
    pub fn has_loaded(&self, key: &ResourceKey) -> bool {
        self.loaded.contains_key(key)
    }

    /// Raw payload for the key.
    pub fn raw(&self, key: &ResourceKey) -> Option<&Bytes> {
        self.raw.get(key)
    }

    /// Decorated record for the key.
    pub fn decorated(&self, key: &ResourceKey) -> Option<&LoadedRecord> {
        self.loaded.get(key)
    }

    /// Error history for the key, oldest first. Empty if none.
    pub fn errors(&self, key: &ResourceKey) -> &[FetchError] {
        self.errors.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether the key has any result at all (loaded or errored).
    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.loaded.contains_key(key) || self.errors.contains_key(key)
    }

    /// Keys with a loaded result, in the order they first loaded.
    pub fn loaded_keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.loaded.keys()
    }

    /// Keys with at least one error, in the order they first failed.
    pub fn errored_keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.errors.keys()
    }

    /// Counts of loaded and errored keys.
    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            loaded: self.loaded.len(),
            errored: self.errors.len(),
            total_errors: self.errors.values().map(Vec::len).sum(),
        }
    }
}

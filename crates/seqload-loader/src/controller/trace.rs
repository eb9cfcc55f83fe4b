//! Debug traces recorded when a controller runs with `debug` enabled.

use std::fmt;

use chrono::{DateTime, Utc};

use seqload_core::ResourceKey;

/// A non-fatal condition worth surfacing while debugging a loader.
///
/// Recorded for: `start()` on an empty queue, fetch failures, enqueues
/// dropped after cancellation, and settlements that do not match the fetch
/// in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugTrace {
    /// When the condition was observed.
    pub recorded_at: DateTime<Utc>,
    /// The key involved, if any.
    pub key: Option<ResourceKey>,
    /// Human-readable description.
    pub message: String,
}

impl DebugTrace {
    pub(super) fn new(key: Option<ResourceKey>, message: impl Into<String>) -> Self {
        Self {
            recorded_at: Utc::now(),
            key,
            message: message.into(),
        }
    }
}

impl fmt::Display for DebugTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "[{}] {}: {}", self.recorded_at.to_rfc3339(), key, self.message),
            None => write!(f, "[{}] {}", self.recorded_at.to_rfc3339(), self.message),
        }
    }
}

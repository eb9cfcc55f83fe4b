//! Batch state and status snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a batch.
///
/// `Finished` is only reachable from `Running`, and new work enqueued after a
/// batch finished moves it back to `Running`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchState {
    /// Never started, or started on an empty queue.
    #[default]
    Idle,
    /// Something is queued or outstanding.
    Running,
    /// Was running; queue drained and nothing outstanding.
    Finished,
}

impl BatchState {
    /// Get the lowercase state name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts of settled results held by a controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    /// Keys with a loaded result.
    pub loaded: usize,
    /// Keys with at least one recorded error.
    pub errored: usize,
    /// Total number of recorded errors across all keys.
    pub total_errors: usize,
}

/// Point-in-time view of a controller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderStatus {
    /// Current batch state.
    pub state: BatchState,
    /// Descriptors waiting in the pending queue.
    pub pending: usize,
    /// Keys with a fetch in flight.
    pub outstanding: usize,
    /// Whether `cancel()` has been called.
    pub cancelled: bool,
    /// Settled result counts.
    pub results: ResultSummary,
}

impl LoaderStatus {
    /// Nothing queued and nothing outstanding.
    pub const fn is_complete(&self) -> bool {
        self.pending == 0 && self.outstanding == 0
    }

    /// No further progress will happen without new input.
    ///
    /// True when complete, or when cancelled with nothing in flight (queued
    /// items are never drained after cancellation).
    pub const fn is_quiescent(&self) -> bool {
        self.outstanding == 0 && (self.pending == 0 || self.cancelled)
    }
}

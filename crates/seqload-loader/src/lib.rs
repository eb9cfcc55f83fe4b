//! Sequential resource loader.
//!
//! Fetches a list of resources one at a time, tracks what is outstanding,
//! and notifies the caller once per item and once when the batch finishes.
//!
//! # Modules
//!
//! - `queue` - FIFO of descriptors awaiting dispatch
//! - `completion` - outstanding counts and batch state
//! - `store` - loaded payloads and error history per key
//! - `dispatcher` - single-handler-per-name event registry
//! - `controller` - synchronous state machine tying the above together
//! - `runner` - async task that owns a controller and drives the transport
//! - `transport` - HTTP transport adapter
//! - `decorate` - audio handle decorator
//!
//! The controller performs no I/O: it hands back the next descriptor to
//! fetch and is told when that fetch settles. The runner is the only place
//! that awaits.

#![deny(unused_crate_dependencies)]

pub(crate) mod completion;
pub(crate) mod queue;

mod controller;
mod decorate;
mod dispatcher;
mod runner;
mod store;
mod transport;

// Re-export core types for convenience
pub use seqload_core::{
    BatchState, DecoratorPort, EventName, FetchError, LoaderConfig, LoaderError, LoaderEvent,
    LoaderStatus, MediaHandle, ResourceDescriptor, ResourceKey, ResponseEncoding, ResultSummary,
    TransportPort,
};

pub use controller::{DebugTrace, QueueController};
pub use decorate::AudioDecorator;
pub use dispatcher::{EventDispatcher, EventHandler};
pub use runner::{Loader, LoaderHandle, spawn_loader};
pub use store::{LoadedRecord, ResultStore};
pub use transport::{HttpTransport, HttpTransportConfig};

// Silence unused dev-dependency warnings
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;

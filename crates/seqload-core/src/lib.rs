//! Core domain types and ports for seqload.
//!
//! This crate holds everything the loader and its adapters agree on:
//!
//! - `resource` - resource keys and descriptors
//! - `media` - decorated media handles produced from fetched payloads
//! - `events` - lifecycle event names and payloads
//! - `status` - batch state and status snapshots
//! - `config` - loader configuration
//! - `errors` - fetch and loader error types
//! - `ports` - transport and decoration collaborator traits
//!
//! No I/O happens here; concrete adapters live in `seqload-loader`.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod errors;
pub mod events;
pub mod media;
pub mod ports;
pub mod resource;
pub mod status;

// Re-export commonly used types for convenience
pub use config::{LoaderConfig, ResponseEncoding};
pub use errors::{FetchError, FetchResult, LoaderError};
pub use events::{EventName, LoaderEvent};
pub use media::MediaHandle;
pub use ports::{DecoratorPort, TransportPort};
pub use resource::{ResourceDescriptor, ResourceKey};
pub use status::{BatchState, LoaderStatus, ResultSummary};

#[cfg(any(test, feature = "test-utils"))]
pub use ports::MockDecoratorPort;

// Only exercised by async trait tests
#[cfg(test)]
use tokio as _;

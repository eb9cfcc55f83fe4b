//! Port definitions for external collaborators.
//!
//! The loader drives two collaborators it does not implement itself:
//!
//! - [`TransportPort`] performs a fetch and settles exactly once
//! - [`DecoratorPort`] turns a fetched payload into a playable handle
//!
//! Concrete adapters live in `seqload-loader`; tests supply their own.

mod decorator;
mod transport;

pub use decorator::DecoratorPort;
pub use transport::TransportPort;

#[cfg(any(test, feature = "test-utils"))]
pub use decorator::MockDecoratorPort;

//! Transport adapters.
//!
//! The controller never performs I/O itself; the runner hands each
//! dispatched descriptor to a [`TransportPort`](seqload_core::TransportPort).
//! This module provides the production HTTP implementation.

mod config;
mod http;

pub use config::HttpTransportConfig;
pub use http::HttpTransport;

//! Command-line front end for seqload.
//!
//! Parses arguments, reads resource manifests and wires the HTTP transport
//! and audio decorator into a loader. All printing happens here; the loader
//! crates only log.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;

// Used by the binary target only
use anyhow as _;
use tracing_subscriber as _;

pub mod error;
pub mod handlers;
pub mod manifest;
pub mod parser;

pub use error::CliError;
pub use manifest::Manifest;
pub use parser::{Cli, Commands, FetchArgs};

//! Command handlers.
//!
//! Handlers follow the pattern:
//! - Signature: `pub async fn execute(args) -> Result<_, CliError>`
//! - Thin wrappers that:
//!   1. Validate CLI-specific input
//!   2. Drive a loader
//!   3. Format output for the terminal

pub mod fetch;

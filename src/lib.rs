//! Drop-in systemctl replacement for containers without an init daemon.

#![warn(unused_crate_dependencies)]
// These dependencies are only used in the binary (src/bin/main.rs)
// Test dependencies are only used in test code
#[cfg(test)]
use assert_cmd as _;
#[cfg(test)]
use predicates as _;
use strum as _;
#[cfg(test)]
use tempfile as _;
use tracing_subscriber as _;

/// Unit catalog and glob matching.
pub mod catalog;

/// CLI parsing.
pub mod cli;

/// Environment assembly.
pub mod environ;

/// Execution engine.
pub mod engine;

/// Errors.
pub mod error;

/// PID-1 init mode.
pub mod init;

/// System path layout.
pub mod paths;

/// PID files and liveness.
pub mod process;

/// Enable/disable registry.
pub mod registry;

/// Unit descriptor parsing.
pub mod unit;

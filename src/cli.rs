//! Command-line interface for systemctl-lite.
//!
//! The surface is deliberately thin: one positional verb, unit names or glob
//! patterns, and a handful of flags kept for compatibility with the real
//! tool. Dispatch to the engine lives in the binary.

use clap::Parser;
use std::path::PathBuf;

/// Command-line interface mirroring the `systemctl` subset used in
/// containers.
#[derive(Parser)]
#[command(name = "systemctl", version, author)]
#[command(about = "A drop-in systemctl replacement for containers", long_about = None)]
pub struct Cli {
    /// Lifecycle verb (start, stop, status, enable, ...); defaults to
    /// `list-units`, or to init mode when running as PID 1.
    pub verb: Option<String>,

    /// Unit names or glob patterns the verb applies to.
    pub units: Vec<String>,

    /// Replace an existing enablement link.
    #[arg(long)]
    pub force: bool,

    /// Suppress informational output (accepted for compatibility).
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Do not shorten output lines (accepted for compatibility).
    #[arg(long, short = 'l')]
    pub full: bool,

    /// Only print the named property for `show`.
    #[arg(long, short = 'p', value_name = "NAME")]
    pub property: Option<String>,

    /// Raise log verbosity; may be given multiple times.
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Prefix all system paths with this directory.
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,
}

/// Parses command-line arguments and returns a `Cli` struct.
pub fn parse_args() -> Cli {
    Cli::parse()
}

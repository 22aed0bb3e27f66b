//! Error handling for systemctl-lite.
use std::{io, path::PathBuf};
use thiserror::Error;

/// Defines all possible errors that can occur while driving service units.
#[derive(Debug, Error)]
pub enum SystemctlError {
    /// A descriptor line that is neither a section header, a comment, nor a
    /// `Name=Value` assignment.
    #[error("bad descriptor line in {path} (line {line}): {text}")]
    DescriptorSyntax {
        /// The descriptor file being parsed.
        path: PathBuf,
        /// 1-based line number of the offending line.
        line: usize,
        /// The offending line itself.
        text: String,
    },

    /// No unit file was found for the requested name in either catalog.
    #[error("unit file not found: {0}")]
    UnitNotFound(String),

    /// The descriptor declared a `Service.Type` outside the supported set.
    #[error("unsupported service type '{0}'")]
    UnknownServiceType(String),

    /// A checked command exited non-zero.
    #[error("{hook} failed with exit status {status}: {command}")]
    CommandFailed {
        /// The descriptor option the command came from (e.g. `ExecStartPre`).
        hook: &'static str,
        /// Exit status of the command, or -1 when killed by a signal.
        status: i32,
        /// The command line that failed.
        command: String,
    },

    /// The shell for a service command could not be spawned.
    #[error("failed to spawn '{command}': {source}")]
    SpawnError {
        /// The command line that could not be spawned.
        command: String,
        /// The underlying error that occurred.
        #[source]
        source: io::Error,
    },

    /// Error reading or writing descriptor, PID, or link files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error delivering a signal to a process.
    #[error("signal delivery failed: {0}")]
    Signal(#[from] nix::errno::Errno),
}

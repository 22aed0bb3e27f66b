//! PID files and process liveness.
//!
//! All runtime state lives on disk: a unit is "active" exactly when its PID
//! file names a process that is still alive. Nothing here caches across
//! calls.

use std::{fs, path::Path, thread, time::Duration};

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::error::SystemctlError;

/// Checks whether a PID exists in the current process table (signal zero).
/// EPERM clearly means there is a process to deny access to.
pub fn pid_alive(pid: i32) -> Result<bool, SystemctlError> {
    if pid <= 0 {
        return Ok(false);
    }
    match signal::kill(Pid::from_raw(pid), None) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(Errno::EPERM) => Ok(true),
        Err(err) => Err(err.into()),
    }
}

/// Reads the first non-blank line of a PID file as an integer.
/// Malformed content is logged and treated as "no PID".
pub fn read_pid_file(pid_file: &Path) -> Option<i32> {
    if !pid_file.is_file() {
        return None;
    }
    let text = match fs::read_to_string(pid_file) {
        Ok(text) => text,
        Err(err) => {
            warn!("bad read of pid file '{}': {err}", pid_file.display());
            return None;
        }
    };
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        return match line.parse::<i32>() {
            Ok(pid) => Some(pid),
            Err(_) => {
                warn!("bad read of pid file '{}'", pid_file.display());
                None
            }
        };
    }
    None
}

/// Creates the parent directory if needed and writes the PID as the only
/// content.
pub fn write_pid_file(pid_file: &Path, pid: u32) -> Result<(), SystemctlError> {
    if let Some(dir) = pid_file.parent()
        && !dir.is_dir()
    {
        fs::create_dir_all(dir)?;
    }
    fs::write(pid_file, format!("{pid}\n"))?;
    Ok(())
}

/// Waits for the PID file to appear with a live PID inside, polling up to
/// `attempts` times. Returns the PID, or `None` when the wait is exhausted.
pub fn wait_pid_file(pid_file: &Path, attempts: usize, interval: Duration) -> Option<i32> {
    for _ in 0..attempts {
        thread::sleep(interval);
        if let Some(dir) = pid_file.parent()
            && !dir.is_dir()
        {
            continue;
        }
        let Some(pid) = read_pid_file(pid_file) else {
            continue;
        };
        if matches!(pid_alive(pid), Ok(true)) {
            return Some(pid);
        }
    }
    debug!("no live pid appeared in '{}'", pid_file.display());
    None
}

/// Terminates a process with graceful escalation: up to `attempts` rounds of
/// SIGTERM with liveness re-checks, then up to `attempts` rounds of SIGKILL.
pub fn kill_pid(pid: i32, attempts: usize, interval: Duration) {
    if pid <= 0 {
        return;
    }
    let target = Pid::from_raw(pid);
    for _ in 0..attempts {
        if signal::kill(target, Signal::SIGTERM).is_err() {
            break;
        }
        if !pid_alive(pid).unwrap_or(false) {
            break;
        }
        thread::sleep(interval);
        if !pid_alive(pid).unwrap_or(false) {
            break;
        }
    }
    for _ in 0..attempts {
        if !pid_alive(pid).unwrap_or(false) {
            break;
        }
        let _ = signal::kill(target, Signal::SIGKILL);
        thread::sleep(interval);
    }
}

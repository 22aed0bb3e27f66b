//! PID-1 init mode: start the wanted service set, reap zombies, halt on
//! shutdown signals.
//!
//! Signal delivery is the only asynchrony here. The handlers merely raise a
//! loop-visible interrupt flag; the halt sequence itself runs from the main
//! loop with both signals set to ignore, so a second signal cannot race the
//! teardown.

use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
};

use glob::Pattern;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::wait::{WaitPidFlag, waitpid};
use nix::unistd::Pid;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::engine::Systemctl;
use crate::error::SystemctlError;

/// Target whose wants directory seeds the default service set.
const DEFAULT_TARGET: &str = "multi-user.target";

/// Seconds of idle sleep between zombie sweeps.
const REAP_INTERVAL_SECS: libc::c_uint = 10;

// Distribution service names that must not be started inside a container.
const IGNORE_CENTOS: &[&str] = &["netconsole", "network"];
const IGNORE_OPENSUSE: &[&str] = &["raw", "pppoe", "*.local", "boot.*", "rpmconf*"];
const IGNORE_UBUNTU: &[&str] = &["mount*", "umount*", "ondemand", "*.local"];
const IGNORE_ALWAYS: &[&str] = &["network*", "dbus", "systemd-*"];

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn raise_interrupt(_signum: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

impl Systemctl {
    /// The filtered service set started with the default target: every
    /// `.service` link in the wants directory plus rc3 entries with the
    /// given prefix (`S` for start, `K` for halt) that survive the ignore
    /// list.
    pub fn system_wants_services(&mut self, sysv_prefix: char) -> Vec<String> {
        let ignores: Vec<Pattern> = IGNORE_CENTOS
            .iter()
            .chain(IGNORE_OPENSUSE)
            .chain(IGNORE_UBUNTU)
            .chain(IGNORE_ALWAYS)
            .filter_map(|raw| Pattern::new(raw).ok())
            .collect();

        let mut services = Vec::new();
        let wants_folder = self.paths.enable_folder(DEFAULT_TARGET);
        for unit in sorted_entries(&wants_folder) {
            if unit.ends_with(".service") {
                services.push(unit);
            }
        }

        let rc_entry = Regex::new(&format!(r"^{sysv_prefix}\d\d(.*)$")).unwrap();
        for entry in sorted_entries(&self.paths.rc3_folder()) {
            if let Some(caps) = rc_entry.captures(&entry) {
                let service = caps[1].to_string();
                if ignores.iter().any(|pattern| pattern.matches(&service)) {
                    debug!("ignored {service}");
                    continue;
                }
                services.push(service);
            }
        }
        services
    }

    /// Starts the units of the default system level.
    pub fn system_default(&mut self) -> Result<bool, SystemctlError> {
        info!("system default requested");
        let wants = self.system_wants_services('S');
        let done = self.start_units(&wants);
        info!("system is up");
        Ok(done)
    }

    /// Stops the units of the default system level.
    pub fn system_halt(&mut self) -> Result<bool, SystemctlError> {
        info!("system halt requested");
        let wants = self.system_wants_services('K');
        let done = self.stop_units(&wants);
        info!("system is down");
        Ok(done)
    }

    /// The full PID-1 sequence: bring the system up, then idle until a
    /// shutdown signal arrives.
    pub fn system_init(&mut self) -> Result<bool, SystemctlError> {
        self.system_default()?;
        self.system_wait()
    }

    /// Idles, reaping zombies every sweep, until SIGTERM or SIGINT raises
    /// the interrupt; then halts the system with signals ignored.
    pub fn system_wait(&mut self) -> Result<bool, SystemctlError> {
        INTERRUPTED.store(false, Ordering::SeqCst);
        unsafe {
            signal::signal(Signal::SIGTERM, SigHandler::Handler(raise_interrupt))?;
            signal::signal(Signal::SIGINT, SigHandler::Handler(raise_interrupt))?;
        }
        loop {
            // a delivered signal cuts the sleep short
            unsafe { libc::sleep(REAP_INTERVAL_SECS) };
            if INTERRUPTED.load(Ordering::SeqCst) {
                break;
            }
            self.reap_zombies();
        }
        unsafe {
            signal::signal(Signal::SIGTERM, SigHandler::SigIgn)?;
            signal::signal(Signal::SIGINT, SigHandler::SigIgn)?;
        }
        let done = self.system_halt()?;
        unsafe {
            signal::signal(Signal::SIGTERM, SigHandler::SigDfl)?;
            signal::signal(Signal::SIGINT, SigHandler::SigDfl)?;
        }
        Ok(done)
    }

    /// Collects dead children whose parent is this process with a
    /// non-blocking wait.
    pub fn reap_zombies(&self) {
        let parent = std::process::id() as i32;
        for pid in zombie_children(&self.paths.proc_dir(), parent) {
            info!("reap zombie {pid}");
            if let Err(err) = waitpid(Pid::from_raw(pid), Some(WaitPidFlag::WNOHANG)) {
                warn!("reap zombie {pid}: {err}");
            }
        }
    }
}

/// Numeric `/proc` entries whose status file shows a zombie whose parent is
/// `parent`.
pub fn zombie_children(proc_dir: &Path, parent: i32) -> Vec<i32> {
    let state_line = Regex::new(r"^State:\s*Z").unwrap();
    let ppid_line = Regex::new(r"^PPid:\s*(\d+)").unwrap();
    let mut pids = Vec::new();
    let Ok(entries) = fs::read_dir(proc_dir) else {
        return pids;
    };
    for entry in entries.flatten() {
        let Some(pid) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<i32>().ok())
        else {
            continue;
        };
        let Ok(text) = fs::read_to_string(entry.path().join("status")) else {
            continue;
        };
        let mut zombie = false;
        let mut ppid = -1;
        for line in text.lines() {
            if state_line.is_match(line) {
                zombie = true;
            }
            if let Some(caps) = ppid_line.captures(line)
                && let Ok(parsed) = caps[1].parse::<i32>()
            {
                ppid = parsed;
            }
        }
        if zombie && ppid == parent {
            pids.push(pid);
        }
    }
    pids
}

fn sorted_entries(folder: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(folder) {
        Ok(entries) => entries
            .flatten()
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

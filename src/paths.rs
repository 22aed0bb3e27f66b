//! Helpers for resolving system paths relative to an optional root prefix.
use std::path::PathBuf;

/// Directory layout of the host, or of a `--root` tree.
///
/// Every built-in location (unit search directories, PID files, enablement
/// links, `/proc`) is derived through this struct so that a single `--root`
/// switch relocates the whole surface, chroot-style.
#[derive(Debug, Clone)]
pub struct SystemPaths {
    root: PathBuf,
}

impl SystemPaths {
    /// Creates the layout for the given root, defaulting to `/`.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root: root.unwrap_or_else(|| PathBuf::from("/")),
        }
    }

    fn rooted(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    /// Modern unit search directories; the second wins on name conflicts.
    pub fn sysd_folders(&self) -> [PathBuf; 2] {
        [
            self.rooted("/usr/lib/systemd/system"),
            self.rooted("/etc/systemd/system"),
        ]
    }

    /// Legacy init-script search directories; the second wins on name conflicts.
    pub fn sysv_folders(&self) -> [PathBuf; 2] {
        [self.rooted("/etc/init.d"), self.rooted("/var/run/init.d")]
    }

    /// Default location where a unit's PID is stored.
    pub fn default_pid_file(&self, unit: &str) -> PathBuf {
        self.rooted(&format!("/var/run/{unit}.pid"))
    }

    /// Directory holding enablement links for a `WantedBy` target.
    /// The `.wants` suffix is appended when the target does not carry it.
    pub fn enable_folder(&self, wanted: &str) -> PathBuf {
        if wanted.ends_with(".wants") {
            self.rooted(&format!("/etc/systemd/system/{wanted}"))
        } else {
            self.rooted(&format!("/etc/systemd/system/{wanted}.wants"))
        }
    }

    /// Runlevel-3 link directory.
    pub fn rc3_folder(&self) -> PathBuf {
        self.rc_folder("rc3.d")
    }

    /// Runlevel-5 link directory.
    pub fn rc5_folder(&self) -> PathBuf {
        self.rc_folder("rc5.d")
    }

    fn rc_folder(&self, name: &str) -> PathBuf {
        let etc = self.rooted(&format!("/etc/{name}"));
        if etc.is_dir() {
            etc
        } else {
            self.rooted(&format!("/etc/init.d/{name}"))
        }
    }

    /// The `/proc` pseudo-filesystem.
    pub fn proc_dir(&self) -> PathBuf {
        self.rooted("/proc")
    }

    /// Log file appended to when it already exists.
    pub fn log_file(&self) -> PathBuf {
        self.rooted("/var/log/systemctl.log")
    }
}

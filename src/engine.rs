//! # Service Execution Engine
//!
//! This module drives the lifecycle verbs against parsed unit descriptors.
//! It dispatches on the declared service type, runs pre-hooks, the primary
//! command(s), and post-hooks with the correct waiting and PID capture, and
//! renders status/show/cat output. The engine keeps no runtime state in
//! memory between invocations: PID files and enablement links on disk are
//! the only truth, which keeps every verb re-entrant across process
//! invocations.

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    process::{Child, Command, ExitStatus, Stdio},
    str::FromStr,
    time::Duration,
};

use strum_macros::EnumString;
use tracing::{debug, error, info, warn};

use crate::catalog::UnitCatalog;
use crate::environ;
use crate::error::SystemctlError;
use crate::paths::SystemPaths;
use crate::process;
use crate::unit::UnitDescriptor;

/// Default number of poll iterations while waiting for a PID file.
pub const DEFAULT_WAIT_PIDFILE: usize = 100;

/// Default number of TERM and KILL rounds when stopping a process.
pub const DEFAULT_WAIT_KILL: usize = 10;

/// Default pause between liveness polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Environment variable telling legacy wrapper scripts not to re-exec
/// through the service manager.
const SKIP_REDIRECT_VAR: &str = "SYSTEMCTL_SKIP_REDIRECT";

/// Process-wide knobs, constructed once from the CLI and carried on the
/// engine.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Replace existing enablement links.
    pub force: bool,
    /// Suppress informational output (accepted for compatibility).
    pub quiet: bool,
    /// Do not shorten output lines (accepted for compatibility).
    pub full: bool,
    /// Property filter for `show`.
    pub property: Option<String>,
    /// Poll iterations while waiting for a PID file to appear.
    pub wait_pidfile: usize,
    /// TERM/KILL rounds when stopping a process.
    pub wait_kill: usize,
    /// Pause between polls.
    pub poll_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            force: false,
            quiet: false,
            full: false,
            property: None,
            wait_pidfile: DEFAULT_WAIT_PIDFILE,
            wait_kill: DEFAULT_WAIT_KILL,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Declared run type of a service, dispatching the per-verb behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ServiceType {
    /// Main process is the spawned command itself; start returns at once.
    Simple,
    /// Commands run to completion before the verb returns.
    Oneshot,
    /// Treated like `simple`; readiness notification is not implemented.
    Notify,
    /// Command forks away; the engine waits for the PID file to appear.
    Forking,
    /// Legacy init script driven as `<script> start|stop|...`.
    Sysv,
}

impl ServiceType {
    /// Resolves the declared type of a descriptor, defaulting to `simple`.
    /// An unknown type fails the verb before any command runs.
    pub fn from_conf(conf: &UnitDescriptor) -> Result<Self, SystemctlError> {
        let raw = conf.get_or("Service", "Type", "simple").to_ascii_lowercase();
        Self::from_str(&raw).map_err(|_| SystemctlError::UnknownServiceType(raw))
    }
}

/// A descriptor command line split into its check flag and executable text.
/// A leading `-` means "ignore non-zero exit status".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Whether a non-zero exit aborts the verb.
    pub check: bool,
    /// The command with any leading `-` stripped.
    pub text: String,
}

impl CommandLine {
    /// Splits a raw command value from a descriptor.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(rest) => Self {
                check: false,
                text: rest.to_string(),
            },
            None => Self {
                check: true,
                text: raw.to_string(),
            },
        }
    }
}

/// The service lifecycle engine.
pub struct Systemctl {
    pub(crate) settings: Settings,
    pub(crate) paths: SystemPaths,
    pub(crate) catalog: UnitCatalog,
}

impl Systemctl {
    /// Creates an engine over the given path layout.
    pub fn new(settings: Settings, paths: SystemPaths) -> Self {
        let catalog = UnitCatalog::new(paths.clone());
        Self {
            settings,
            paths,
            catalog,
        }
    }

    /// The settings the engine was constructed with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The path layout the engine operates on.
    pub fn paths(&self) -> &SystemPaths {
        &self.paths
    }

    // ---- batch plumbing -------------------------------------------------

    /// Runs `op` for every matched unit in order. A unit's failure is logged
    /// and degrades the aggregate result, but never skips later units.
    fn each_unit<F>(&mut self, modules: &[String], mut op: F) -> bool
    where
        F: FnMut(&mut Self, &str) -> Result<bool, SystemctlError>,
    {
        let mut done = true;
        for unit in self.catalog.match_units(modules, ".service") {
            match op(self, &unit) {
                Ok(true) => {}
                Ok(false) => done = false,
                Err(err) => {
                    error!("{unit}: {err}");
                    done = false;
                }
            }
        }
        done
    }

    // ---- command plumbing -----------------------------------------------

    fn spawn_command(
        &self,
        cmd: &str,
        env: &HashMap<String, String>,
    ) -> Result<Child, SystemctlError> {
        Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .env_clear()
            .envs(env)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| SystemctlError::SpawnError {
                command: cmd.to_string(),
                source,
            })
    }

    fn run_and_wait(
        &self,
        cmd: &str,
        env: &HashMap<String, String>,
        check: bool,
        hook: &'static str,
    ) -> Result<ExitStatus, SystemctlError> {
        let mut child = self.spawn_command(cmd, env)?;
        let status = child.wait()?;
        if check && !status.success() {
            error!("{hook} returned {status}: {cmd}");
            return Err(SystemctlError::CommandFailed {
                hook,
                status: status.code().unwrap_or(-1),
                command: cmd.to_string(),
            });
        }
        Ok(status)
    }

    /// Runs every command of a pre/post hook option, waiting on each.
    fn run_hooks(
        &self,
        conf: &UnitDescriptor,
        option: &'static str,
        env: &HashMap<String, String>,
    ) -> Result<(), SystemctlError> {
        for raw in conf.getlist("Service", option) {
            let cmd = CommandLine::parse(raw);
            info!("{option}:{}:{}", cmd.check, cmd.text);
            self.run_and_wait(&cmd.text, env, cmd.check, option)?;
        }
        Ok(())
    }

    /// Prefix that switches credentials before exec when the descriptor
    /// names a user and/or group.
    fn sudo_from(conf: &UnitDescriptor) -> String {
        let user = conf.get_or("Service", "User", "");
        let group = conf.get_or("Service", "Group", "");
        match (user.is_empty(), group.is_empty()) {
            (false, false) => format!("/usr/sbin/runuser -g {group} -u {user} -- "),
            (false, true) => format!("/usr/sbin/runuser -u {user} -- "),
            (true, false) => format!("/usr/sbin/runuser -g {group} -- "),
            (true, true) => String::new(),
        }
    }

    /// PID file for a descriptor: `Service.PIDFile` when declared, else the
    /// default derived from the unit filename.
    pub(crate) fn pid_file_from(&self, conf: &UnitDescriptor) -> Option<PathBuf> {
        let file = conf.filename()?;
        let unit = file.file_name()?.to_string_lossy();
        match conf.get("Service", "PIDFile") {
            Some(declared) => Some(PathBuf::from(declared)),
            None => Some(self.paths.default_pid_file(&unit)),
        }
    }

    /// Sets `MAINPID` from the current PID-file contents (possibly empty).
    fn insert_main_pid(&self, env: &mut HashMap<String, String>, conf: &UnitDescriptor) {
        let pid = self
            .pid_file_from(conf)
            .and_then(|pid_file| process::read_pid_file(&pid_file));
        env.insert(
            "MAINPID".to_string(),
            pid.map(|p| p.to_string()).unwrap_or_default(),
        );
    }

    fn wait_for_pid_file(&self, conf: &UnitDescriptor) {
        if let Some(pid_file) = self.pid_file_from(conf) {
            process::wait_pid_file(
                &pid_file,
                self.settings.wait_pidfile,
                self.settings.poll_interval,
            );
        }
    }

    /// The `'<script>' <verb>` invocation for a legacy unit.
    fn run_sysv_verb(
        &self,
        conf: &UnitDescriptor,
        verb: &str,
        env: &mut HashMap<String, String>,
    ) -> Result<(), SystemctlError> {
        if let Some(file) = conf.filename() {
            env.insert(SKIP_REDIRECT_VAR.to_string(), "yes".to_string());
            let cmd = format!("'{}' {verb}", file.display());
            info!("({verb}) {cmd}");
            let mut child = self.spawn_command(&cmd, env)?;
            child.wait()?;
        }
        Ok(())
    }

    // ---- start ----------------------------------------------------------

    /// Starts every matched unit.
    pub fn start_units(&mut self, modules: &[String]) -> bool {
        self.each_unit(modules, |engine, unit| engine.start_unit(unit))
    }

    /// Starts one unit by name.
    pub fn start_unit(&mut self, unit: &str) -> Result<bool, SystemctlError> {
        let conf = self.catalog.read_unit(unit)?;
        self.start_unit_from(&conf)
    }

    pub(crate) fn start_unit_from(&self, conf: &UnitDescriptor) -> Result<bool, SystemctlError> {
        let runs = ServiceType::from_conf(conf)?;
        let sudo = Self::sudo_from(conf);
        let mut env = environ::environment_from(conf);
        debug!("env = {env:?}");

        self.run_hooks(conf, "ExecStartPre", &env)?;
        match runs {
            ServiceType::Sysv => self.run_sysv_verb(conf, "start", &mut env)?,
            ServiceType::Simple | ServiceType::Notify | ServiceType::Oneshot => {
                for raw in conf.getlist("Service", "ExecStart") {
                    self.insert_main_pid(&mut env, conf);
                    let cmd = format!("{sudo}{raw}");
                    info!("[start] {cmd}");
                    let mut child = self.spawn_command(&cmd, &env)?;
                    if let Some(pid_file) = self.pid_file_from(conf) {
                        process::write_pid_file(&pid_file, child.id())?;
                    }
                    if runs == ServiceType::Oneshot {
                        child.wait()?;
                    }
                }
            }
            ServiceType::Forking => {
                for raw in conf.getlist("Service", "ExecStart") {
                    let cmd = CommandLine::parse(raw);
                    let full = format!("{sudo}{}", cmd.text);
                    info!("{{start}} {full}");
                    self.run_and_wait(&full, &env, cmd.check, "ExecStart")?;
                    self.wait_for_pid_file(conf);
                }
            }
        }
        self.run_hooks(conf, "ExecStartPost", &env)?;
        Ok(true)
    }

    // ---- stop -----------------------------------------------------------

    /// Stops every matched unit.
    pub fn stop_units(&mut self, modules: &[String]) -> bool {
        self.each_unit(modules, |engine, unit| engine.stop_unit(unit))
    }

    /// Stops one unit by name.
    pub fn stop_unit(&mut self, unit: &str) -> Result<bool, SystemctlError> {
        let conf = self.catalog.read_unit(unit)?;
        self.stop_unit_from(&conf)
    }

    pub(crate) fn stop_unit_from(&self, conf: &UnitDescriptor) -> Result<bool, SystemctlError> {
        let runs = ServiceType::from_conf(conf)?;
        let sudo = Self::sudo_from(conf);
        let mut env = environ::environment_from(conf);

        self.run_hooks(conf, "ExecStopPre", &env)?;
        match runs {
            ServiceType::Sysv => self.run_sysv_verb(conf, "stop", &mut env)?,
            _ if conf.getlist("Service", "ExecStop").is_empty() => {
                if let Some(pid_file) = self.pid_file_from(conf) {
                    let pid = process::read_pid_file(&pid_file);
                    info!("(stop) kill {pid:?} ({})", pid_file.display());
                    if let Some(pid) = pid {
                        process::kill_pid(pid, self.settings.wait_kill, self.settings.poll_interval);
                    }
                    if pid_file.is_file() {
                        fs::remove_file(&pid_file)?;
                    }
                }
            }
            ServiceType::Simple | ServiceType::Notify | ServiceType::Oneshot => {
                for raw in conf.getlist("Service", "ExecStop") {
                    self.insert_main_pid(&mut env, conf);
                    let cmd = format!("{sudo}{raw}");
                    info!("[stop] {cmd}");
                    let mut child = self.spawn_command(&cmd, &env)?;
                    if runs == ServiceType::Oneshot {
                        child.wait()?;
                    }
                }
            }
            ServiceType::Forking => {
                for raw in conf.getlist("Service", "ExecStop") {
                    // the check flag only counts while the unit is active
                    let active = self.is_active_from(conf);
                    self.insert_main_pid(&mut env, conf);
                    let cmd = CommandLine::parse(raw);
                    let full = format!("{sudo}{}", cmd.text);
                    info!("{{stop}} {full}");
                    let status = self.run_and_wait(&full, &env, false, "ExecStop")?;
                    if active && cmd.check && !status.success() {
                        return Err(SystemctlError::CommandFailed {
                            hook: "ExecStop",
                            status: status.code().unwrap_or(-1),
                            command: full,
                        });
                    }
                    self.wait_for_pid_file(conf);
                }
            }
        }
        self.run_hooks(conf, "ExecStopPost", &env)?;
        Ok(true)
    }

    // ---- reload ---------------------------------------------------------

    /// Reloads every matched unit.
    pub fn reload_units(&mut self, modules: &[String]) -> bool {
        self.each_unit(modules, |engine, unit| engine.reload_unit(unit))
    }

    /// Reloads one unit by name.
    pub fn reload_unit(&mut self, unit: &str) -> Result<bool, SystemctlError> {
        let conf = self.catalog.read_unit(unit)?;
        self.reload_unit_from(&conf)
    }

    pub(crate) fn reload_unit_from(&self, conf: &UnitDescriptor) -> Result<bool, SystemctlError> {
        let runs = ServiceType::from_conf(conf)?;
        let sudo = Self::sudo_from(conf);
        let mut env = environ::environment_from(conf);

        self.run_hooks(conf, "ExecReloadPre", &env)?;
        match runs {
            ServiceType::Sysv => self.run_sysv_verb(conf, "reload", &mut env)?,
            ServiceType::Simple | ServiceType::Notify | ServiceType::Oneshot => {
                for raw in conf.getlist("Service", "ExecReload") {
                    self.insert_main_pid(&mut env, conf);
                    let cmd = format!("{sudo}{raw}");
                    info!("[reload] {cmd}");
                    let mut child = self.spawn_command(&cmd, &env)?;
                    if runs == ServiceType::Oneshot {
                        child.wait()?;
                    }
                }
            }
            ServiceType::Forking => {
                for raw in conf.getlist("Service", "ExecReload") {
                    self.insert_main_pid(&mut env, conf);
                    let cmd = CommandLine::parse(raw);
                    let full = format!("{sudo}{}", cmd.text);
                    info!("{{reload}} {full}");
                    self.spawn_command(&full, &env)?;
                    self.wait_for_pid_file(conf);
                }
            }
        }
        self.run_hooks(conf, "ExecReloadPost", &env)?;
        Ok(true)
    }

    // ---- restart --------------------------------------------------------

    /// Restarts every matched unit.
    pub fn restart_units(&mut self, modules: &[String]) -> bool {
        self.each_unit(modules, |engine, unit| engine.restart_unit(unit))
    }

    /// Restarts one unit by name.
    pub fn restart_unit(&mut self, unit: &str) -> Result<bool, SystemctlError> {
        let conf = self.catalog.read_unit(unit)?;
        self.restart_unit_from(&conf)
    }

    pub(crate) fn restart_unit_from(&self, conf: &UnitDescriptor) -> Result<bool, SystemctlError> {
        let runs = ServiceType::from_conf(conf)?;
        let sudo = Self::sudo_from(conf);
        let mut env = environ::environment_from(conf);

        self.run_hooks(conf, "ExecRestartPre", &env)?;
        if runs == ServiceType::Sysv {
            self.run_sysv_verb(conf, "restart", &mut env)?;
        } else if conf.getlist("Service", "ExecRestart").is_empty() {
            info!("(restart) => stop/start");
            self.stop_unit_from(conf)?;
            self.start_unit_from(conf)?;
        } else {
            match runs {
                ServiceType::Simple | ServiceType::Notify | ServiceType::Oneshot => {
                    for raw in conf.getlist("Service", "ExecRestart") {
                        self.insert_main_pid(&mut env, conf);
                        let cmd = format!("{sudo}{raw}");
                        info!("[restart] {cmd}");
                        let mut child = self.spawn_command(&cmd, &env)?;
                        if runs == ServiceType::Oneshot {
                            child.wait()?;
                        }
                    }
                }
                ServiceType::Forking => {
                    for raw in conf.getlist("Service", "ExecRestart") {
                        let cmd = CommandLine::parse(raw);
                        let full = format!("{sudo}{}", cmd.text);
                        info!("{{restart}} {full}");
                        self.run_and_wait(&full, &env, cmd.check, "ExecRestart")?;
                        self.wait_for_pid_file(conf);
                    }
                }
                ServiceType::Sysv => {}
            }
        }
        self.run_hooks(conf, "ExecRestartPost", &env)?;
        Ok(true)
    }

    // ---- conditional restarts -------------------------------------------

    /// Restarts matched units that are active; inactive ones succeed silently.
    pub fn try_restart_units(&mut self, modules: &[String]) -> bool {
        self.each_unit(modules, |engine, unit| engine.try_restart_unit(unit))
    }

    /// `try-restart` for one unit.
    pub fn try_restart_unit(&mut self, unit: &str) -> Result<bool, SystemctlError> {
        let conf = self.catalog.read_unit(unit)?;
        if self.is_active_from(&conf) {
            self.restart_unit_from(&conf)
        } else {
            Ok(true)
        }
    }

    /// `reload-or-restart` for every matched unit.
    pub fn reload_or_restart_units(&mut self, modules: &[String]) -> bool {
        self.each_unit(modules, |engine, unit| engine.reload_or_restart_unit(unit))
    }

    /// Starts an inactive unit; otherwise reloads when the descriptor knows
    /// how, else restarts.
    pub fn reload_or_restart_unit(&mut self, unit: &str) -> Result<bool, SystemctlError> {
        let conf = self.catalog.read_unit(unit)?;
        if !self.is_active_from(&conf) {
            self.start_unit_from(&conf)
        } else if !conf.getlist("Service", "ExecReload").is_empty() {
            self.reload_unit_from(&conf)
        } else {
            self.restart_unit_from(&conf)
        }
    }

    /// `reload-or-try-restart` for every matched unit.
    pub fn reload_or_try_restart_units(&mut self, modules: &[String]) -> bool {
        self.each_unit(modules, |engine, unit| {
            engine.reload_or_try_restart_unit(unit)
        })
    }

    /// Reloads when the descriptor knows how; otherwise restarts only when
    /// the unit is active.
    pub fn reload_or_try_restart_unit(&mut self, unit: &str) -> Result<bool, SystemctlError> {
        let conf = self.catalog.read_unit(unit)?;
        if !conf.getlist("Service", "ExecReload").is_empty() {
            self.reload_unit_from(&conf)
        } else if !self.is_active_from(&conf) {
            Ok(true)
        } else {
            self.restart_unit_from(&conf)
        }
    }

    // ---- kill -----------------------------------------------------------

    /// Kills the tracked PID of every matched unit with TERM/KILL escalation.
    pub fn kill_units(&mut self, modules: &[String]) -> bool {
        self.each_unit(modules, |engine, unit| engine.kill_unit(unit))
    }

    /// Kills one unit's tracked PID.
    pub fn kill_unit(&mut self, unit: &str) -> Result<bool, SystemctlError> {
        let conf = self.catalog.read_unit(unit)?;
        if let Some(pid_file) = self.pid_file_from(&conf) {
            let pid = process::read_pid_file(&pid_file);
            debug!("pid_file '{}' => PID {pid:?}", pid_file.display());
            if let Some(pid) = pid {
                process::kill_pid(pid, self.settings.wait_kill, self.settings.poll_interval);
            }
        }
        Ok(true)
    }

    // ---- activity queries -----------------------------------------------

    /// True when any matched unit is active.
    pub fn is_active_units(&mut self, modules: &[String]) -> bool {
        let mut result = false;
        for unit in self.catalog.match_units(modules, ".service") {
            if self.is_active_unit(&unit) {
                result = true;
            }
        }
        result
    }

    /// Whether the unit's PID file names a live process.
    pub fn is_active_unit(&mut self, unit: &str) -> bool {
        let conf = self.catalog.try_read_unit(unit);
        if !conf.loaded() {
            warn!("no such unit '{unit}'");
        }
        self.is_active_from(&conf)
    }

    pub(crate) fn active_pid_from(&self, conf: &UnitDescriptor) -> Option<i32> {
        let pid_file = self.pid_file_from(conf)?;
        let pid = process::read_pid_file(&pid_file)?;
        debug!("pid_file '{}' => PID {pid}", pid_file.display());
        match process::pid_alive(pid) {
            Ok(true) => Some(pid),
            _ => None,
        }
    }

    pub(crate) fn is_active_from(&self, conf: &UnitDescriptor) -> bool {
        self.active_pid_from(conf).is_some()
    }

    fn active_state_from(&self, conf: &UnitDescriptor) -> String {
        match self.active_pid_from(conf) {
            Some(pid) => format!("PID {pid}"),
            None => "dead".to_string(),
        }
    }

    /// True when any matched unit is failed (inverse of active; a missing
    /// descriptor counts as failed).
    pub fn is_failed_units(&mut self, modules: &[String]) -> bool {
        let mut result = false;
        for unit in self.catalog.match_units(modules, ".service") {
            if self.is_failed_unit(&unit) {
                result = true;
            }
        }
        result
    }

    /// Whether one unit is failed.
    pub fn is_failed_unit(&mut self, unit: &str) -> bool {
        let conf = self.catalog.try_read_unit(unit);
        if !conf.loaded() {
            warn!("no such unit '{unit}'");
        }
        self.active_pid_from(&conf).is_none()
    }

    // ---- rendering verbs ------------------------------------------------

    fn description_from(conf: &UnitDescriptor) -> String {
        conf.get_or("Unit", "Description", "").to_string()
    }

    /// Multi-line status for every matched unit plus the aggregate exit code
    /// (0 active, 3 otherwise).
    pub fn status_units(&mut self, modules: &[String]) -> (i32, String) {
        let mut status = 0;
        let mut result = String::new();
        for unit in self.catalog.match_units(modules, ".service") {
            let (unit_status, text) = self.status_unit(&unit);
            if unit_status != 0 {
                status = unit_status;
            }
            if !result.is_empty() {
                result.push_str("\n\n");
            }
            result.push_str(&text);
        }
        (status, result)
    }

    /// Status text for one unit.
    pub fn status_unit(&mut self, unit: &str) -> (i32, String) {
        let conf = self.catalog.try_read_unit(unit);
        let mut text = format!("{unit} - {}", Self::description_from(&conf));
        if conf.loaded() {
            let path = conf
                .filename()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let enabled = self.enabled_state_from(&conf);
            text.push_str(&format!("\n    Loaded: loaded ({path}, {enabled})"));
        } else {
            text.push_str("\n    Loaded: failed");
            return (3, text);
        }
        if self.is_active_from(&conf) {
            text.push_str(&format!(
                "\n    Active: active ({})",
                self.active_state_from(&conf)
            ));
            (0, text)
        } else {
            text.push_str(&format!(
                "\n    Active: inactive ({})",
                self.active_state_from(&conf)
            ));
            (3, text)
        }
    }

    /// `show` output for every matched unit, honoring the property filter.
    /// Unmatched requests still render a "not-loaded" block for the first
    /// requested name.
    pub fn show_units(&mut self, modules: &[String]) -> String {
        let mut result = String::new();
        for unit in self.catalog.match_units(modules, ".service") {
            self.append_show_unit(&mut result, &unit);
        }
        if result.is_empty()
            && let Some(first) = modules.first()
        {
            self.append_show_unit(&mut result, first);
        }
        result
    }

    fn append_show_unit(&mut self, result: &mut String, unit: &str) {
        if !result.is_empty() {
            result.push_str("\n\n");
        }
        for (key, value) in self.show_unit_items(unit) {
            if let Some(filter) = &self.settings.property
                && filter != &key
            {
                continue;
            }
            result.push_str(&format!("{key}={value}\n"));
        }
    }

    /// The property list rendered by `show`.
    pub fn show_unit_items(&mut self, unit: &str) -> Vec<(String, String)> {
        let conf = self.catalog.try_read_unit(unit);
        let mut items = vec![
            ("Id".to_string(), unit.to_string()),
            ("Names".to_string(), unit.to_string()),
            ("Description".to_string(), Self::description_from(&conf)),
            (
                "MainPID".to_string(),
                self.active_pid_from(&conf)
                    .map(|pid| pid.to_string())
                    .unwrap_or_else(|| "0".to_string()),
            ),
            ("SubState".to_string(), self.active_state_from(&conf)),
            (
                "ActiveState".to_string(),
                if self.is_active_from(&conf) {
                    "active"
                } else {
                    "dead"
                }
                .to_string(),
            ),
            (
                "LoadState".to_string(),
                if conf.loaded() { "loaded" } else { "not-loaded" }.to_string(),
            ),
        ];
        let env_parts = conf.getlist("Service", "Environment");
        if !env_parts.is_empty() {
            items.push(("Environment".to_string(), env_parts.join(" ")));
        }
        let env_files = conf.getlist("Service", "EnvironmentFile");
        if !env_files.is_empty() {
            items.push(("EnvironmentFile".to_string(), env_files.join(" ")));
        }
        items
    }

    /// Raw text of the primary descriptor file for every matched unit.
    /// The success flag is separate from the accumulated text.
    pub fn cat_units(&mut self, modules: &[String]) -> (bool, String) {
        let mut done = true;
        let mut result = String::new();
        for unit in self.catalog.match_units(modules, ".service") {
            let Some(path) = self.catalog.unit_file(&unit) else {
                warn!("Unit {unit} is not-loaded");
                done = false;
                continue;
            };
            match fs::read_to_string(&path) {
                Ok(text) => {
                    if !result.is_empty() {
                        result.push('\n');
                    }
                    result.push_str(&text);
                }
                Err(err) => {
                    warn!("Unit {unit} is not-loaded: {err}");
                    done = false;
                }
            }
        }
        (done, result)
    }

    /// One `(unit, loaded, description)` row per known unit, sorted by name.
    pub fn list_units(&mut self, modules: &[String]) -> Vec<(String, String, String)> {
        let mut units = self.catalog.match_units(modules, ".service");
        units.sort();
        units
            .into_iter()
            .map(|unit| {
                let conf = self.catalog.try_read_unit(&unit);
                let loaded = if conf.loaded() { "loaded" } else { "" };
                let description = Self::description_from(&conf);
                (unit, loaded.to_string(), description)
            })
            .collect()
    }
}

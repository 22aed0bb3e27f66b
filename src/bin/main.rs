use std::{fs, process};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use systemctl_lite::{
    cli::{Cli, parse_args},
    engine::{Settings, Systemctl},
    error::SystemctlError,
    paths::SystemPaths,
};

fn main() {
    let args = parse_args();
    let paths = SystemPaths::new(args.root.clone());
    init_logging(&args, &paths);

    let settings = Settings {
        force: args.force,
        quiet: args.quiet,
        full: args.full,
        property: args.property.clone(),
        ..Settings::default()
    };
    let mut engine = Systemctl::new(settings, paths);

    let verb = args.verb.clone().unwrap_or_else(default_verb);
    info!("EXEC BEGIN {verb} {}", args.units.join(" "));
    let code = dispatch(&mut engine, &verb, &args.units);
    info!("EXEC END {code}");
    process::exit(code);
}

/// With no verb, behave as a listing tool; as PID 1 (or 0), behave as init.
fn default_verb() -> String {
    match process::id() {
        0 => "0".to_string(),
        1 => "1".to_string(),
        _ => "list-units".to_string(),
    }
}

fn dispatch(engine: &mut Systemctl, verb: &str, units: &[String]) -> i32 {
    match verb {
        "list-units" => {
            for (unit, loaded, description) in engine.list_units(units) {
                println!("{unit}\t{loaded}\t{description}");
            }
            0
        }
        "show" => {
            print!("{}", engine.show_units(units));
            0
        }
        "status" => {
            let (code, text) = engine.status_units(units);
            println!("{text}");
            code
        }
        "cat" => {
            let (done, text) = engine.cat_units(units);
            print!("{text}");
            exit_for(done)
        }
        "start" => exit_for(engine.start_units(units)),
        "stop" => exit_for(engine.stop_units(units)),
        "reload" => exit_for(engine.reload_units(units)),
        "restart" => exit_for(engine.restart_units(units)),
        "try-restart" => exit_for(engine.try_restart_units(units)),
        "reload-or-restart" => exit_for(engine.reload_or_restart_units(units)),
        "reload-or-try-restart" => exit_for(engine.reload_or_try_restart_units(units)),
        "kill" => exit_for(engine.kill_units(units)),
        "is-active" => exit_for(engine.is_active_units(units)),
        "is-failed" => exit_for(engine.is_failed_units(units)),
        "is-enabled" => exit_for(engine.is_enabled_units(units)),
        "enable" => exit_for(engine.enable_units(units)),
        "disable" => exit_for(engine.disable_units(units)),
        "daemon-reload" => {
            info!("ignored daemon-reload");
            0
        }
        "default" => init_result(engine.system_default()),
        "halt" => init_result(engine.system_halt()),
        "0" | "1" => init_result(engine.system_init()),
        "version" => {
            println!("Version\t{}", env!("CARGO_PKG_VERSION"));
            println!("Package\t{}", env!("CARGO_PKG_NAME"));
            0
        }
        other => {
            error!("no method for '{other}'");
            1
        }
    }
}

fn init_result(result: Result<bool, SystemctlError>) -> i32 {
    match result {
        Ok(done) => exit_for(done),
        Err(err) => {
            error!("{err}");
            1
        }
    }
}

fn exit_for(done: bool) -> i32 {
    if done { 0 } else { 1 }
}

/// Appends to the log file when it already exists, otherwise logs to stderr.
/// Each `-v` raises the verbosity one step; the file surface starts at
/// `info`, the stderr surface at `error`.
fn init_logging(args: &Cli, paths: &SystemPaths) {
    let log_path = paths.log_file();
    let to_file = log_path.is_file();
    let base: usize = if to_file { 2 } else { 0 };
    let level = match base + args.verbose as usize {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };
    let make_filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if to_file {
        match fs::OpenOptions::new().append(true).open(&log_path) {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(make_filter())
                    .with_writer(move || file.try_clone().unwrap())
                    .with_ansi(false)
                    .try_init();
                return;
            }
            Err(err) => {
                eprintln!("failed to open log file {}: {err}", log_path.display());
            }
        }
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(make_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

//! Environment assembly for launched service commands.
//!
//! The child environment starts from the parent process environment and is
//! overlaid first with `Environment=` chunks, then with `EnvironmentFile=`
//! contents. Both accept shell-style `KEY=VALUE` lines where the value may be
//! wrapped in single or double quotes.

use std::{collections::HashMap, env, fs, path::Path};

use regex::Regex;
use tracing::info;

use crate::unit::UnitDescriptor;

/// Scans one `Environment=<chunk>` value: lines split on embedded newlines,
/// blanks and comments skipped.
pub fn read_env_part(chunk: &str) -> Vec<(String, String)> {
    let single = Regex::new(r"^([\w_]+)='([^']*)'").unwrap();
    let double = Regex::new(r#"^([\w_]+)="([^"]*)""#).unwrap();
    let plain = Regex::new(r"^([\w_]+)=(.*)$").unwrap();

    let mut pairs = Vec::new();
    for raw in chunk.split('\n') {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for pattern in [&single, &double, &plain] {
            if let Some(caps) = pattern.captures(line) {
                pairs.push((caps[1].to_string(), caps[2].to_string()));
                break;
            }
        }
    }
    pairs
}

/// Scans one `EnvironmentFile=<path>` value. A leading `-` silently tolerates
/// a missing file; without it the miss is logged and contributes nothing.
pub fn read_env_file(env_file: &str) -> Vec<(String, String)> {
    let (tolerate_missing, path) = match env_file.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, env_file),
    };
    let path = Path::new(path);
    if !path.is_file() {
        if !tolerate_missing {
            info!("while reading {}: no such file", path.display());
        }
        return Vec::new();
    }
    match fs::read_to_string(path) {
        Ok(text) => read_env_part(&text),
        Err(err) => {
            info!("while reading {}: {err}", path.display());
            Vec::new()
        }
    }
}

/// Builds the full child environment for a descriptor.
pub fn environment_from(conf: &UnitDescriptor) -> HashMap<String, String> {
    let mut environment: HashMap<String, String> = env::vars().collect();
    for chunk in conf.getlist("Service", "Environment") {
        for (name, value) in read_env_part(chunk) {
            environment.insert(name, value);
        }
    }
    for file in conf.getlist("Service", "EnvironmentFile") {
        for (name, value) in read_env_file(file) {
            environment.insert(name, value);
        }
    }
    environment
}

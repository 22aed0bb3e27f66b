//! Unit descriptor parsing.
//!
//! A `*.service` file has a structure similar to an `*.ini` file but is not
//! one: options may occur multiple times in a section and accumulate into an
//! implicit list, values continue across lines with a trailing backslash, and
//! legacy init scripts carry an LSB comment header that is lifted into the
//! same in-memory shape. Downstream code never sees which dialect a
//! descriptor came from.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use regex::Regex;

use crate::error::SystemctlError;

/// Synthetic section holding the raw keys of a legacy LSB header.
const INIT_INFO_SECTION: &str = "init.d";

/// Parsed representation of one unit file plus its drop-ins.
///
/// Sections map option names to ordered value lists; repeated assignments
/// append, and an explicitly empty assignment resets the list. The descriptor
/// remembers every file parsed into it, the last one being the primary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitDescriptor {
    sections: HashMap<String, HashMap<String, Vec<String>>>,
    files: Vec<PathBuf>,
}

impl UnitDescriptor {
    /// A placeholder descriptor for a unit that has no file on disk.
    /// `loaded()` stays false so callers can render "not-loaded" output.
    pub fn not_found(unit: &str) -> Self {
        let mut conf = Self::default();
        conf.set("Unit", "Id", unit);
        conf.set("Unit", "Names", unit);
        conf.set("Unit", "Description", &format!("NOT-FOUND {unit}"));
        conf
    }

    /// Records a value for an option, appending to earlier occurrences.
    /// An empty value resets the option to an empty list.
    pub fn set(&mut self, section: &str, option: &str, value: &str) {
        let values = self
            .sections
            .entry(section.to_string())
            .or_default()
            .entry(option.to_string())
            .or_default();
        if value.is_empty() {
            values.clear();
        } else {
            values.push(value.to_string());
        }
    }

    /// First value of an option, if any.
    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.getlist(section, option).first().map(String::as_str)
    }

    /// First value of an option, or `default` when absent or reset.
    pub fn get_or<'a>(&'a self, section: &str, option: &str, default: &'a str) -> &'a str {
        self.get(section, option).unwrap_or(default)
    }

    /// All values of an option in source order; empty when absent.
    pub fn getlist(&self, section: &str, option: &str) -> &[String] {
        self.sections
            .get(section)
            .and_then(|options| options.get(option))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the section has been opened by any parsed file.
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Whether the option has been assigned in the section.
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|options| options.contains_key(option))
    }

    /// True once at least one file has been parsed into this descriptor.
    pub fn loaded(&self) -> bool {
        !self.files.is_empty()
    }

    /// The primary file: the last one parsed.
    pub fn filename(&self) -> Option<&Path> {
        self.files.last().map(PathBuf::as_path)
    }

    /// Every file parsed into this descriptor, in read order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Parses a modern section-based unit file into this descriptor.
    ///
    /// A nonexistent path is not an error here; the descriptor simply stays
    /// unloaded. Unrecognized lines outside a continuation are.
    pub fn read_sysd(&mut self, path: &Path) -> Result<(), SystemctlError> {
        if !path.is_file() {
            return Ok(());
        }
        let text = fs::read_to_string(path)?;
        self.files.push(path.to_path_buf());

        let assign = Regex::new(r"^(\w+)=(.*)$").unwrap();
        let mut section = String::new();
        // (option, value-so-far) while a backslash continuation is open
        let mut pending: Option<(String, String)> = None;

        for (idx, raw) in text.lines().enumerate() {
            if let Some((name, mut value)) = pending.take() {
                match raw.strip_suffix('\\') {
                    Some(stripped) => {
                        value.push_str(stripped);
                        value.push('\n');
                        pending = Some((name, value));
                    }
                    None => {
                        value.push_str(raw);
                        self.set(&section, &name, &value);
                    }
                }
                continue;
            }

            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                if let Some(end) = line.find(']')
                    && end > 0
                {
                    section = line[1..end].to_string();
                    self.sections.entry(section.clone()).or_default();
                }
                continue;
            }

            let Some(caps) = assign.captures(line) else {
                return Err(SystemctlError::DescriptorSyntax {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    text: line.to_string(),
                });
            };
            let name = caps[1].to_string();
            let value = caps[2].trim();
            match value.strip_suffix('\\') {
                Some(stripped) => {
                    let mut acc = stripped.to_string();
                    acc.push('\n');
                    pending = Some((name, acc));
                }
                None => self.set(&section, &name, value),
            }
        }

        if let Some((name, value)) = pending {
            self.set(&section, &name, &value);
        }
        Ok(())
    }

    /// Parses a legacy init script: the LSB `BEGIN INIT INFO` header is
    /// scanned and converted to (almost) equivalent modern settings.
    pub fn read_sysv(&mut self, path: &Path) -> Result<(), SystemctlError> {
        if !path.is_file() {
            return Ok(());
        }
        let text = fs::read_to_string(path)?;
        self.files.push(path.to_path_buf());

        let header = Regex::new(r"^(\S+)\s*(\w[\w_-]*):(.*)$").unwrap();
        let mut in_info = false;
        for raw in text.lines() {
            let line = raw.trim();
            if !line.starts_with('#') {
                continue;
            }
            if line.contains(" BEGIN INIT INFO") {
                in_info = true;
            }
            if line.contains(" END INIT INFO") {
                in_info = false;
            }
            if in_info
                && let Some(caps) = header.captures(line)
            {
                let key = caps[2].to_string();
                let value = caps[3].trim().to_string();
                self.set(INIT_INFO_SECTION, &key, &value);
            }
        }

        self.synthesize_from_init_info();
        Ok(())
    }

    /// Derives the modern sections listed in the header translation table.
    fn synthesize_from_init_info(&mut self) {
        let description = self.get_or(INIT_INFO_SECTION, "Description", "").to_string();
        self.set("Unit", "Description", &description);

        let required = self.get_or(INIT_INFO_SECTION, "Required-Start", "").to_string();
        for item in required.split(' ') {
            match item.trim() {
                "$network" => self.set("Unit", "After", "network.target"),
                "$remote_fs" => self.set("Unit", "After", "remote-fs.target"),
                "$local_fs" => self.set("Unit", "After", "local-fs.target"),
                "$timer" => self.set("Unit", "Requires", "basic.target"),
                _ => {}
            }
        }

        let provides = self.get_or(INIT_INFO_SECTION, "Provides", "").to_string();
        if !provides.is_empty() {
            self.set("Install", "Alias", &provides);
        }

        // a unit defaulting to runlevel 3 belongs to multi-user.target
        let runlevels = self.get_or(INIT_INFO_SECTION, "Default-Start", "").to_string();
        if runlevels.contains('5') {
            self.set("Install", "WantedBy", "graphical.target");
        }
        if runlevels.contains('3') {
            self.set("Install", "WantedBy", "multi-user.target");
        }

        self.set("Service", "Type", "sysv");
    }
}

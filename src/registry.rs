//! Enable/disable registry.
//!
//! Modern descriptors are enabled through symlinks in the per-target
//! `.wants/` directory; legacy init scripts through `S50`/`K50` links in the
//! runlevel 3 and 5 directories. Enablement state is always re-read from
//! disk, never cached.

use std::{fs, os::unix::fs::symlink, path::Path};

use regex::Regex;
use tracing::{debug, info};

use crate::catalog::Dialect;
use crate::engine::Systemctl;
use crate::error::SystemctlError;
use crate::unit::UnitDescriptor;

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

impl Systemctl {
    /// First `Install.WantedBy` value, if any.
    fn wanted_from(conf: &UnitDescriptor) -> Option<String> {
        conf.get("Install", "WantedBy").map(str::to_string)
    }

    /// Enables every matched unit.
    pub fn enable_units(&mut self, modules: &[String]) -> bool {
        let mut done = true;
        for unit in self.catalog.match_units(modules, ".service") {
            match self.enable_unit(&unit) {
                Ok(true) => {}
                Ok(false) => done = false,
                Err(err) => {
                    tracing::error!("{unit}: {err}");
                    done = false;
                }
            }
        }
        done
    }

    /// Enables one unit: a wants-directory link for modern descriptors,
    /// runlevel links for legacy scripts. A modern unit without `WantedBy`
    /// has nothing to enable and reports false.
    pub fn enable_unit(&mut self, unit: &str) -> Result<bool, SystemctlError> {
        let Some(unit_file) = self.catalog.unit_file(unit) else {
            return Err(SystemctlError::UnitNotFound(unit.to_string()));
        };
        if self.catalog.dialect_of(&unit_file) == Some(Dialect::Sysv) {
            return self.enable_unit_sysv(&unit_file);
        }

        let conf = self.catalog.try_read_unit(unit);
        let Some(wanted) = Self::wanted_from(&conf) else {
            debug!("unit '{unit}' has no WantedBy target; static");
            return Ok(false);
        };
        let folder = self.paths.enable_folder(&wanted);
        if !folder.is_dir() {
            fs::create_dir_all(&folder)?;
        }
        let target = folder.join(basename(&unit_file));
        info!(
            "ln -s {}'{}' '{}'",
            if self.settings.force { "-f " } else { "" },
            unit_file.display(),
            target.display()
        );
        if self.settings.force && target.is_symlink() {
            fs::remove_file(&target)?;
        }
        if !target.is_symlink() {
            symlink(&unit_file, &target)?;
        }
        Ok(true)
    }

    // a unit wanted at runlevel 3 is also started in runlevel 5
    fn enable_unit_sysv(&self, unit_file: &Path) -> Result<bool, SystemctlError> {
        let rc3 = self.enable_unit_sysv_folder(unit_file, &self.paths.rc3_folder())?;
        let rc5 = self.enable_unit_sysv_folder(unit_file, &self.paths.rc5_folder())?;
        Ok(rc3 && rc5)
    }

    fn enable_unit_sysv_folder(
        &self,
        unit_file: &Path,
        rc_folder: &Path,
    ) -> Result<bool, SystemctlError> {
        let name = basename(unit_file);
        if !rc_folder.is_dir() {
            fs::create_dir_all(rc_folder)?;
        }
        let (name_s, name_k) = existing_rc_names(rc_folder, &name)?;
        let target = rc_folder.join(&name_s);
        if !target.exists() {
            symlink(unit_file, &target)?;
        }
        let target = rc_folder.join(&name_k);
        if !target.exists() {
            symlink(unit_file, &target)?;
        }
        Ok(true)
    }

    /// Disables every matched unit.
    pub fn disable_units(&mut self, modules: &[String]) -> bool {
        let mut done = true;
        for unit in self.catalog.match_units(modules, ".service") {
            match self.disable_unit(&unit) {
                Ok(true) => {}
                Ok(false) => done = false,
                Err(err) => {
                    tracing::error!("{unit}: {err}");
                    done = false;
                }
            }
        }
        done
    }

    /// Removes the enablement links of one unit.
    pub fn disable_unit(&mut self, unit: &str) -> Result<bool, SystemctlError> {
        let Some(unit_file) = self.catalog.unit_file(unit) else {
            return Err(SystemctlError::UnitNotFound(unit.to_string()));
        };
        if self.catalog.dialect_of(&unit_file) == Some(Dialect::Sysv) {
            return self.disable_unit_sysv(&unit_file);
        }

        let conf = self.catalog.try_read_unit(unit);
        let Some(wanted) = Self::wanted_from(&conf) else {
            return Ok(false);
        };
        let folder = self.paths.enable_folder(&wanted);
        if !folder.is_dir() {
            return Ok(false);
        }
        let target = folder.join(basename(&unit_file));
        if target.is_symlink() {
            info!(
                "rm {}'{}'",
                if self.settings.force { "-f " } else { "" },
                target.display()
            );
            fs::remove_file(&target)?;
        }
        Ok(true)
    }

    fn disable_unit_sysv(&self, unit_file: &Path) -> Result<bool, SystemctlError> {
        let rc3 = self.disable_unit_sysv_folder(unit_file, &self.paths.rc3_folder())?;
        let rc5 = self.disable_unit_sysv_folder(unit_file, &self.paths.rc5_folder())?;
        Ok(rc3 && rc5)
    }

    fn disable_unit_sysv_folder(
        &self,
        unit_file: &Path,
        rc_folder: &Path,
    ) -> Result<bool, SystemctlError> {
        let name = basename(unit_file);
        let (name_s, name_k) = existing_rc_names(rc_folder, &name)?;
        let target = rc_folder.join(&name_s);
        if target.is_symlink() || target.exists() {
            fs::remove_file(&target)?;
        }
        let target = rc_folder.join(&name_k);
        if target.is_symlink() || target.exists() {
            fs::remove_file(&target)?;
        }
        Ok(true)
    }

    /// True when every matched unit is enabled.
    pub fn is_enabled_units(&mut self, modules: &[String]) -> bool {
        let mut result = true;
        for unit in self.catalog.match_units(modules, ".service") {
            match self.is_enabled_unit(&unit) {
                Ok(true) => {}
                Ok(false) => result = false,
                Err(err) => {
                    debug!("{unit}: {err}");
                    result = false;
                }
            }
        }
        result
    }

    /// Whether one unit's enablement link exists. A modern unit without
    /// `WantedBy` has nothing to check against and reports enabled.
    pub fn is_enabled_unit(&mut self, unit: &str) -> Result<bool, SystemctlError> {
        let Some(unit_file) = self.catalog.unit_file(unit) else {
            return Err(SystemctlError::UnitNotFound(unit.to_string()));
        };
        if self.catalog.dialect_of(&unit_file) == Some(Dialect::Sysv) {
            return Ok(self.is_enabled_sysv(&unit_file));
        }

        let conf = self.catalog.try_read_unit(unit);
        let Some(wanted) = Self::wanted_from(&conf) else {
            return Ok(true);
        };
        let target = self.paths.enable_folder(&wanted).join(basename(&unit_file));
        Ok(target.is_symlink() || target.is_file())
    }

    fn is_enabled_sysv(&self, unit_file: &Path) -> bool {
        let name = basename(unit_file);
        self.paths.rc3_folder().join(format!("S50{name}")).exists()
    }

    /// Enablement word for status output: `enabled`, `disabled`, or
    /// `static` for a modern unit without `WantedBy`.
    pub(crate) fn enabled_state_from(&mut self, conf: &UnitDescriptor) -> String {
        let Some(unit_file) = conf.filename().map(Path::to_path_buf) else {
            return "disabled".to_string();
        };
        if self.catalog.dialect_of(&unit_file) == Some(Dialect::Sysv) {
            return if self.is_enabled_sysv(&unit_file) {
                "enabled"
            } else {
                "disabled"
            }
            .to_string();
        }
        let Some(wanted) = Self::wanted_from(conf) else {
            return "static".to_string();
        };
        let target = self.paths.enable_folder(&wanted).join(basename(&unit_file));
        if target.is_symlink() || target.is_file() {
            "enabled".to_string()
        } else {
            "disabled".to_string()
        }
    }
}

/// Scans an rc directory for existing `S##name`/`K##name` entries so that a
/// prior numbering is reused rather than duplicated. Falls back to
/// `S50`/`K50`.
fn existing_rc_names(rc_folder: &Path, name: &str) -> Result<(String, String), SystemctlError> {
    let mut name_s = format!("S50{name}");
    let mut name_k = format!("K50{name}");
    if !rc_folder.is_dir() {
        return Ok((name_s, name_k));
    }
    let start_entry = Regex::new(r"^S\d\d(.*)$").unwrap();
    let kill_entry = Regex::new(r"^K\d\d(.*)$").unwrap();
    for entry in fs::read_dir(rc_folder)?.flatten() {
        let found = entry.file_name().to_string_lossy().to_string();
        if let Some(caps) = start_entry.captures(&found)
            && caps[1] == *name
        {
            name_s = found.clone();
        }
        if let Some(caps) = kill_entry.captures(&found)
            && caps[1] == *name
        {
            name_k = found;
        }
    }
    Ok((name_s, name_k))
}

//! Unit catalog: scanning, name resolution, and glob matching.
//!
//! Two search paths exist per dialect; each is scanned once per process and
//! cached, with the second directory winning on name conflicts. Legacy names
//! get a synthetic `.service` suffix so lookups are uniform.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use glob::Pattern;
use tracing::{debug, warn};

use crate::error::SystemctlError;
use crate::paths::SystemPaths;
use crate::unit::UnitDescriptor;

/// Which on-disk format a unit file was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Modern section-based descriptor.
    Sysd,
    /// Legacy init script with an LSB header.
    Sysv,
}

/// Maps unit names to their files and caches parsed descriptors.
pub struct UnitCatalog {
    paths: SystemPaths,
    sysd_units: Option<BTreeMap<String, PathBuf>>,
    sysv_units: Option<BTreeMap<String, PathBuf>>,
    loaded_sysd: HashMap<PathBuf, Arc<UnitDescriptor>>,
    loaded_sysv: HashMap<PathBuf, Arc<UnitDescriptor>>,
}

impl UnitCatalog {
    /// Creates an empty catalog; directories are scanned on first use.
    pub fn new(paths: SystemPaths) -> Self {
        Self {
            paths,
            sysd_units: None,
            sysv_units: None,
            loaded_sysd: HashMap::new(),
            loaded_sysv: HashMap::new(),
        }
    }

    fn sysd_units(&mut self) -> &BTreeMap<String, PathBuf> {
        let folders = self.paths.sysd_folders();
        self.sysd_units.get_or_insert_with(|| {
            let map = scan_folders(&folders, false);
            debug!("found {} sysd files", map.len());
            map
        })
    }

    fn sysv_units(&mut self) -> &BTreeMap<String, PathBuf> {
        let folders = self.paths.sysv_folders();
        self.sysv_units.get_or_insert_with(|| {
            let map = scan_folders(&folders, true);
            debug!("found {} sysv files", map.len());
            map
        })
    }

    /// File path for the given module in the modern catalog, accepting names
    /// with or without the `.service` suffix.
    pub fn sysd_file(&mut self, module: &str) -> Option<PathBuf> {
        let units = self.sysd_units();
        units
            .get(module)
            .or_else(|| units.get(&format!("{module}.service")))
            .cloned()
    }

    /// File path for the given module in the legacy catalog.
    pub fn sysv_file(&mut self, module: &str) -> Option<PathBuf> {
        let units = self.sysv_units();
        units
            .get(module)
            .or_else(|| units.get(&format!("{module}.service")))
            .cloned()
    }

    /// File path for the given module, modern catalog first.
    pub fn unit_file(&mut self, module: &str) -> Option<PathBuf> {
        self.sysd_file(module).or_else(|| self.sysv_file(module))
    }

    /// Which catalog a previously resolved file belongs to.
    pub fn dialect_of(&mut self, path: &Path) -> Option<Dialect> {
        if self.sysd_units().values().any(|known| known == path) {
            return Some(Dialect::Sysd);
        }
        if self.sysv_units().values().any(|known| known == path) {
            return Some(Dialect::Sysv);
        }
        None
    }

    /// Parses a modern descriptor plus its `<path>.d/*.conf` drop-ins, in
    /// sorted order. Results are cached per primary path.
    pub fn read_sysd_file(&mut self, path: &Path) -> Result<Arc<UnitDescriptor>, SystemctlError> {
        if let Some(conf) = self.loaded_sysd.get(path) {
            return Ok(conf.clone());
        }
        let mut unit = UnitDescriptor::default();
        unit.read_sysd(path)?;

        let override_dir = PathBuf::from(format!("{}.d", path.display()));
        if override_dir.is_dir() {
            let mut overrides: Vec<PathBuf> = fs::read_dir(&override_dir)?
                .flatten()
                .map(|entry| entry.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "conf"))
                .collect();
            overrides.sort();
            for file in overrides {
                unit.read_sysd(&file)?;
            }
        }

        let conf = Arc::new(unit);
        self.loaded_sysd.insert(path.to_path_buf(), conf.clone());
        Ok(conf)
    }

    /// Parses a legacy init script, cached per path.
    pub fn read_sysv_file(&mut self, path: &Path) -> Result<Arc<UnitDescriptor>, SystemctlError> {
        if let Some(conf) = self.loaded_sysv.get(path) {
            return Ok(conf.clone());
        }
        let mut unit = UnitDescriptor::default();
        unit.read_sysv(path)?;
        let conf = Arc::new(unit);
        self.loaded_sysv.insert(path.to_path_buf(), conf.clone());
        Ok(conf)
    }

    /// Reads the unit file for a module, whichever dialect resolves it.
    pub fn read_unit(&mut self, module: &str) -> Result<Arc<UnitDescriptor>, SystemctlError> {
        if let Some(path) = self.sysd_file(module) {
            return self.read_sysd_file(&path);
        }
        if let Some(path) = self.sysv_file(module) {
            return self.read_sysv_file(&path);
        }
        warn!("unit file not found: {module}");
        Err(SystemctlError::UnitNotFound(module.to_string()))
    }

    /// Accepts that a unit does not exist and returns a descriptor that says
    /// "not-loaded" instead of failing.
    pub fn try_read_unit(&mut self, module: &str) -> Arc<UnitDescriptor> {
        match self.read_unit(module) {
            Ok(conf) => conf,
            Err(err) => {
                debug!("read unit '{module}': {err}");
                Arc::new(UnitDescriptor::not_found(module))
            }
        }
    }

    /// Matches unit names against glob patterns across both catalogs:
    /// per-dialect sorted order, modern first, duplicates removed. Empty
    /// patterns match every known unit. A bare name also matches once the
    /// default suffix is appended.
    pub fn match_units(&mut self, modules: &[String], suffix: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for dialect in [Dialect::Sysd, Dialect::Sysv] {
            let units = match dialect {
                Dialect::Sysd => self.sysd_units(),
                Dialect::Sysv => self.sysv_units(),
            };
            for name in units.keys() {
                if matches_any(name, modules, suffix) && !found.contains(name) {
                    found.push(name.clone());
                }
            }
        }
        found
    }
}

fn matches_any(name: &str, modules: &[String], suffix: &str) -> bool {
    if modules.is_empty() {
        return true;
    }
    modules.iter().any(|module| {
        Pattern::new(module)
            .map(|pattern| pattern.matches(name))
            .unwrap_or(false)
            || format!("{module}{suffix}") == name
    })
}

fn scan_folders(folders: &[PathBuf], service_suffix: bool) -> BTreeMap<String, PathBuf> {
    let mut map = BTreeMap::new();
    for folder in folders {
        if !folder.is_dir() {
            continue;
        }
        let Ok(entries) = fs::read_dir(folder) else {
            continue;
        };
        for entry in entries.flatten() {
            let Ok(mut name) = entry.file_name().into_string() else {
                continue;
            };
            if !entry.path().is_file() {
                continue;
            }
            if service_suffix {
                name.push_str(".service");
            }
            map.insert(name, entry.path());
        }
    }
    map
}

#[path = "common/mod.rs"]
mod common;

use std::fs;

use common::{write_sysd_unit, write_sysv_script, write_vendor_unit};
use systemctl_lite::catalog::{Dialect, UnitCatalog};
use systemctl_lite::environ;
use systemctl_lite::paths::SystemPaths;
use tempfile::tempdir;

fn catalog_for(root: &std::path::Path) -> UnitCatalog {
    UnitCatalog::new(SystemPaths::new(Some(root.to_path_buf())))
}

#[test]
fn second_search_directory_wins() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_vendor_unit(root, "base.service", "[Service]\nType=simple\n");
    let etc_path = write_sysd_unit(root, "base.service", "[Service]\nType=oneshot\n");

    let mut catalog = catalog_for(root);
    assert_eq!(catalog.unit_file("base"), Some(etc_path));
}

#[test]
fn resolution_tries_service_suffix_and_falls_back_to_sysv() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let sysd = write_sysd_unit(root, "alpha.service", "[Service]\nType=simple\n");
    let sysv = write_sysv_script(root, "legacy", common::demo_init_script());

    let mut catalog = catalog_for(root);
    assert_eq!(catalog.unit_file("alpha"), Some(sysd.clone()));
    assert_eq!(catalog.unit_file("alpha.service"), Some(sysd.clone()));
    assert_eq!(catalog.unit_file("legacy"), Some(sysv.clone()));
    assert_eq!(catalog.unit_file("legacy.service"), Some(sysv.clone()));
    assert_eq!(catalog.unit_file("ghost"), None);

    assert_eq!(catalog.dialect_of(&sysd), Some(Dialect::Sysd));
    assert_eq!(catalog.dialect_of(&sysv), Some(Dialect::Sysv));
}

#[test]
fn match_units_is_sorted_per_dialect_with_modern_first() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_sysd_unit(root, "zeta.service", "[Service]\nType=simple\n");
    write_sysd_unit(root, "alpha.service", "[Service]\nType=simple\n");
    write_sysv_script(root, "legacy", common::demo_init_script());

    let mut catalog = catalog_for(root);
    let all = catalog.match_units(&[], ".service");
    assert_eq!(
        all,
        vec![
            "alpha.service".to_string(),
            "zeta.service".to_string(),
            "legacy.service".to_string(),
        ]
    );
}

#[test]
fn match_units_accepts_globs_and_bare_names() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_sysd_unit(root, "web.service", "[Service]\nType=simple\n");
    write_sysd_unit(root, "worker.service", "[Service]\nType=simple\n");

    let mut catalog = catalog_for(root);
    assert_eq!(
        catalog.match_units(&["w*".to_string()], ".service"),
        vec!["web.service".to_string(), "worker.service".to_string()]
    );
    assert_eq!(
        catalog.match_units(&["web".to_string()], ".service"),
        vec!["web.service".to_string()]
    );
    // patterns naming both dialects dedup to first-seen order
    let both = catalog.match_units(&["web".to_string(), "web.service".to_string()], ".service");
    assert_eq!(both, vec!["web.service".to_string()]);
}

#[test]
fn drop_ins_append_to_the_base_descriptor() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_sysd_unit(
        root,
        "demo.service",
        "[Service]\nType=simple\nExecStart=/bin/sleep 1\n",
    );
    let dropin_dir = root.join("etc/systemd/system/demo.service.d");
    fs::create_dir_all(&dropin_dir).unwrap();
    fs::write(dropin_dir.join("10-env.conf"), "[Service]\nEnvironment=A=1\n").unwrap();
    fs::write(dropin_dir.join("notes.txt"), "ignored\n").unwrap();

    let mut catalog = catalog_for(root);
    let conf = catalog.read_unit("demo").unwrap();
    assert_eq!(conf.getlist("Service", "Environment"), &["A=1".to_string()]);

    // the assembled environment reflects the drop-in
    let environment = environ::environment_from(&conf);
    assert_eq!(environment.get("A"), Some(&"1".to_string()));
}

#[test]
fn descriptors_are_cached_per_path() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let path = write_sysd_unit(root, "demo.service", "[Unit]\nDescription=one\n");

    let mut catalog = catalog_for(root);
    let first = catalog.read_unit("demo").unwrap();
    // a rewrite is not observed: the cache serves the parsed descriptor
    fs::write(&path, "[Unit]\nDescription=two\n").unwrap();
    let second = catalog.read_unit("demo").unwrap();
    assert_eq!(first.get("Unit", "Description"), second.get("Unit", "Description"));
}

#[test]
fn try_read_unit_yields_not_loaded_placeholder() {
    let temp = tempdir().unwrap();
    let mut catalog = catalog_for(temp.path());
    let conf = catalog.try_read_unit("ghost.service");
    assert!(!conf.loaded());
    assert_eq!(
        conf.get("Unit", "Description"),
        Some("NOT-FOUND ghost.service")
    );
}

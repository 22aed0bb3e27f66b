#[path = "common/mod.rs"]
mod common;

use common::{demo_init_script, engine_for, write_sysd_unit, write_sysv_script};
use systemctl_lite::engine::{Settings, Systemctl};
use systemctl_lite::paths::SystemPaths;
use tempfile::tempdir;

#[test]
fn status_of_inactive_unit_exits_3() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_sysd_unit(
        root,
        "demo.service",
        "[Unit]\nDescription=demo\n[Service]\nType=simple\nExecStart=/bin/sleep 1\n",
    );
    let mut engine = engine_for(root);

    let (code, text) = engine.status_units(&["demo".to_string()]);
    assert_eq!(code, 3);
    assert!(text.starts_with("demo.service - demo"));
    assert!(text.contains("Loaded: loaded ("));
    assert!(text.contains("Active: inactive (dead)"));
}

#[test]
fn status_of_unparseable_unit_reports_failed() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_sysd_unit(root, "broken.service", "[Service]\nthis is not a setting\n");
    let mut engine = engine_for(root);

    let (code, text) = engine.status_units(&["broken".to_string()]);
    assert_eq!(code, 3);
    assert!(text.contains("Loaded: failed"));
}

#[test]
fn show_renders_the_property_list() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_sysd_unit(
        root,
        "demo.service",
        "[Unit]\nDescription=demo\n[Service]\nType=simple\nEnvironment=A=1\nExecStart=/bin/sleep 1\n",
    );
    let mut engine = engine_for(root);

    let text = engine.show_units(&["demo".to_string()]);
    assert!(text.contains("Id=demo.service\n"));
    assert!(text.contains("Names=demo.service\n"));
    assert!(text.contains("Description=demo\n"));
    assert!(text.contains("MainPID=0\n"));
    assert!(text.contains("SubState=dead\n"));
    assert!(text.contains("ActiveState=dead\n"));
    assert!(text.contains("LoadState=loaded\n"));
    assert!(text.contains("Environment=A=1\n"));
}

#[test]
fn show_honors_a_property_filter() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_sysd_unit(
        root,
        "demo.service",
        "[Unit]\nDescription=demo\n[Service]\nExecStart=/bin/sleep 1\n",
    );
    let settings = Settings {
        property: Some("Description".to_string()),
        ..common::test_settings()
    };
    let mut engine = Systemctl::new(settings, SystemPaths::new(Some(root.to_path_buf())));

    let text = engine.show_units(&["demo".to_string()]);
    assert_eq!(text, "Description=demo\n");
}

#[test]
fn show_of_missing_unit_renders_not_loaded_block() {
    let temp = tempdir().unwrap();
    let mut engine = engine_for(temp.path());

    let text = engine.show_units(&["ghost".to_string()]);
    assert!(text.contains("Id=ghost\n"));
    assert!(text.contains("Description=NOT-FOUND ghost\n"));
    assert!(text.contains("LoadState=not-loaded\n"));
}

#[test]
fn show_of_legacy_unit_carries_the_translated_description() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_sysv_script(root, "demo", demo_init_script());
    let mut engine = engine_for(root);

    let text = engine.show_units(&["demo".to_string()]);
    assert!(text.contains("Description=d\n"), "show text was: {text}");
}

#[test]
fn cat_returns_the_raw_descriptor_text() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let content = "[Unit]\nDescription=demo\n[Service]\nExecStart=/bin/sleep 1\n";
    write_sysd_unit(root, "demo.service", content);
    let mut engine = engine_for(root);

    let (done, text) = engine.cat_units(&["demo".to_string()]);
    assert!(done);
    assert_eq!(text, content);
}

#[test]
fn list_units_reports_loaded_flag_and_description() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_sysd_unit(
        root,
        "beta.service",
        "[Unit]\nDescription=second\n[Service]\nExecStart=/bin/sleep 1\n",
    );
    write_sysd_unit(
        root,
        "alpha.service",
        "[Unit]\nDescription=first\n[Service]\nExecStart=/bin/sleep 1\n",
    );
    let mut engine = engine_for(root);

    let rows = engine.list_units(&[]);
    assert_eq!(
        rows,
        vec![
            (
                "alpha.service".to_string(),
                "loaded".to_string(),
                "first".to_string()
            ),
            (
                "beta.service".to_string(),
                "loaded".to_string(),
                "second".to_string()
            ),
        ]
    );
}

#[test]
fn is_failed_reports_inactive_units() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_sysd_unit(
        root,
        "demo.service",
        "[Service]\nType=simple\nExecStart=/bin/sleep 1\n",
    );
    let mut engine = engine_for(root);

    assert!(engine.is_failed_units(&["demo".to_string()]));
    assert!(!engine.is_active_units(&["demo".to_string()]));
}

#[path = "common/mod.rs"]
mod common;

use std::fs;

use common::{engine_for, pid_file_for, write_sysd_unit};
use systemctl_lite::process;
use tempfile::tempdir;

#[test]
fn simple_start_tracks_pid_and_stop_clears_it() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_sysd_unit(
        root,
        "demo.service",
        "[Unit]\nDescription=demo\n[Service]\nType=simple\nExecStart=/bin/sleep 30\n",
    );
    let mut engine = engine_for(root);

    assert!(engine.start_units(&["demo".to_string()]));

    let pid_file = pid_file_for(root, "demo.service");
    assert!(pid_file.is_file());
    let pid = process::read_pid_file(&pid_file).expect("pid recorded");
    assert!(process::pid_alive(pid).unwrap());
    assert!(engine.is_active_units(&["demo".to_string()]));

    let (code, text) = engine.status_units(&["demo".to_string()]);
    assert_eq!(code, 0);
    assert!(text.contains("demo.service - demo"));
    assert!(text.contains(&format!("Active: active (PID {pid})")));

    assert!(engine.stop_units(&["demo".to_string()]));
    assert!(!pid_file.exists());
    assert!(!engine.is_active_units(&["demo".to_string()]));

    let (code, _) = engine.status_units(&["demo".to_string()]);
    assert_eq!(code, 3);
}

#[test]
fn oneshot_start_waits_for_completion() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let marker = root.join("marker.txt");
    write_sysd_unit(
        root,
        "once.service",
        &format!(
            "[Service]\nType=oneshot\nExecStart=echo ran > {}\n",
            marker.display()
        ),
    );
    let mut engine = engine_for(root);

    assert!(engine.start_units(&["once".to_string()]));
    assert_eq!(fs::read_to_string(&marker).unwrap().trim(), "ran");
}

#[test]
fn environment_overlay_reaches_the_child() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let marker = root.join("env-marker.txt");
    write_sysd_unit(
        root,
        "envy.service",
        &format!(
            "[Service]\nType=oneshot\nEnvironment=A=1\nEnvironment=B=two words\nEnvironmentFile=-/missing\nExecStart=echo $A-$B > {}\n",
            marker.display()
        ),
    );
    let mut engine = engine_for(root);

    // the missing env file carries a leading dash and must not fail the verb
    assert!(engine.start_units(&["envy".to_string()]));
    assert_eq!(fs::read_to_string(&marker).unwrap().trim(), "1-two words");
}

#[test]
fn pre_and_post_hooks_run_in_order() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let log = root.join("order.txt");
    write_sysd_unit(
        root,
        "hooked.service",
        &format!(
            "[Service]\nType=oneshot\nExecStartPre=echo pre >> {log}\nExecStart=echo main >> {log}\nExecStartPost=echo post >> {log}\n",
            log = log.display()
        ),
    );
    let mut engine = engine_for(root);

    assert!(engine.start_units(&["hooked".to_string()]));
    assert_eq!(fs::read_to_string(&log).unwrap(), "pre\nmain\npost\n");
}

#[test]
fn failing_checked_hook_aborts_the_verb() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let marker = root.join("never.txt");
    write_sysd_unit(
        root,
        "strict.service",
        &format!(
            "[Service]\nType=oneshot\nExecStartPre=/bin/false\nExecStart=touch {}\n",
            marker.display()
        ),
    );
    let mut engine = engine_for(root);

    assert!(!engine.start_units(&["strict".to_string()]));
    assert!(!marker.exists());
}

#[test]
fn dashed_hook_failure_is_ignored() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let marker = root.join("ran.txt");
    write_sysd_unit(
        root,
        "lenient.service",
        &format!(
            "[Service]\nType=oneshot\nExecStartPre=-/bin/false\nExecStart=touch {}\n",
            marker.display()
        ),
    );
    let mut engine = engine_for(root);

    assert!(engine.start_units(&["lenient".to_string()]));
    assert!(marker.exists());
}

#[test]
fn forking_start_waits_for_declared_pid_file() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let declared = root.join("run/forker.pid");
    fs::create_dir_all(root.join("run")).unwrap();
    write_sysd_unit(
        root,
        "forker.service",
        &format!(
            "[Service]\nType=forking\nPIDFile={pid}\nExecStart=sleep 30 & echo $! > {pid}\n",
            pid = declared.display()
        ),
    );
    let mut engine = engine_for(root);

    assert!(engine.start_units(&["forker".to_string()]));
    let pid = process::read_pid_file(&declared).expect("pid appeared");
    assert!(process::pid_alive(pid).unwrap());
    assert!(engine.is_active_units(&["forker".to_string()]));

    assert!(engine.stop_units(&["forker".to_string()]));
    assert!(!declared.exists());
    assert!(!engine.is_active_units(&["forker".to_string()]));
}

#[test]
fn restart_records_a_new_pid() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_sysd_unit(
        root,
        "sleepy.service",
        "[Service]\nType=simple\nExecStart=/bin/sleep 30\n",
    );
    let mut engine = engine_for(root);

    assert!(engine.start_units(&["sleepy".to_string()]));
    let pid_file = pid_file_for(root, "sleepy.service");
    let pid1 = process::read_pid_file(&pid_file).unwrap();

    assert!(engine.restart_units(&["sleepy".to_string()]));
    let pid2 = process::read_pid_file(&pid_file).unwrap();
    assert_ne!(pid1, pid2, "restart should record a new PID");

    // reap the stopped child so it does not linger as a zombie
    let _ = nix::sys::wait::waitpid(nix::unistd::Pid::from_raw(pid1), None);
    assert!(!process::pid_alive(pid1).unwrap());
    assert!(process::pid_alive(pid2).unwrap());

    engine.stop_units(&["sleepy".to_string()]);
}

#[test]
fn batch_failure_does_not_skip_later_units() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let marker = root.join("good-ran.txt");
    write_sysd_unit(root, "aaa-bad.service", "[Service]\nType=bogus\nExecStart=/bin/true\n");
    write_sysd_unit(
        root,
        "zzz-good.service",
        &format!("[Service]\nType=oneshot\nExecStart=touch {}\n", marker.display()),
    );
    let mut engine = engine_for(root);

    let done = engine.start_units(&["aaa-bad".to_string(), "zzz-good".to_string()]);
    assert!(!done, "aggregate result degrades on the failing unit");
    assert!(marker.exists(), "later unit still ran");
}

#[test]
fn try_restart_of_inactive_unit_succeeds_silently() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let marker = root.join("restarted.txt");
    write_sysd_unit(
        root,
        "idle.service",
        &format!("[Service]\nType=oneshot\nExecStart=touch {}\n", marker.display()),
    );
    let mut engine = engine_for(root);

    assert!(engine.try_restart_units(&["idle".to_string()]));
    assert!(!marker.exists(), "inactive unit is left alone");
}

#[test]
fn reload_or_restart_starts_an_inactive_unit() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let marker = root.join("started.txt");
    write_sysd_unit(
        root,
        "lazy.service",
        &format!("[Service]\nType=oneshot\nExecStart=touch {}\n", marker.display()),
    );
    let mut engine = engine_for(root);

    assert!(engine.reload_or_restart_units(&["lazy".to_string()]));
    assert!(marker.exists());
}

#[test]
fn kill_terminates_without_removing_the_pid_file() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    // forking shape so the victim is not a direct child of the test process
    let declared = root.join("run/victim.pid");
    fs::create_dir_all(root.join("run")).unwrap();
    write_sysd_unit(
        root,
        "victim.service",
        &format!(
            "[Service]\nType=forking\nPIDFile={pid}\nExecStart=sleep 30 & echo $! > {pid}\n",
            pid = declared.display()
        ),
    );
    let mut engine = engine_for(root);

    assert!(engine.start_units(&["victim".to_string()]));
    assert!(engine.is_active_units(&["victim".to_string()]));

    assert!(engine.kill_units(&["victim".to_string()]));
    assert!(declared.is_file(), "kill leaves the PID file in place");
    assert!(!engine.is_active_units(&["victim".to_string()]));
    assert!(engine.is_failed_units(&["victim".to_string()]));
}

#[test]
fn unknown_unit_start_fails() {
    let temp = tempdir().unwrap();
    let mut engine = engine_for(temp.path());
    // a single-unit start reports the lookup failure
    assert!(engine.start_unit("ghost").is_err());
    // a batch over a pattern matching nothing has nothing to do
    assert!(engine.start_units(&["ghost*".to_string()]));
}

//! Binary behaviour with a broken configuration file.
//!
//! `dirs` honours the XDG variables on Linux only.
#![cfg(target_os = "linux")]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn discretizer(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_discretizer"))
        .args(args)
        .current_dir(home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to start discretizer")
}

fn broken_home() -> TempDir {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join("config").join("discretizer");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("discretizer.toml"), "criterion = [broken\n").unwrap();
    home
}

#[test]
fn test_commands_without_settings_ignore_broken_config() {
    let home = broken_home();
    let dir = home.path();

    let generated = discretizer(dir, &["generate", "gen.csv", "--rows", "10", "--seed", "3"]);
    assert!(generated.status.success());
    assert!(dir.join("gen.csv").exists());

    let preview = discretizer(dir, &["preview", "gen.csv", "--rows", "2"]);
    assert!(preview.status.success());
    assert!(String::from_utf8_lossy(&preview.stdout).contains("Objects: 10"));

    assert!(discretizer(dir, &["history", "--clear"]).status.success());
    assert!(discretizer(dir, &["history"]).status.success());

    let show = discretizer(dir, &["config", "show"]);
    assert!(show.status.success());
    assert!(String::from_utf8_lossy(&show.stdout).contains("criterion = [broken"));
}

#[test]
fn test_run_reports_broken_config() {
    let home = broken_home();
    let dir = home.path();
    fs::write(dir.join("t.csv"), "x,d\n1,A\n2,B\n").unwrap();

    let run = discretizer(dir, &["run", "t.csv"]);
    assert_eq!(run.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&run.stderr).contains("Configuration error"));
    assert!(!dir.join("t.csv_main_discretized.csv").exists());
}

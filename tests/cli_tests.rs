use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

fn cli() -> Command {
    Command::cargo_bin("instance-sync").expect("binary built")
}

#[test]
fn check_config_accepts_valid_file() {
    let file = write_temp_config(
        r#"
[bus]
brokers = ["ws://bus:8080/stream"]
consumer_group = "sync"
topic = "containers"
"#,
    );

    cli()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("Topic: containers"));
}

#[test]
fn check_config_fails_on_invalid_file() {
    let file = write_temp_config(
        r#"
[bus]
brokers = []
consumer_group = "sync"
topic = "containers"
"#,
    );

    cli()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("bus.brokers"));
}

#[test]
fn run_fails_on_missing_config() {
    cli()
        .args(["run", "--config", "/nonexistent/instance-sync.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn unknown_subcommand_is_rejected() {
    cli().arg("serve").assert().failure();
}

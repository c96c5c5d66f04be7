//! End-to-end tests over the `folder-semantic-index` binary's CLI surface:
//! the one thing this crate exposes outside of its library API.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

#[test]
fn once_indexes_a_folder_passed_via_flag_and_exits_successfully() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("notes.txt"),
        "A reasonably detailed note covering several distinct topics so that chunk \
         semantic extraction clears the quality floor reliably during the startup scan.",
    )
    .unwrap();

    Command::cargo_bin("folder-semantic-index")
        .unwrap()
        .arg("--folder")
        .arg(dir.path())
        .arg("--once")
        .assert()
        .success();
}

#[test]
fn refuses_to_start_with_no_folders_configured() {
    let empty_config = tempfile::tempdir().unwrap();
    let config_path = empty_config.path().join("empty.toml");
    fs::write(&config_path, "").unwrap();

    Command::cargo_bin("folder-semantic-index")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .arg("--once")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no folders configured"));
}

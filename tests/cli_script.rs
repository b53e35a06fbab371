use assert_cmd::Command;
use onboard_core::domain::{keys, FieldValue, FormValues};
use onboard_core::utils::persistence::save_values;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::tempdir;

fn cli(config_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("onboard_cli").unwrap();
    cmd.env("ONBOARD_CLI_SCRIPT", "1")
        .env("ONBOARD_CONFIG", config_dir.join("wizard.json"))
        .env("RUST_LOG", "off");
    cmd
}

const LISTING_SCRIPT: &str = "\
Ana
youtube

https://youtube.com/@ana
Travel, Food
English
maharashtra
mumbai
Bandra




5000
1500
1000
add
kind 1 combo
item 1
set 1 2 reel 3
price 1 2500
done
upload://avatar.png


";

#[test]
fn script_mode_submits_listing_to_out_dir() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("submissions");

    cli(dir.path())
        .args(["run", "--out"])
        .arg(&out)
        .write_stdin(LISTING_SCRIPT)
        .assert()
        .success()
        .stdout(contains("Listing submitted."))
        .stdout(contains("saved to"));

    let files: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    let json = std::fs::read_to_string(&files[0]).unwrap();
    assert!(json.contains("\"Mumbai\""));
    assert!(json.contains("\"combo\""));
    assert!(json.contains("\"reel\""));
}

#[test]
fn script_mode_reports_step_errors_and_cancels_at_eof() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("submissions");

    cli(dir.path())
        .args(["run", "--out"])
        .arg(&out)
        .write_stdin("\n\n\n\n\n\n\n\n\n")
        .assert()
        .success()
        .stdout(contains("name: Name is required"))
        .stdout(contains("Nothing was submitted."));

    assert!(!out.exists());
}

#[test]
fn steps_prints_json_definitions() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .arg("steps")
        .assert()
        .success()
        .stdout(contains("\"title\": \"Rates & offers\""))
        .stdout(contains("\"key\": \"youtube_url\""));
}

#[test]
fn check_flags_invalid_values_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("values.json");
    let mut values = FormValues::new();
    values.insert(keys::NAME, FieldValue::text("A"));
    save_values(&values, &path).unwrap();

    cli(dir.path())
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stdout(contains("name: Name must be at least 2 characters"))
        .stderr(contains("step(s) failed validation"));
}

#[test]
fn unknown_command_fails() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .arg("launch")
        .assert()
        .failure()
        .stderr(contains("unknown command").and(contains("launch")));
}

#[test]
fn version_prints_package_version() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

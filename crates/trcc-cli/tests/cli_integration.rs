//! Integration tests for the `trcc` binary.
//!
//! These exercise the CLI end to end via `assert_cmd`, sticking to
//! subcommands that never require real hardware (discovery always succeeds
//! with an empty list in a sandbox; `theme`/`hr10 dry-run` work purely off
//! files).

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("trcc")
}

#[test]
fn cli_help_succeeds() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("trcc"));
}

#[test]
fn cli_discover_succeeds_without_hardware() {
    cli().arg("discover").assert().success();
}

#[test]
fn cli_discover_json_produces_valid_json() {
    let output = cli()
        .args(["--json", "discover"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("discover --json should produce valid JSON");
    assert!(json["count"].is_number());
    assert!(json["devices"].is_array());
}

#[test]
fn cli_devices_succeeds() {
    cli().arg("devices").assert().success();
}

#[test]
fn cli_devices_json_lists_known_devices() {
    let output = cli()
        .args(["--json", "devices"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("devices --json should produce valid JSON");
    assert!(json["count"].as_u64().unwrap() > 0, "registry should not be empty");
}

#[test]
fn cli_probe_unknown_device_fails() {
    cli()
        .args(["probe", "--device", "ffff:ffff"])
        .assert()
        .failure();
}

#[test]
fn cli_send_help_succeeds() {
    cli()
        .args(["send", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("color").or(predicate::str::contains("image")));
}

// ── E2E-5: .tr export/import round-trip through the theme subcommand ──

#[test]
fn cli_theme_info_zt_round_trips_a_generated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("theme.zt");

    // A minimal valid Theme.zt: magic byte, frame count, one timestamp, one
    // size-prefixed (fake) JPEG payload.
    let mut bytes = vec![0xDCu8];
    bytes.extend(1i32.to_le_bytes());
    bytes.extend(0i32.to_le_bytes());
    let jpeg = [0xFFu8, 0xD8, 0xFF, 0xD9];
    bytes.extend((jpeg.len() as i32).to_le_bytes());
    bytes.extend(jpeg);
    std::fs::write(&path, &bytes).unwrap();

    cli()
        .args(["theme", "info-zt", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Frames:"));
}

#[test]
fn cli_theme_info_tr_rejects_alternate_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.tr");
    let mut bytes = vec![0xDC, 0xDC, 0xDC, 0xDC];
    bytes.extend(std::iter::repeat(0u8).take(64));
    std::fs::write(&path, &bytes).unwrap();

    cli()
        .args(["theme", "info-tr", path.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn cli_theme_info_tr_missing_file_fails() {
    cli()
        .args(["theme", "info-tr", "/nonexistent/archive.tr"])
        .assert()
        .failure();
}

// ── hr10 dry-run: sensor file, no hardware ──

#[test]
fn cli_hr10_dry_run_reads_sensor_file() {
    let dir = tempfile::tempdir().unwrap();
    let sensor = dir.path().join("temp1_input");
    std::fs::write(&sensor, "55000\n").unwrap();

    cli()
        .args(["hr10", "dry-run", "--sensor", sensor.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("temp="));
}

#[test]
fn cli_hr10_dry_run_missing_sensor_fails() {
    cli()
        .args(["hr10", "dry-run", "--sensor", "/nonexistent/hwmon/temp1_input"])
        .assert()
        .failure();
}

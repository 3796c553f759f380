// Integration tests for the headless binary using assert_cmd.

use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;

const BIN: &str = "antforage";

#[test]
fn headless_run_prints_summary() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin(BIN)?;
    cmd.args([
        "--headless",
        "--ticks", "200",
        "--seed", "42",
        "-n", "25",
        "--report-every", "0",
    ]);

    cmd.assert()
        .success()
        .stdout(contains("Simulation summary"))
        .stdout(contains("ticks: 200"))
        .stdout(contains("ants: 25"));

    Ok(())
}

#[test]
fn headless_recording_writes_frames_and_metadata() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("run");

    let mut cmd = Command::cargo_bin(BIN)?;
    cmd.args([
        "--headless",
        "--ticks", "20",
        "--seed", "7",
        "--width", "200",
        "--height", "150",
        "--record-every", "10",
        "--record", out.to_str().unwrap(),
    ]);

    cmd.assert().success().stdout(contains("Frames written: 3"));

    assert!(out.join("frame_0000.png").exists());
    assert!(out.join("frame_0002.png").exists());
    let metadata: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("metadata.json"))?)?;
    assert_eq!(metadata["frame_count"], 3);
    assert_eq!(metadata["last_tick"], 20);
    assert_eq!(metadata["width"], 200);

    Ok(())
}

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pools.json")
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("poolcharts").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("poolcharts"));
}

#[test]
fn render_writes_one_file_per_group() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("chart.svg");
    let mut cmd = Command::cargo_bin("poolcharts").unwrap();
    cmd.arg("render")
        .arg("--input")
        .arg(fixture())
        .arg("--out")
        .arg(&out)
        .args(["--hide", "raw_change_in_usd"]);
    cmd.assert().success();
    assert!(dir.path().join("chart-USDC.svg").exists());
    assert!(dir.path().join("chart-WETH.svg").exists());
}

#[test]
fn render_single_group_keeps_path() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("usdc.png");
    let mut cmd = Command::cargo_bin("poolcharts").unwrap();
    cmd.arg("render")
        .arg("--input")
        .arg(fixture())
        .arg("--out")
        .arg(&out)
        .args(["--group", "USDC", "--adjusted", "--legend", "right"]);
    cmd.assert().success();
    assert!(out.exists());
}

#[test]
fn inspect_prints_domains_and_tooltip() {
    let mut cmd = Command::cargo_bin("poolcharts").unwrap();
    cmd.arg("inspect")
        .arg("--input")
        .arg(fixture())
        .args(["--group", "USDC", "--catalog", "combo"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("USDC"))
        .stdout(predicate::str::contains("Date: 1/3/2024"))
        .stdout(predicate::str::contains("Pool TVL: $1,100,000"));
}

#[test]
fn inspect_json_reflects_hidden_series() {
    let mut cmd = Command::cargo_bin("poolcharts").unwrap();
    cmd.arg("inspect")
        .arg("--input")
        .arg(fixture())
        .args(["--group", "WETH", "--hide", "token_usd_amount", "--json"]);
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let legend = v[0]["legend"].as_array().unwrap();
    let tvl = legend
        .iter()
        .find(|e| e["key"] == "token_usd_amount")
        .unwrap();
    assert_eq!(tvl["active"], false);
}

#[test]
fn unknown_hide_key_fails() {
    let mut cmd = Command::cargo_bin("poolcharts").unwrap();
    cmd.arg("inspect")
        .arg("--input")
        .arg(fixture())
        .args(["--hide", "no_such_field"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown series key"));
}

#[test]
fn unknown_group_fails() {
    let mut cmd = Command::cargo_bin("poolcharts").unwrap();
    cmd.arg("inspect")
        .arg("--input")
        .arg(fixture())
        .args(["--group", "DAI"]);
    cmd.assert().failure();
}

//! End-to-end tests for the `hwsel` binary against fixture engines and
//! machine documents.

#![cfg(test)]
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

/// Engines and machines shared with the kernel's selection tests.
fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../hwsel-kernel/tests/fixtures")
}

fn machine(name: &str) -> PathBuf {
    fixtures().join("machines").join(format!("{name}.yaml"))
}

/// `hwsel` isolated from the user's settings, state and cache.
fn hwsel(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hwsel").expect("hwsel bin");
    cmd.env("HWSEL_ENGINES_DIR", fixtures().join("engines"))
        .env("HWSEL_STATE_DIR", home.path().join("state"))
        .env("HWSEL_CACHE_DIR", home.path().join("cache"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("NO_COLOR", "1")
        .env_remove("HWSEL_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn auto_selects_best_stable_engine() {
    let home = tempdir().expect("tempdir");

    hwsel(&home)
        .args(["use-engine", "--auto", "--machine"])
        .arg(machine("xps13-9350"))
        .assert()
        .success()
        .stdout(contains("Evaluating engines for optimal hardware compatibility:"))
        .stdout(contains("✔ cpu-avx2: compatible, score=14"))
        .stdout(contains("− experimental-tpu: devel"))
        .stdout(contains("✘ arm-neon: not compatible"))
        .stdout(contains("Selected engine: intel-gpu"))
        .stdout(contains("- openvino-runtime"));

    let state = fs::read_to_string(home.path().join("state/active-engine.json")).expect("state");
    let state: Value = serde_json::from_str(&state).expect("valid state json");
    assert_eq!(state["name"], "intel-gpu");
    assert_eq!(state["configurations"]["engine.device"], "GPU");
    assert!(state["selected-at"].is_string());
}

#[test]
fn switching_engine_replaces_configuration() {
    let home = tempdir().expect("tempdir");

    hwsel(&home).args(["use-engine", "cpu-avx2"]).assert().success();
    hwsel(&home)
        .args(["use-engine", "intel-npu"])
        .assert()
        .success()
        .stdout(contains("Engine changed to \"intel-npu\"."));

    let state = fs::read_to_string(home.path().join("state/active-engine.json")).expect("state");
    let state: Value = serde_json::from_str(&state).expect("valid state json");
    assert_eq!(state["configurations"]["engine.device"], "NPU");
    assert!(state["configurations"].get("engine.threads").is_none());

    hwsel(&home)
        .args(["use-engine", "intel-npu"])
        .assert()
        .success()
        .stdout(contains("already in use"));
}

#[test]
fn unknown_engine_is_rejected() {
    let home = tempdir().expect("tempdir");

    hwsel(&home)
        .args(["use-engine", "no-such-engine"])
        .assert()
        .failure()
        .stderr(contains("engine \"no-such-engine\" does not exist"));
}

#[test]
fn list_engines_marks_active_engine() {
    let home = tempdir().expect("tempdir");
    hwsel(&home).args(["use-engine", "cpu-avx1"]).assert().success();

    let output = hwsel(&home)
        .args(["list-engines", "--machine"])
        .arg(machine("xps13-9350"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let table = String::from_utf8(output).expect("utf8");

    assert!(table.contains("cpu-avx1*"));
    assert!(table.contains("devel"));
    // highest score first
    let intel_gpu = table.find("intel-gpu").expect("intel-gpu row");
    let cpu_avx2 = table.find("cpu-avx2").expect("cpu-avx2 row");
    let arm = table.find("arm-neon").expect("arm-neon row");
    assert!(intel_gpu < cpu_avx2 && cpu_avx2 < arm);
}

#[test]
fn show_engine_as_json() {
    let home = tempdir().expect("tempdir");

    let output = hwsel(&home)
        .args(["show-engine", "cpu-avx2", "--format", "json", "--machine"])
        .arg(machine("xps13-9350"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let engine: Value = serde_json::from_slice(&output).expect("valid json output");
    assert_eq!(engine["name"], "cpu-avx2");
    assert_eq!(engine["score"], 14);
    assert_eq!(engine["compatible"], true);
    assert!(engine.get("compatibility-issues").is_none());
}

#[test]
fn show_engine_without_active_engine_fails() {
    let home = tempdir().expect("tempdir");

    hwsel(&home)
        .args(["show-engine", "--machine"])
        .arg(machine("xps13-9350"))
        .assert()
        .failure()
        .stderr(contains("no active engine"));
}

#[test]
fn no_compatible_engine_has_friendly_message() {
    let home = tempdir().expect("tempdir");

    hwsel(&home)
        .args(["use-engine", "--auto", "--machine"])
        .arg(machine("bare-vm"))
        .assert()
        .code(2)
        .stdout(contains("✘ cpu-avx1: not compatible: host system memory too small"))
        .stderr(contains("No compatible engine found for this machine."));

    assert!(!home.path().join("state/active-engine.json").exists());
}

#[test]
fn show_machine_prints_document() {
    let home = tempdir().expect("tempdir");

    let output = hwsel(&home)
        .args(["show-machine", "--format", "json", "--machine"])
        .arg(machine("xps13-9350"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let snapshot: Value = serde_json::from_slice(&output).expect("valid json output");
    assert_eq!(snapshot["pci"].as_array().map(Vec::len), Some(3));
    assert_eq!(snapshot["pci"][1]["device-class"], "0x1200");
    assert_eq!(snapshot["cpus"][0]["manufacturer-id"], "GenuineIntel");
}

#[test]
fn validate_engines_reports_each_path() {
    let home = tempdir().expect("tempdir");
    let broken = home.path().join("broken");
    fs::create_dir_all(&broken).expect("mkdir");
    fs::write(
        broken.join("engine.yaml"),
        "name: something-else\ndescription: d\nvendor: v\ngrade: stable\n",
    )
    .expect("write manifest");

    hwsel(&home)
        .args(["debug", "validate-engines"])
        .arg(fixtures().join("engines/cpu-avx2/engine.yaml"))
        .arg(broken.join("engine.yaml"))
        .assert()
        .failure()
        .stdout(contains("✔").and(contains("cpu-avx2/engine.yaml")))
        .stdout(contains("✘").and(contains("broken != something-else")))
        .stderr(contains("not all manifests are valid"));

    hwsel(&home)
        .args(["debug", "validate-engines"])
        .arg(fixtures().join("engines/intel-gpu/engine.yaml"))
        .assert()
        .success();
}

#[test]
fn select_engine_reads_machine_from_stdin() {
    let home = tempdir().expect("tempdir");
    let rtx = fs::read_to_string(machine("rtx-desktop")).expect("fixture");

    hwsel(&home)
        .args(["debug", "select-engine"])
        .write_stdin(rtx.clone())
        .assert()
        .success()
        .stdout(contains("top-engine: cuda-generic"))
        .stderr(contains("Selected engine for your hardware configuration: cuda-generic"));

    let output = hwsel(&home)
        .args(["debug", "select-engine", "--format", "json", "--engines"])
        .arg(fixtures().join("engines"))
        .write_stdin(rtx)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let selection: Value = serde_json::from_slice(&output).expect("valid json output");
    assert_eq!(selection["top-engine"], "cuda-generic");
    let engines = selection["engines"].as_array().expect("engines array");
    assert_eq!(engines.len(), 7);
    let cuda = engines.iter().find(|e| e["name"] == "cuda-generic").expect("cuda");
    assert_eq!(cuda["score"], 82);
}

#[test]
fn settings_file_points_at_engines() {
    let home = tempdir().expect("tempdir");
    let settings = home.path().join("hwsel.yaml");
    fs::write(&settings, "engines_dir: /nonexistent/engines\n").expect("write settings");

    // the environment outranks the file
    hwsel(&home)
        .arg("--config")
        .arg(&settings)
        .args(["list-engines", "--machine"])
        .arg(machine("xps13-9350"))
        .assert()
        .success();

    hwsel(&home)
        .env_remove("HWSEL_ENGINES_DIR")
        .arg("--config")
        .arg(&settings)
        .args(["list-engines", "--machine"])
        .arg(machine("xps13-9350"))
        .assert()
        .failure()
        .stderr(contains("/nonexistent/engines"));
}

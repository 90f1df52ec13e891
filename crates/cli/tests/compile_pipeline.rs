// End-to-end tests for the `cinder` binary over the fixture inventory.
// Run with: cargo test -p cinder-cli --test compile_pipeline

use std::path::{Path, PathBuf};
use std::process::Command;

fn cinder() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cinder"))
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(format!("tests/fixtures/{name}"))
}

#[test]
fn compile_fixture_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("inventory.csv");

    let status = cinder()
        .arg("compile")
        .arg(fixture("run.toml"))
        .arg("--output")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let content = std::fs::read_to_string(&output).unwrap();
    let mut lines = content.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("registry_id,facility_id,unit_id,"));
    assert!(header.ends_with("estimate_source,recon_branch"));

    // R1 is dual without OCS: the tier estimate wins under the default
    // policy and the NEI unit u1 is not emitted separately.
    assert!(content.contains("R1,g1,Boiler 1"));
    assert!(!content.contains(",u1,"));

    // R2 reports only to the pollutant inventory; the kiln row carries
    // throughput but no energy columns.
    let kiln = lines.clone().find(|l| l.contains(",k1,")).unwrap();
    assert!(kiln.contains("nei_only"));

    // R3's OCS lump fits the two sub-units, which are retained unchanged.
    let sub_a = lines.clone().find(|l| l.contains(",sub_a,")).unwrap();
    assert!(sub_a.contains("ocs_nei_retained"));
}

#[test]
fn compile_twice_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.csv");
    let second = dir.path().join("b.csv");

    for output in [&first, &second] {
        let status = cinder()
            .arg("compile")
            .arg(fixture("run.toml"))
            .arg("--output")
            .arg(output)
            .status()
            .unwrap();
        assert!(status.success());
    }

    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
}

#[test]
fn compile_json_summary_parses() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("inventory.csv");

    let out = cinder()
        .arg("compile")
        .arg(fixture("run.toml"))
        .arg("--output")
        .arg(&output)
        .arg("--json")
        .output()
        .unwrap();
    assert!(out.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["facilities_dual"], 2);
    assert_eq!(summary["facilities_nei_only"], 1);
    assert_eq!(summary["ocs_retained"], 1);
}

#[test]
fn validate_reports_ok() {
    let out = cinder()
        .arg("validate")
        .arg(fixture("run.toml"))
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("ok: fixture compile"));
}

#[test]
fn missing_column_exits_with_schema_code() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("inventory.csv");

    let out = cinder()
        .arg("compile")
        .arg(fixture("bad.toml"))
        .arg("--output")
        .arg(&output)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&out.stderr).contains("pollutant_code"));
}

#[test]
fn missing_config_exits_with_io_code() {
    let out = cinder()
        .arg("compile")
        .arg(fixture("does_not_exist.toml"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
}

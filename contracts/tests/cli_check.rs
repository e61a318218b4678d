//! CLI tests for `contracts check`, `members` and `call`.
//!
//! Spawns the contracts binary and verifies exit codes and printed
//! diagnostics for clean, rejecting and invalid manifests.

use std::process::Command;

use contracts::exit_codes;
use contracts::io::config::{ContractsConfig, load_config};
use contracts::test_support::{GREETER_MANIFEST, TestManifest, rejecting_manifest};

fn contracts(manifest: &TestManifest) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_contracts"));
    command.current_dir(manifest.dir()).env_remove("RUST_LOG");
    command
}

#[test]
fn check_clean_manifest_exits_ok() {
    let manifest = TestManifest::new(GREETER_MANIFEST).expect("manifest");
    let output = contracts(&manifest)
        .arg("check")
        .arg(&manifest.path)
        .output()
        .expect("contracts check");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ok: EnglishGreeter"));
}

#[test]
fn check_rejecting_manifest_reports_diagnostics() {
    let manifest = TestManifest::new(&rejecting_manifest()).expect("manifest");
    let output = contracts(&manifest)
        .arg("check")
        .arg(&manifest.path)
        .output()
        .expect("contracts check");

    assert_eq!(output.status.code(), Some(exit_codes::REJECTED));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rejected: Mute"));
    assert!(stdout.contains("  - missing method: greet()"));
    assert!(stdout.contains("rejected: Duck"));
    assert!(stdout.contains("'Swimmer' conflicts with 'Flyer'"));
}

#[test]
fn check_invalid_manifest_exits_invalid() {
    let manifest = TestManifest::new("[[interfaces]]\nname = 42\n").expect("manifest");
    let output = contracts(&manifest)
        .arg("check")
        .arg(&manifest.path)
        .output()
        .expect("contracts check");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("manifest schema validation failed"));
}

#[test]
fn members_lists_interface_members() {
    let manifest = TestManifest::new(GREETER_MANIFEST).expect("manifest");
    let output = contracts(&manifest)
        .arg("members")
        .arg(&manifest.path)
        .arg("Greeter")
        .output()
        .expect("contracts members");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec![
            "method greet",
            "method farewell (default)",
            "attribute language: string"
        ]
    );
}

#[test]
fn call_prints_default_method_result() {
    let manifest = TestManifest::new(GREETER_MANIFEST).expect("manifest");
    let output = contracts(&manifest)
        .arg("call")
        .arg(&manifest.path)
        .arg("EnglishGreeter")
        .arg("farewell")
        .output()
        .expect("contracts call");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "\"goodbye\"");
}

#[test]
fn invalid_config_exits_invalid() {
    let manifest = TestManifest::new(GREETER_MANIFEST).expect("manifest");
    std::fs::write(
        manifest.dir().join("contracts.toml"),
        "[policy]\nprivate_prefix = \"\"\n",
    )
    .expect("write config");

    let output = contracts(&manifest)
        .arg("check")
        .arg(&manifest.path)
        .output()
        .expect("contracts check");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("private_prefix"));
}

#[test]
fn init_writes_default_config_once() {
    let manifest = TestManifest::new(GREETER_MANIFEST).expect("manifest");
    let output = contracts(&manifest)
        .arg("init")
        .output()
        .expect("contracts init");
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let path = manifest.dir().join("contracts.toml");
    let loaded = load_config(&path).expect("load written config");
    assert_eq!(loaded, ContractsConfig::default());

    let again = contracts(&manifest)
        .arg("init")
        .output()
        .expect("contracts init");
    assert_eq!(again.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&again.stderr).contains("--force"));

    let forced = contracts(&manifest)
        .args(["init", "--force"])
        .output()
        .expect("contracts init --force");
    assert_eq!(forced.status.code(), Some(exit_codes::OK));
}

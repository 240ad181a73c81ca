//! Integration tests for the CLI binary.
//!
//! This test is registered as a [[test]] in the agentic-wallet-cli crate
//! so that CARGO_BIN_EXE_awl is available.

use std::path::Path;
use std::process::{Command, Output};

const STEWARD_SEED: &str = "000000000000000000000000Steward1";
const STEWARD_VERKEY: &str = "FYmoFw55GeQH7SRFa37dkx1d2dZ3zUF8ckg7wmL7ofN4";
const STEWARD_DID: &str = "Th7MpTaRZVRYnPiabds81Y";

/// Get a Command pointing to the `awl` binary.
fn awl_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_awl"))
}

/// Run `awl` against a wallet in `dir`.
fn awl_in(dir: &Path, args: &[&str]) -> Output {
    awl_binary()
        .arg("--dir")
        .arg(dir)
        .args(args)
        .output()
        .expect("failed to execute awl")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "awl should exit with success, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn cli_responds_to_help() {
    let output = awl_binary()
        .arg("--help")
        .output()
        .expect("failed to execute awl --help");

    assert_success(&output);
    let stdout = stdout(&output);
    assert!(
        stdout.contains("awl") || stdout.contains("AgenticWallet") || stdout.contains("Usage"),
        "awl --help output should contain usage information, got: {stdout}"
    );
}

#[test]
fn cli_responds_to_version() {
    let output = awl_binary()
        .arg("--version")
        .output()
        .expect("failed to execute awl --version");

    assert_success(&output);
    assert!(stdout(&output).contains("0.1"));
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let output = awl_binary()
        .arg("--nonexistent-flag")
        .output()
        .expect("failed to execute awl");

    assert!(!output.status.success());
}

#[test]
fn cli_key_create_from_seed_is_deterministic() {
    let output = awl_binary()
        .args(["key", "create", "--seed", STEWARD_SEED])
        .output()
        .expect("failed to execute awl key create");

    assert_success(&output);
    let stdout = stdout(&output);
    assert!(stdout.contains(STEWARD_VERKEY), "got: {stdout}");
    assert!(stdout.contains(STEWARD_DID), "got: {stdout}");
}

#[test]
fn cli_key_did() {
    let output = awl_binary()
        .args(["key", "did", STEWARD_VERKEY])
        .output()
        .expect("failed to execute awl key did");

    assert_success(&output);
    assert_eq!(stdout(&output).trim(), STEWARD_DID);
}

#[test]
fn cli_key_create_rejects_short_seed() {
    let output = awl_binary()
        .args(["key", "create", "--seed", "short"])
        .output()
        .expect("failed to execute awl key create");

    assert!(!output.status.success());
}

#[test]
fn cli_record_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let wallet = dir.path();

    let output = awl_in(
        wallet,
        &[
            "record", "save", "--type", "Note", "--id", "n1", "--tag", "topic=rust", "--data",
            r#"{"text":"hello"}"#,
        ],
    );
    assert_success(&output);
    assert!(wallet.join("wallet.json").exists());

    // Duplicate save fails.
    let output = awl_in(wallet, &["record", "save", "--type", "Note", "--id", "n1"]);
    assert!(!output.status.success());

    let output = awl_in(wallet, &["record", "get", "--type", "Note", "--id", "n1"]);
    assert_success(&output);
    let record: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(record["id"], "n1");
    assert_eq!(record["tags"]["topic"], "rust");
    assert_eq!(record["data"]["text"], "hello");

    let output = awl_in(
        wallet,
        &["record", "update", "--type", "Note", "--id", "n1", "--tag", "topic=go"],
    );
    assert_success(&output);

    let output = awl_in(wallet, &["record", "find", "--type", "Note", "--tag", "topic=rust"]);
    assert_success(&output);
    let found: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert!(found.is_empty());

    let output = awl_in(wallet, &["record", "list", "--type", "Note"]);
    assert_success(&output);
    let all: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["tags"]["topic"], "go");

    let output = awl_in(wallet, &["record", "delete", "--type", "Note", "--id", "n1"]);
    assert_success(&output);

    let output = awl_in(wallet, &["record", "get", "--type", "Note", "--id", "n1"]);
    assert!(!output.status.success());
}

#[test]
fn cli_verbose_emits_debug_logs() {
    let dir = tempfile::tempdir().unwrap();

    let output = awl_binary()
        .env_remove("RUST_LOG")
        .arg("--dir")
        .arg(dir.path())
        .args(["--verbose", "record", "save", "--type", "Note", "--id", "n1"])
        .output()
        .expect("failed to execute awl");
    assert_success(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("DEBUG"), "stderr: {stderr}");
    assert!(stderr.contains("save Note n1"), "stderr: {stderr}");

    let output = awl_binary()
        .env_remove("RUST_LOG")
        .arg("--dir")
        .arg(dir.path())
        .args(["record", "get", "--type", "Note", "--id", "n1"])
        .output()
        .expect("failed to execute awl");
    assert_success(&output);
    assert!(!String::from_utf8_lossy(&output.stderr).contains("DEBUG"));
}

#[test]
fn cli_message_sign_and_verify() {
    let dir = tempfile::tempdir().unwrap();
    let message_path = dir.path().join("message.json");
    std::fs::write(
        &message_path,
        r#"{"@type":"did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/test/1.0/note","@id":"m1","note":{"text":"hi"}}"#,
    )
    .unwrap();

    let output = awl_binary()
        .args(["message", "sign", "--field", "note", "--seed", STEWARD_SEED])
        .arg(&message_path)
        .output()
        .expect("failed to execute awl message sign");
    assert_success(&output);

    let signed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert!(signed.get("note").is_none());
    assert_eq!(signed["note~sig"]["signers"], STEWARD_VERKEY);

    let signed_path = dir.path().join("signed.json");
    std::fs::write(&signed_path, stdout(&output)).unwrap();

    let output = awl_binary()
        .args(["message", "verify", "--field", "note"])
        .arg(&signed_path)
        .output()
        .expect("failed to execute awl message verify");
    assert_success(&output);

    let opened: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(opened["note"]["text"], "hi");
    assert!(opened.get("note~sig").is_none());
}

#[test]
fn cli_message_verify_rejects_tampered_signature() {
    let dir = tempfile::tempdir().unwrap();
    let message_path = dir.path().join("message.json");
    std::fs::write(&message_path, r#"{"@type":"t","@id":"m1","note":"hi"}"#).unwrap();

    let output = awl_binary()
        .args(["message", "sign", "--field", "note", "--seed", STEWARD_SEED])
        .arg(&message_path)
        .output()
        .expect("failed to execute awl message sign");
    assert_success(&output);

    let mut signed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    // sig_data now claims the field was "ho".
    signed["note~sig"]["sig_data"] = serde_json::json!("ImhvIg==");
    let signed_path = dir.path().join("signed.json");
    std::fs::write(&signed_path, signed.to_string()).unwrap();

    let output = awl_binary()
        .args(["message", "verify", "--field", "note"])
        .arg(&signed_path)
        .output()
        .expect("failed to execute awl message verify");
    assert!(!output.status.success());
}

#[test]
fn cli_config_show() {
    let dir = tempfile::tempdir().unwrap();
    let output = awl_binary()
        .args(["--wallet", "alice", "config", "show"])
        .arg("--dir")
        .arg(dir.path())
        .output()
        .expect("failed to execute awl config show");

    assert_success(&output);
    let stdout = stdout(&output);
    assert!(stdout.contains("alice"), "got: {stdout}");
    assert!(stdout.contains("records"), "got: {stdout}");
}

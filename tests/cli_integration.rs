use assert_cmd::Command;
use serde_json::Value;

const ENV_VARS: [&str; 6] = [
    "SAFE_RELAY_CHAIN_URL",
    "SAFE_RELAY_CHAIN_ID",
    "SAFE_RELAY_RECOVERY_KEY",
    "SAFE_RELAY_MASTER",
    "SAFE_RELAY_FACTORY",
    "SAFE_RELAY_FALLBACK_HANDLER",
];

fn relay() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("safe-relay"));
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn run(cmd: &mut Command, stdin: &str) -> (bool, Value) {
    let output = cmd.write_stdin(stdin).output().expect("cli runs");
    let stdout = String::from_utf8(output.stdout).expect("stdout is utf8");
    let json: Value = serde_json::from_str(&stdout).expect("stdout is valid json");
    (output.status.success(), json)
}

const CREATE_BODY: &str = r#"{
    "owners": [
        "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2",
        "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1"
    ],
    "threshold": 2,
    "saltNonce": "7"
}"#;

#[test]
fn derive_address_matches_golden_value() {
    let (ok, json) = run(relay().arg("derive-address"), CREATE_BODY);

    assert!(ok, "cli failed: {}", json);
    assert_eq!(json["success"], true);
    assert_eq!(json["errorCode"], "");
    assert_eq!(
        json["result"]["address"],
        "0x00Bb1D094B60A26dFf32eABd998C0da29d77E70e"
    );
    assert_eq!(json["result"]["owners"].as_array().unwrap().len(), 2);
}

#[test]
fn derive_address_appends_recovery_owner() {
    let (ok, json) = run(
        relay().args([
            "derive-address",
            "--recovery-key",
            "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        ]),
        CREATE_BODY,
    );

    assert!(ok, "cli failed: {}", json);
    let owners = json["result"]["owners"].as_array().unwrap();
    assert_eq!(owners.len(), 3);
    assert!(owners
        .iter()
        .any(|o| o == "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23"));
    assert_ne!(
        json["result"]["address"],
        "0x00Bb1D094B60A26dFf32eABd998C0da29d77E70e"
    );
}

#[test]
fn derive_address_rejects_bad_threshold() {
    let body = CREATE_BODY.replace("\"threshold\": 2", "\"threshold\": 3");
    let (ok, json) = run(relay().arg("derive-address"), &body);

    assert!(!ok);
    assert_eq!(json["success"], false);
    assert_eq!(json["errorCode"], "invalid_config");
    assert!(json["message"].as_str().unwrap().contains("threshold"));
}

#[test]
fn hash_with_explicit_nonce_is_offline() {
    let body = r#"{
        "multisigAddress": "0x1111111111111111111111111111111111111111",
        "transaction": {
            "kind": "safe",
            "to": "0x000000000000000000000000000000000000dead",
            "value": 0,
            "data": "0x",
            "nonce": 3
        }
    }"#;
    let (ok, json) = run(relay().args(["hash", "--chain-id", "1"]), body);

    assert!(ok, "cli failed: {}", json);
    assert_eq!(
        json["result"]["digest"],
        "0x74ef35deb7aed17592bcdf52118a02bd96c7ae10beebefc7f6d198eef7eb3f24"
    );
    assert_eq!(json["result"]["action"]["nonce"], "3");
}

#[test]
fn execute_without_chain_config_fails_cleanly() {
    let body = r#"{
        "multisigAddress": "0x1111111111111111111111111111111111111111",
        "transaction": { "kind": "raw", "to": "0x000000000000000000000000000000000000dead" }
    }"#;
    let (ok, json) = run(relay().arg("execute"), body);

    assert!(!ok);
    assert_eq!(json["errorCode"], "invalid_config");
}

#[test]
fn malformed_body_is_invalid_input() {
    let (ok, json) = run(relay().arg("hash"), "not json");

    assert!(!ok);
    assert_eq!(json["errorCode"], "invalid_input");
}

#[test]
fn execute_rejects_non_hex_signature_data() {
    let body = format!(
        r#"{{
            "multisigAddress": "0x1111111111111111111111111111111111111111",
            "transaction": {{ "kind": "raw", "to": "0x000000000000000000000000000000000000dead" }},
            "signatures": [
                {{ "signer": "0x00000000000000000000000000000000000000a1", "data": "0xzz{}" }}
            ]
        }}"#,
        "11".repeat(63)
    );
    let (ok, json) = run(relay().arg("execute"), &body);

    assert!(!ok);
    assert_eq!(json["errorCode"], "invalid_input");
    assert!(json["message"].as_str().unwrap().contains("hex"));
}

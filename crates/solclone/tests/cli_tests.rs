use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use tracing::info;

const JOURNAL: &str = r#"[
  {
    "address": "0xdAC17F958D2ee523a2206206994597C13D831ec7",
    "folder": "vendor",
    "mainFile": "src/Vault.sol",
    "chainId": 1,
    "creationTransaction": "0x2f1c5c2b44f771e942a8506148e256f94f1a464babc938ae0690c6e34cd79190",
    "deployer": "0x36928500Bc1dCd7af6a2B4008875CC336b927D57",
    "constructorArguments": "",
    "solcConfig": {
      "version": "0.8.19",
      "settings": { "remappings": ["@oz/=node-modules/@oz/"] }
    },
    "clonedFiles": {
      "node_modules/@oz/token/ERC20.sol": "node-modules/@oz/token/ERC20.sol",
      "src/Vault.sol": "src/Vault.sol"
    }
  }
]"#;

fn solclone(root: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("solclone").unwrap();
    cmd.arg("--root").arg(root.path());
    cmd
}

#[test]
fn test_help_command() {
    solclone_common::ensure_test_logging(None);
    info!("Testing CLI help command");

    let mut cmd = Command::cargo_bin("solclone").unwrap();
    cmd.arg("--help").assert().success().stdout(predicate::str::contains("Clone verified contracts"));
}

#[test]
fn test_version_command() {
    solclone_common::ensure_test_logging(None);
    info!("Running test");
    let mut cmd = Command::cargo_bin("solclone").unwrap();
    cmd.arg("--version").assert().success().stdout(predicate::str::contains("solclone"));
}

#[test]
fn test_clone_subcommand_help() {
    solclone_common::ensure_test_logging(None);
    info!("Running test");
    let mut cmd = Command::cargo_bin("solclone").unwrap();
    cmd.arg("clone")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Clone a verified contract"))
        .stdout(predicate::str::contains("--etherscan-api-key"));
}

#[test]
fn test_missing_subcommand() {
    solclone_common::ensure_test_logging(None);
    info!("Running test");
    let mut cmd = Command::cargo_bin("solclone").unwrap();
    cmd.assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_invalid_address() {
    solclone_common::ensure_test_logging(None);
    info!("Running test");
    let root = TempDir::new().unwrap();
    solclone(&root).arg("clone").arg("0x1234").assert().failure();
}

#[test]
fn test_clone_into_sources_dir_is_rejected() {
    solclone_common::ensure_test_logging(None);
    info!("Running test");
    let root = TempDir::new().unwrap();
    solclone(&root)
        .args(["clone", "--no-cache", "--explorer-url", "http://127.0.0.1:1/api"])
        .arg("dAC17F958D2ee523a2206206994597C13D831ec7")
        .arg("contracts")
        .assert()
        .failure()
        .stderr(predicate::str::contains("sources directory"));
    assert!(fs::read_dir(root.path()).unwrap().next().is_none());
}

#[test]
fn test_unreachable_explorer_fails() {
    solclone_common::ensure_test_logging(None);
    info!("Running test");
    let root = TempDir::new().unwrap();
    solclone(&root)
        .args(["clone", "--no-cache", "--explorer-url", "http://127.0.0.1:1/api"])
        .args(["--etherscan-api-key", "KEY"])
        .arg("0xdAC17F958D2ee523a2206206994597C13D831ec7")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to reach the explorer"));
}

#[test]
fn test_remappings_of_empty_project() {
    solclone_common::ensure_test_logging(None);
    info!("Running test");
    let root = TempDir::new().unwrap();
    solclone(&root).arg("remappings").assert().success().stdout(predicate::str::is_empty());
}

#[test]
fn test_remappings_from_journal() {
    solclone_common::ensure_test_logging(None);
    info!("Running test");
    let root = TempDir::new().unwrap();
    fs::write(root.path().join(".clone.meta"), JOURNAL).unwrap();

    solclone(&root)
        .arg("remappings")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "@oz/token/ERC20.sol=vendor/node-modules/@oz/token/ERC20.sol",
        ))
        .stdout(predicate::str::contains("src/Vault.sol=vendor/src/Vault.sol"));
}

#[test]
fn test_overrides_from_journal() {
    solclone_common::ensure_test_logging(None);
    info!("Running test");
    let root = TempDir::new().unwrap();
    fs::write(root.path().join(".clone.meta"), JOURNAL).unwrap();

    let output = solclone(&root).arg("overrides").assert().success().get_output().stdout.clone();
    let overrides: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(overrides["vendor/src/Vault.sol"]["version"], "0.8.19");
    assert_eq!(overrides["vendor/node-modules/@oz/token/ERC20.sol"]["version"], "0.8.19");
}

#[test]
fn test_malformed_journal_fails() {
    solclone_common::ensure_test_logging(None);
    info!("Running test");
    let root = TempDir::new().unwrap();
    fs::write(root.path().join(".clone.meta"), "{}").unwrap();

    solclone(&root)
        .arg("remappings")
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed clone journal"));
}

//! Tests of the Etherscan client against a mock explorer

use std::time::Duration;

use alloy_chains::Chain;
use alloy_primitives::{address, Address};
use serde_json::{json, Value};
use solclone_engine::{clone_contract, CloneError, CloneOptions, EtherscanExplorer, Explorer, Project};
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const TOKEN: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");

fn source_response() -> Value {
    json!({
        "status": "1",
        "message": "OK",
        "result": [{
            "SourceCode": "pragma solidity ^0.4.17;\ncontract TetherToken {}",
            "ABI": "[]",
            "ContractName": "TetherToken",
            "CompilerVersion": "v0.4.18+commit.9cf6e910",
            "OptimizationUsed": "0",
            "Runs": "200",
            "ConstructorArguments": "",
            "EVMVersion": "Default",
            "Library": "",
            "LicenseType": "",
            "Proxy": "0",
            "Implementation": "",
            "SwarmSource": "bzzr://645ee12d73db47fd78ba77fa1f824c3c8f9184061b3b10386beb4dc9236abb28"
        }]
    })
}

fn creation_response() -> Value {
    json!({
        "status": "1",
        "message": "OK",
        "result": [{
            "contractAddress": "0xdac17f958d2ee523a2206206994597c13d831ec7",
            "contractCreator": "0x36928500bc1dcd7af6a2b4008875cc336b927d57",
            "txHash": "0x2f1c5c2b44f771e942a8506148e256f94f1a464babc938ae0690c6e34cd79190"
        }]
    })
}

async fn mount(server: &MockServer, action: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("module", "contract"))
        .and(query_param("action", action))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn explorer(server: &MockServer) -> EtherscanExplorer {
    EtherscanExplorer::with_url(Chain::mainnet(), format!("{}/api", server.uri()))
}

#[tokio::test]
async fn test_get_source_and_creation() {
    solclone_common::ensure_test_logging(None);
    let server = MockServer::start().await;
    mount(&server, "getsourcecode", source_response()).await;
    mount(&server, "getcontractcreation", creation_response()).await;
    let explorer = explorer(&server);

    let metadata = explorer.get_source(TOKEN, Some("KEY")).await.unwrap();
    assert_eq!(metadata.contract_name, "TetherToken");
    assert!(!metadata.optimization_used);
    assert!(metadata.swarm_source.is_some());
    assert_eq!(metadata.tree().unwrap().entries[0].path, "TetherToken.sol");

    let creation = explorer.get_creation(TOKEN, Some("KEY")).await.unwrap();
    assert_eq!(creation.contract_address, TOKEN);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0]
        .url
        .query_pairs()
        .any(|(k, v)| k == "address" && v.eq_ignore_ascii_case(&TOKEN.to_string())));
    assert!(requests[1].url.query_pairs().any(|(k, _)| k == "contractaddresses"));
    assert!(requests.iter().all(|r| r.url.query_pairs().any(|(k, v)| k == "apikey" && v == "KEY")));
}

#[tokio::test]
async fn test_api_key_is_omitted_when_absent() {
    solclone_common::ensure_test_logging(None);
    let server = MockServer::start().await;
    mount(&server, "getsourcecode", source_response()).await;

    explorer(&server).get_source(TOKEN, None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].url.query_pairs().all(|(k, _)| k != "apikey"));
}

#[tokio::test]
async fn test_error_status_is_an_explorer_error() {
    solclone_common::ensure_test_logging(None);
    let server = MockServer::start().await;
    mount(
        &server,
        "getsourcecode",
        json!({ "status": "0", "message": "NOTOK", "result": "Invalid API Key" }),
    )
    .await;

    match explorer(&server).get_source(TOKEN, Some("bad")).await {
        Err(CloneError::Explorer { message, result }) => {
            assert_eq!(message, "NOTOK");
            assert_eq!(result, "Invalid API Key");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_transport_error() {
    solclone_common::ensure_test_logging(None);
    let explorer = EtherscanExplorer::with_url(Chain::mainnet(), "http://127.0.0.1:1/api");
    let err = explorer.get_source(TOKEN, None).await.unwrap_err();
    assert!(matches!(err, CloneError::Transport(_)));
}

#[tokio::test]
async fn test_http_error_is_a_transport_error() {
    solclone_common::ensure_test_logging(None);
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = explorer(&server).get_creation(TOKEN, None).await.unwrap_err();
    assert!(matches!(err, CloneError::Transport(_)));
}

#[tokio::test]
async fn test_verified_responses_are_cached() {
    solclone_common::ensure_test_logging(None);
    let server = MockServer::start().await;
    mount(&server, "getsourcecode", source_response()).await;
    let cache = TempDir::new().unwrap();
    let explorer = explorer(&server)
        .with_cache(Some(cache.path().to_path_buf()), Some(Duration::from_secs(60)));

    explorer.get_source(TOKEN, None).await.unwrap();
    explorer.get_source(TOKEN, None).await.unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unverified_responses_are_not_cached() {
    solclone_common::ensure_test_logging(None);
    let server = MockServer::start().await;
    let mut unverified = source_response();
    unverified["result"][0]["SourceCode"] = json!("");
    unverified["result"][0]["ABI"] = json!("Contract source code not verified");
    mount(&server, "getsourcecode", unverified).await;
    let cache = TempDir::new().unwrap();
    let explorer = explorer(&server).with_cache(Some(cache.path().to_path_buf()), None);

    for _ in 0..2 {
        let err = explorer.get_source(TOKEN, None).await.unwrap_err();
        assert!(matches!(err, CloneError::NotVerified { .. }));
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_clone_through_http_explorer() {
    solclone_common::ensure_test_logging(None);
    let server = MockServer::start().await;
    mount(&server, "getsourcecode", source_response()).await;
    mount(&server, "getcontractcreation", creation_response()).await;
    let dir = TempDir::new().unwrap();
    let project = Project::new(dir.path());
    let opts = CloneOptions::new(Chain::mainnet(), TOKEN)
        .with_destination("tether")
        .with_api_key(Some("KEY".to_string()));

    let record = clone_contract(&project, &explorer(&server), &opts).await.unwrap();

    assert!(dir.path().join("tether/TetherToken.sol").is_file());
    assert_eq!(record.main_file, "TetherToken.sol");
    assert_eq!(record.solc_config.version, semver::Version::new(0, 4, 18));
    assert_eq!(record.solc_config.settings["optimizer"], json!({ "enabled": false, "runs": 200 }));
    assert_eq!(record.deployer, address!("36928500bc1dcd7af6a2b4008875cc336b927d57"));
    assert!(record.constructor_arguments.is_empty());
}

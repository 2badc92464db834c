//! Tests for the line-delimited ingest surface

use std::collections::HashMap;
use std::sync::Arc;

use chain_normalizer::{
    config::Config,
    ingest::{
        handler::handle_request,
        protocol::{error_codes, Request},
        run_line_loop,
    },
    Address, Asset, AppState,
};
use serde_json::{json, Value};

fn test_state() -> AppState {
    let mut token_assets = HashMap::new();
    token_assets.insert(
        "USDC".to_string(),
        Arc::new(Asset {
            name: "USD Coin".to_string(),
            symbol: "USDC".to_string(),
            decimals: 6,
            contract_address: Some(Address::repeat_byte(0xa0)),
        }),
    );
    AppState::new(Config {
        token_assets,
        ..Config::default()
    })
}

fn request(method: &str, params: Value) -> Request {
    serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params
    }))
    .unwrap()
}

fn signed_subscription_tx() -> Value {
    json!({
        "source": "subscription",
        "payload": {
            "hash": format!("0x{}", "01".repeat(32)),
            "from": format!("0x{}", "11".repeat(20)),
            "to": format!("0x{}", "22".repeat(20)),
            "nonce": "0x2a",
            "gas": "0x5208",
            "maxFeePerGas": "0x6fc23ac00",
            "maxPriorityFeePerGas": "0x59682f00",
            "value": "0xde0b6b3a7640000",
            "type": "0x2",
            "r": "0x1",
            "s": "0x2",
            "v": "0x1"
        }
    })
}

async fn run_lines(state: AppState, input: &str) -> Vec<Value> {
    let mut output = Vec::new();
    run_line_loop(state, input.as_bytes(), &mut output).await;
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_normalize_block_request() {
    let response = handle_request(
        request(
            "normalize_block",
            json!({
                "block": {
                    "source": "subscription",
                    "payload": {
                        "hash": format!("0x{}", "aa".repeat(32)),
                        "parentHash": format!("0x{}", "bb".repeat(32)),
                        "number": "0x1036640",
                        "difficulty": "0x0",
                        "timestamp": "0x6436ef57"
                    }
                }
            }),
        ),
        &test_state(),
    )
    .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["blockHeight"], 17_000_000);
    assert_eq!(result["timestamp"], 1_681_321_815u64);
    assert_eq!(result["timestampUtc"], "2023-04-12T17:50:15+00:00");
    assert_eq!(result["network"]["name"], "Ethereum");
    assert!(result["baseFeePerGas"].is_null());
}

#[test]
fn test_normalize_transaction_request() {
    let response = handle_request(
        request("normalize_transaction", json!({ "transaction": signed_subscription_tx() })),
        &test_state(),
    )
    .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["variant"], "signed");
    assert_eq!(result["type"], 2);
    assert_eq!(result["nonce"], 42);
    assert_eq!(result["asset"]["symbol"], "ETH");
}

#[test]
fn test_unknown_asset_is_invalid_params() {
    let response = handle_request(
        request(
            "normalize_transaction",
            json!({ "transaction": signed_subscription_tx(), "asset": "WBTC" }),
        ),
        &test_state(),
    )
    .unwrap();

    assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);
}

#[test]
fn test_token_asset_with_short_call_data_reports_kind() {
    let response = handle_request(
        request(
            "normalize_transaction",
            json!({ "transaction": signed_subscription_tx(), "asset": "USDC" }),
        ),
        &test_state(),
    )
    .unwrap();

    let error = response.error.unwrap();
    assert_eq!(error.code, error_codes::NORMALIZATION_FAILED);
    assert_eq!(error.data.unwrap()["kind"], "AssetValueDecodeFailure");
}

#[test]
fn test_external_transaction_request() {
    let response = handle_request(
        request("external_transaction", json!({ "transaction": signed_subscription_tx() })),
        &test_state(),
    )
    .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["transaction"]["chainId"], "0x1");
    assert!(result["raw"].as_str().unwrap().starts_with("0x02"));
}

#[test]
fn test_external_transaction_requires_signature() {
    let mut tx = signed_subscription_tx();
    tx["payload"]["r"] = Value::Null;

    let response = handle_request(
        request("external_transaction", json!({ "transaction": tx })),
        &test_state(),
    )
    .unwrap();
    assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);
}

#[test]
fn test_provider_network_request() {
    let response = handle_request(request("provider_network", json!({})), &test_state()).unwrap();
    assert_eq!(response.result.unwrap(), json!({ "name": "homestead", "chainId": 1 }));

    let response = handle_request(
        request(
            "provider_network",
            json!({
                "network": {
                    "chainID": "137",
                    "name": "Polygon",
                    "nativeAsset": { "name": "Matic", "symbol": "MATIC", "decimals": 18 }
                }
            }),
        ),
        &test_state(),
    )
    .unwrap();
    assert_eq!(response.result.unwrap(), json!({ "name": "polygon", "chainId": 137 }));
}

#[test]
fn test_positional_params_are_an_invalid_request() {
    let response = handle_request(
        request("normalize_block", json!([{ "source": "subscription", "payload": {} }])),
        &test_state(),
    )
    .unwrap();
    assert_eq!(response.id, json!(1));
    assert_eq!(response.error.unwrap().code, error_codes::INVALID_REQUEST);
}

#[test]
fn test_external_transaction_keeps_signed_value_for_tokens() {
    let mut tx = signed_subscription_tx();
    tx["payload"]["value"] = json!("0x0");
    tx["payload"]["input"] = json!(format!(
        "0xa9059cbb{:0>64}{:0>64}",
        "22".repeat(20),
        "64"
    ));

    let response = handle_request(
        request("external_transaction", json!({ "transaction": tx, "asset": "USDC" })),
        &test_state(),
    )
    .unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["transaction"]["value"], "0x0");
}

#[test]
fn test_notifications_get_no_response() {
    let notification: Request = serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "method": "provider_network"
    }))
    .unwrap();
    assert!(handle_request(notification, &test_state()).is_none());
}

#[tokio::test]
async fn test_line_loop_answers_each_request() {
    let input = [
        r#"{"jsonrpc":"2.0","id":1,"method":"provider_network"}"#,
        "",
        "not json",
        r#"{"jsonrpc":"2.0","id":2,"method":"does_not_exist"}"#,
    ]
    .join("\n");

    let responses = run_lines(test_state(), &input).await;
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["result"]["name"], "homestead");
    assert_eq!(responses[1]["error"]["code"], error_codes::PARSE_ERROR);
    assert_eq!(responses[2]["id"], 2);
    assert_eq!(responses[2]["error"]["code"], error_codes::METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_line_loop_reports_normalization_failures() {
    let line = json!({
        "jsonrpc": "2.0",
        "id": "tx-1",
        "method": "normalize_transaction",
        "params": {
            "transaction": {
                "source": "subscription",
                "payload": { "from": format!("0x{}", "11".repeat(20)) }
            }
        }
    })
    .to_string();

    let responses = run_lines(test_state(), &line).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], "tx-1");
    assert_eq!(responses[0]["error"]["data"]["kind"], "MalformedInput");
}

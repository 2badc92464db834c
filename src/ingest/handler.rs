//! # Ingest Handler Module
//!
//! Dispatches line-delimited JSON-RPC requests to the normalizers.
//!
//! ## Supported Methods
//!
//! - `normalize_block` - `{ block: { source, payload } }` to a canonical block, plus `timestampUtc`
//! - `normalize_transaction` - `{ transaction: { source, payload }, asset? }` to a canonical transaction
//! - `external_transaction` - same params; a signed transaction back in provider form plus raw RLP
//! - `provider_network` - `{ network? }` to the provider's network descriptor

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    blockchain::{
        constants::ETHEREUM,
        models::{AnyTransaction, Network, NormalizeError},
        payloads::{BlockPayload, TransactionPayload},
        services::{blocks, network, transactions},
    },
    ingest::protocol::{error_codes, Request, Response},
    utils, AppState,
};

/// This is the main dispatcher for all incoming ingest requests.
pub fn handle_request(req: Request, state: &AppState) -> Option<Response> {
    info!("Handling ingest request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    if let Err(reason) = req.validate() {
        warn!("Rejecting malformed request: {}", reason);
        return Some(Response::error(req.id, error_codes::INVALID_REQUEST, reason));
    }

    let empty_args = json!({});
    let args = req.params.as_ref().unwrap_or(&empty_args);
    let req_id = &req.id;

    let result = match req.method.as_str() {
        "normalize_block" => normalize_block(args, req_id),
        "normalize_transaction" => normalize_transaction(args, req_id, state)
            .and_then(|tx| to_json(req_id, &tx)),
        "external_transaction" => external_transaction(args, req_id, state),
        "provider_network" => provider_network(args, req_id),
        _ => Err(Response::error(
            req_id.clone(),
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        )),
    };

    Some(match result {
        Ok(value) => Response::success(req_id.clone(), value),
        Err(err_resp) => err_resp,
    })
}

fn normalize_block(args: &Value, req_id: &Value) -> Result<Value, Response> {
    let payload: BlockPayload = utils::get_required_arg(args, "block", req_id)?;
    let block = blocks::normalize_block(&payload).map_err(|e| normalization_error(req_id, e))?;
    let mut value = to_json(req_id, &block)?;
    if let Some(time) = block.timestamp_utc() {
        value["timestampUtc"] = json!(time.to_rfc3339());
    }
    Ok(value)
}

fn normalize_transaction(
    args: &Value,
    req_id: &Value,
    state: &AppState,
) -> Result<AnyTransaction, Response> {
    let payload: TransactionPayload = utils::get_required_arg(args, "transaction", req_id)?;
    let symbol: Option<String> = utils::get_optional_arg(args, "asset", req_id)?;

    let asset = state
        .config
        .resolve_asset(symbol.as_deref(), &ETHEREUM)
        .ok_or_else(|| {
            Response::error(
                req_id.clone(),
                error_codes::INVALID_PARAMS,
                format!("Unknown asset: {}", symbol.as_deref().unwrap_or_default()),
            )
        })?;

    transactions::normalize_transaction(&payload, &asset, &ETHEREUM)
        .map_err(|e| normalization_error(req_id, e))
}

fn external_transaction(args: &Value, req_id: &Value, state: &AppState) -> Result<Value, Response> {
    let signed = normalize_transaction(args, req_id, state)?
        .into_signed()
        .ok_or_else(|| {
            Response::error(
                req_id.clone(),
                error_codes::INVALID_PARAMS,
                "Transaction carries no signature and cannot be broadcast".into(),
            )
        })?;

    let external = transactions::to_external_tx(&signed).map_err(|e| normalization_error(req_id, e))?;
    let raw = external.rlp();
    Ok(json!({
        "transaction": to_json(req_id, &external)?,
        "raw": raw,
    }))
}

fn provider_network(args: &Value, req_id: &Value) -> Result<Value, Response> {
    let requested: Option<Network> = utils::get_optional_arg(args, "network", req_id)?;
    let canonical = requested.as_ref().unwrap_or(&**ETHEREUM);
    let provider =
        network::to_provider_network(canonical).map_err(|e| normalization_error(req_id, e))?;
    to_json(req_id, &provider)
}

fn normalization_error(req_id: &Value, err: NormalizeError) -> Response {
    warn!("Normalization failed: {}", err);
    Response::error_with_data(
        req_id.clone(),
        error_codes::NORMALIZATION_FAILED,
        err.to_string(),
        json!({ "kind": err.kind() }),
    )
}

fn to_json<T: serde::Serialize>(req_id: &Value, value: &T) -> Result<Value, Response> {
    serde_json::to_value(value).map_err(|e| {
        Response::error(
            req_id.clone(),
            error_codes::INTERNAL_ERROR,
            format!("Failed to serialize result: {}", e),
        )
    })
}

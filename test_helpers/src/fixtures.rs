//! JSON `result` payloads shaped like CometBFT 0.37/0.38 responses.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};

use crate::node::{Reply, RpcCall};

// Ed25519 public keys from the RFC 8032 test vectors.
const PUBLIC_KEYS: [&str; 3] = [
    "11qYAYKxCrfVS/7TyWQHOg7hcvPapiMlrwIaaPcHURo=",
    "PUAXw+hDiVqStwqnTRt+vJyYLM8uxJaMwM1V8Sr0Zgw=",
    "/FHNjmIYoaONpH7QAjDwWAgW7RO6MwOsXeuRFUiQgCU=",
];

const BLOCK_HASH: &str =
    "6A9D1C4E0B7F3825A1E6D94C0B2F7E3A5D8C1B4E7F0A3D6C9B2E5F8A1D4C7B0E";
const PARTS_HASH: &str =
    "0F1E2D3C4B5A69788796A5B4C3D2E1F00F1E2D3C4B5A69788796A5B4C3D2E1F0";
const EMPTY_HASH: &str =
    "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855";

/// Hex address of the validator at `index`; unique per index.
pub fn validator_address(index: usize) -> String {
    format!("{:040X}", index + 1)
}

pub fn validator(index: usize) -> Value {
    json!({
        "address": validator_address(index),
        "pub_key": {
            "type": "tendermint/PubKeyEd25519",
            "value": PUBLIC_KEYS[index % PUBLIC_KEYS.len()],
        },
        "voting_power": ((index as u64 + 1) * 10).to_string(),
        "proposer_priority": "0",
    })
}

pub fn validators_page(
    block_height: u64,
    total: usize,
    validators: Vec<Value>,
) -> Value {
    json!({
        "block_height": block_height.to_string(),
        "count": validators.len().to_string(),
        "total": total.to_string(),
        "validators": validators,
    })
}

/// Handler for a node holding `total` validators whose tip advances by one
/// block on every call, starting at `tip`. Calls that carry a height are
/// answered at that height.
pub fn growing_validator_set(
    total: usize,
    tip: u64,
) -> impl Fn(&RpcCall) -> Reply + Send + Sync + 'static {
    let served = AtomicU64::new(0);

    move |call| {
        let current_tip = tip + served.fetch_add(1, Ordering::SeqCst);
        let height = call.param_u64("height").unwrap_or(current_tip);
        let page = call.param_u64("page").unwrap_or(1) as usize;
        let per_page = call.param_u64("per_page").unwrap_or(30) as usize;
        let start = usize::min((page - 1) * per_page, total);
        let end = usize::min(start + per_page, total);

        Reply::Result(validators_page(
            height,
            total,
            (start..end).map(validator).collect(),
        ))
    }
}

pub fn block_results(height: u64) -> Value {
    json!({
        "height": height.to_string(),
        "txs_results": null,
        "begin_block_events": null,
        "end_block_events": null,
        "finalize_block_events": [],
        "validator_updates": null,
        "consensus_param_updates": null,
        "app_hash": "",
    })
}

pub fn abci_query(value: &[u8], height: u64) -> Value {
    let value = String::from_utf8(subtle_encoding::base64::encode(value))
        .unwrap_or_default();

    json!({
        "response": {
            "code": 0,
            "log": "",
            "info": "",
            "index": "0",
            "key": null,
            "value": value,
            "proofOps": null,
            "height": height.to_string(),
            "codespace": "",
        }
    })
}

/// Commit without signatures. `height` must be greater than 1.
pub fn commit(height: u64) -> Value {
    let block_id = json!({
        "hash": BLOCK_HASH,
        "parts": { "total": 1, "hash": PARTS_HASH },
    });

    json!({
        "signed_header": {
            "header": {
                "version": { "block": "11", "app": "0" },
                "chain_id": "test-chain",
                "height": height.to_string(),
                "time": "2024-01-01T00:00:00Z",
                "last_block_id": block_id,
                "last_commit_hash": EMPTY_HASH,
                "data_hash": EMPTY_HASH,
                "validators_hash": EMPTY_HASH,
                "next_validators_hash": EMPTY_HASH,
                "consensus_hash": EMPTY_HASH,
                "app_hash": EMPTY_HASH,
                "last_results_hash": EMPTY_HASH,
                "evidence_hash": EMPTY_HASH,
                "proposer_address": validator_address(0),
            },
            "commit": {
                "height": height.to_string(),
                "round": 0,
                "block_id": block_id,
                "signatures": [],
            },
        },
        "canonical": true,
    })
}

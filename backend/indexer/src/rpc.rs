//! Soroban RPC client: fetches `getEvents` pages and turns the raw entries
//! into [`CharityEvent`]s ready for storage.
//!
//! Transient failures (network errors, rate limits, soft RPC errors) are
//! retried with exponential back-off capped at a minute. Only a malformed
//! request is treated as fatal, since retrying it can never succeed.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{CharityEvent, EventKind};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

/// One entry of a `getEvents` response, untouched. Topic entries and the
/// data value arrive either pre-decoded to JSON or as base64 XDR depending
/// on the RPC build.
#[derive(Debug, Deserialize, Clone)]
#[allow(dead_code)]
pub struct RawEvent {
    pub topic: Vec<String>,
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Fetching
// ─────────────────────────────────────────────────────────

/// Fetch one page of contract events.
///
/// `cursor` resumes pagination within a ledger range; without it the scan
/// starts at `start_ledger`. Returns `(events, next_cursor, latest_ledger)`.
/// Blocks through back-off until the RPC yields a usable response or a
/// hard error.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    let mut backoff = INITIAL_BACKOFF_SECS;
    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed, retrying in {backoff}s: {e}");
                backoff_delay(&mut backoff).await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC, retrying in {backoff}s");
            backoff_delay(&mut backoff).await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if is_hard_error(err.code) {
                return Err(IndexerError::Rpc(format!(
                    "getEvents rejected ({}): {}",
                    err.code, err.message
                )));
            }
            warn!(
                "RPC error {} ({}), retrying in {backoff}s",
                err.code, err.message
            );
            backoff_delay(&mut backoff).await;
            continue;
        }

        let result = body.result.ok_or_else(|| {
            IndexerError::Rpc("getEvents returned neither result nor error".to_string())
        })?;

        debug!(
            "Fetched {} events, latest ledger {:?}",
            result.events.len(),
            result.latest_ledger
        );
        return Ok((result.events, result.cursor, result.latest_ledger));
    }
}

/// Invalid-request / method-not-found. Retrying these would loop forever on
/// the same rejection.
fn is_hard_error(code: i64) -> bool {
    matches!(code, -32600 | -32601)
}

async fn backoff_delay(secs: &mut u64) {
    tokio::time::sleep(Duration::from_secs(*secs)).await;
    *secs = (*secs * 2).min(MAX_BACKOFF_SECS);
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [{ "type": "contract", "contractIds": [contract_id] }],
        "pagination": { "limit": limit },
    });

    // The getEvents API treats a cursor and startLedger as mutually
    // exclusive.
    match cursor {
        Some(cur) => params["pagination"]["cursor"] = json!(cur),
        None => params["startLedger"] = json!(start_ledger),
    }

    params
}

// ─────────────────────────────────────────────────────────
// Decoding
// ─────────────────────────────────────────────────────────

/// Decode a page of raw entries, dropping any that carry no topic.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<CharityEvent> {
    raw.iter()
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<CharityEvent> {
    // Topic layout is (kind symbol, cause id).
    let kind = EventKind::from_topic(&extract_symbol(raw.topic.first()?));
    let cause_id = raw.topic.get(1).map(|t| extract_u64_or_raw(t));

    let closed_at = raw.ledger_closed_at.as_deref().and_then(parse_close_time);
    let (actor, amount) = decode_data(&raw.value, kind);

    Some(CharityEvent {
        event_type: kind.as_str().to_string(),
        cause_id,
        actor,
        amount,
        ledger: raw.ledger.unwrap_or(0) as i64,
        timestamp: closed_at.unwrap_or(0),
        contract_id: raw.contract_id.clone().unwrap_or_else(|| contract_id.into()),
        tx_hash: raw.tx_hash.as_deref().map(normalize_tx_hash),
    })
}

/// Pick the actor and amount out of the event data for each kind. The data
/// is the contract's event struct, pre-decoded by the RPC into a JSON
/// object keyed by field name.
fn decode_data(value: &Value, kind: EventKind) -> (Option<String>, Option<String>) {
    match kind {
        EventKind::ChangeProposed | EventKind::ChangeApplied => {
            (extract_field(value, &["new_address", "address"]), None)
        }
        EventKind::RefundIssued => (
            extract_field(value, &["donor", "contributor", "address"]),
            extract_field(value, &["amount"]),
        ),
        EventKind::FundsSettled => (
            extract_field(value, &["target_address", "target", "address"]),
            extract_field(value, &["amount"]),
        ),
        EventKind::Unknown => (None, None),
    }
}

/// First scalar found under any of the candidate keys.
fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(key).and_then(scalar_to_string))
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The `value` field of a topic entry the RPC already decoded to JSON,
/// e.g. `{"type":"symbol","value":"proposed"}`.
fn pre_decoded_value(raw: &str) -> Option<Value> {
    serde_json::from_str::<Value>(raw)
        .ok()?
        .get("value")
        .cloned()
}

/// Topic entry as a symbol: pre-decoded JSON first, then base64 XDR, then
/// the bare string.
fn extract_symbol(raw: &str) -> String {
    if let Some(s) = pre_decoded_value(raw).as_ref().and_then(Value::as_str) {
        return s.to_string();
    }
    decode_symbol_xdr(raw).unwrap_or_else(|| raw.to_string())
}

/// Topic entry as a cause id, tried the same three ways as the symbol.
fn extract_u64_or_raw(raw: &str) -> String {
    if let Some(v) = pre_decoded_value(raw) {
        if let Some(n) = v.as_u64() {
            return n.to_string();
        }
        if let Some(s) = v.as_str() {
            return s.to_string();
        }
    }
    match decode_u64_xdr(raw) {
        Some(n) => n.to_string(),
        None => raw.to_string(),
    }
}

/// Base64 XDR `ScVal` symbol: u32 discriminant (15), u32 length, then the
/// symbol bytes padded to a 4-byte boundary.
fn decode_symbol_xdr(raw: &str) -> Option<String> {
    let bytes = STANDARD.decode(raw).ok()?;
    if bytes.len() < 8 || u32::from_be_bytes(bytes[0..4].try_into().ok()?) != 15 {
        return None;
    }
    let len = u32::from_be_bytes(bytes[4..8].try_into().ok()?) as usize;
    let end = 8usize.checked_add(len)?;
    if bytes.len() < end {
        return None;
    }
    String::from_utf8(bytes[8..end].to_vec()).ok()
}

/// Base64 XDR `ScVal` u64: u32 discriminant (5) followed by the big-endian
/// value.
fn decode_u64_xdr(raw: &str) -> Option<u64> {
    let bytes = STANDARD.decode(raw).ok()?;
    if bytes.len() != 12 || u32::from_be_bytes(bytes[0..4].try_into().ok()?) != 5 {
        return None;
    }
    Some(u64::from_be_bytes(bytes[4..12].try_into().ok()?))
}

/// Normalise a transaction hash to lowercase hex. Anything that is not
/// 32 bytes of hex passes through untouched.
fn normalize_tx_hash(raw: &str) -> String {
    match hex::decode(raw) {
        Ok(bytes) if bytes.len() == 32 => hex::encode(bytes),
        _ => raw.to_string(),
    }
}

/// RFC 3339 ledger close time to a Unix epoch in seconds.
fn parse_close_time(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────

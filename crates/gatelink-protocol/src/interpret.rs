//! Response interpretation.
//!
//! Responses arrive as bytes from unreliable hardware, get decoded by the
//! device's handler, and come out as a loosely-typed envelope. The helpers
//! here pull typed answers out of that envelope: a success bit, an ordered
//! user list, numeric health/metric fields. Coercion is permissive — the
//! terminals stringify numbers freely — but defaults are always explicit:
//! zero for numbers, empty for strings, absent for lists.

use crate::handler::ProtocolHandler;
use crate::message::{MessageStatus, ProtocolMessage};
use gatelink_core::constants::*;
use gatelink_core::{Error, HealthStatus, Result};
use serde_json::Value;

/// Decode and validate one raw response buffer.
///
/// # Errors
/// `ResponseUnparseable` when the handler cannot decode the bytes,
/// `ResponseInvalid` when the decoded envelope fails handler validation.
pub fn decode_response(handler: &dyn ProtocolHandler, raw: &[u8]) -> Result<ProtocolMessage> {
    let msg = handler
        .parse_message(raw)
        .map_err(|e| Error::ResponseUnparseable(e.to_string()))?;

    if !handler.validate_message(&msg) {
        return Err(Error::ResponseInvalid(handler.protocol_type().to_string()));
    }

    Ok(msg)
}

/// Extract the success bit of a response.
///
/// `data["success"]` wins when present as a boolean or a string ("true" in
/// any case, or "1", counts as success; any other string is failure). When
/// the key is absent, or holds some other type, the envelope status decides.
#[must_use]
pub fn is_success(msg: &ProtocolMessage) -> bool {
    match msg.value(KEY_SUCCESS) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        _ => msg.status == MessageStatus::Processed,
    }
}

/// Extract the user identifiers of a list-bearing response.
///
/// Looks at `data["userList"]`, then `data["accountList"]`. Elements are
/// coerced to strings (numbers via their display form); nulls and
/// non-coercible elements are dropped. Order is preserved, nothing is
/// deduplicated.
#[must_use]
pub fn user_list(msg: &ProtocolMessage) -> Vec<String> {
    let raw = msg
        .value(KEY_USER_LIST)
        .or_else(|| msg.value(KEY_ACCOUNT_LIST));

    match raw {
        Some(Value::Array(items)) => items.iter().filter_map(coerce_id).collect(),
        _ => Vec::new(),
    }
}

fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric field as f64; zero when absent or not coercible.
#[must_use]
pub fn f64_field(msg: &ProtocolMessage, key: &str) -> f64 {
    match msg.value(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Numeric field as i64; zero when absent or not coercible.
#[must_use]
pub fn i64_field(msg: &ProtocolMessage, key: &str) -> i64 {
    match msg.value(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Numeric field as u64; zero when absent, negative, or not coercible.
#[must_use]
pub fn u64_field(msg: &ProtocolMessage, key: &str) -> u64 {
    match msg.value(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// String field; empty when absent or not a string.
#[must_use]
pub fn str_field(msg: &ProtocolMessage, key: &str) -> String {
    match msg.value(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Device-reported health status, when the response carries one.
///
/// `None` when the field is absent or unrecognized; callers with a success
/// bit in hand derive Healthy/Unhealthy from it, callers without context
/// treat `None` as Unknown.
#[must_use]
pub fn health_status(msg: &ProtocolMessage) -> Option<HealthStatus> {
    match msg.value(KEY_HEALTH_STATUS) {
        Some(Value::String(s)) => HealthStatus::parse(s),
        _ => None,
    }
}

//! Wire-format normalization
//!
//! Responses from the remote end arrive in one of two envelope generations:
//! the W3C shape (`{"value": ...}` with error objects inside `value`) and the
//! legacy shape (`{"status": n, "value": ...}`). Element references likewise
//! arrive under one of two key names. Both are normalized here, at the
//! boundary, so nothing downstream ever branches on envelope generation or
//! key name again.

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

/// Standard element reference key
pub const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Legacy element reference key
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Normalized opaque element identifier
///
/// The remote end is the sole authority on validity; this is routing data,
/// never a lifetime handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(String);

impl ElementId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract an element identifier from a response value, accepting either
    /// key generation
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        obj.get(W3C_ELEMENT_KEY)
            .or_else(|| obj.get(LEGACY_ELEMENT_KEY))
            .and_then(|v| v.as_str())
            .map(|s| Self(s.to_string()))
    }

    /// Whether a value looks like a wire element reference
    pub fn is_element_value(value: &Value) -> bool {
        Self::from_value(value).is_some()
    }

    /// Bare reference object carrying both key generations, as the remote
    /// end expects inside script arguments
    pub fn to_wire(&self) -> Value {
        serde_json::json!({
            W3C_ELEMENT_KEY: self.0,
            LEGACY_ELEMENT_KEY: self.0,
        })
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw response envelope, either generation
#[derive(Debug, Clone, Deserialize)]
pub struct WireResponse {
    /// Payload (or W3C error object)
    #[serde(default)]
    pub value: Value,
    /// Legacy status code, 0 on success
    #[serde(default)]
    pub status: Option<i64>,
    /// Session id, present on legacy envelopes and `newSession` responses
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

/// Legacy status codes that matter to the caller
fn legacy_status_name(status: i64) -> &'static str {
    match status {
        6 => "invalid session id",
        7 => "no such element",
        9 => "unknown command",
        10 => "stale element reference",
        11 => "element not visible",
        13 => "unknown error",
        23 => "no such window",
        27 => "no such alert",
        28 => "timeout",
        _ => "unknown error",
    }
}

/// Unwrap a raw response body into its payload value
///
/// A protocol-level error (W3C error object or non-zero legacy status) is
/// surfaced as a failure carrying the remote message, falling back to the
/// raw error code when no message is present. `no such element` maps to the
/// distinct miss variant so exploratory searches can tell a miss from a
/// genuine failure.
pub fn unwrap_response(raw: Value) -> Result<Value> {
    let envelope: WireResponse = serde_json::from_value(raw)?;

    // W3C error objects live inside `value`.
    if let Some(obj) = envelope.value.as_object() {
        if let Some(code) = obj.get("error").and_then(|e| e.as_str()) {
            let message = obj
                .get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .unwrap_or(code)
                .to_string();
            if code == "no such element" {
                return Err(Error::no_such_element(message));
            }
            return Err(Error::webdriver(code, message));
        }
    }

    // Legacy envelopes carry a numeric status; 0 is success.
    if let Some(status) = envelope.status {
        if status != 0 {
            let code = legacy_status_name(status);
            let message = envelope
                .value
                .as_object()
                .and_then(|o| o.get("message"))
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("status {}", status));
            if status == 7 {
                return Err(Error::no_such_element(message));
            }
            return Err(Error::webdriver(code, message));
        }
    }

    Ok(envelope.value)
}

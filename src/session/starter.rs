//! Session starter
//!
//! Creates a new remote session or attaches to an already-running one.
//! Both entry points return the same `Session` type, so callers cannot
//! distinguish creation from attachment after the fact.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::protocol::tables::Verb;
use crate::protocol::wire::{unwrap_response, WireResponse};
use crate::session::session::Session;
use crate::transport::{ConnectOptions, HttpTransport, Transport};
use crate::{Error, Result};

/// Floor applied to the remote idle-reap timeout so the session under
/// inspection is not torn down between user interactions, in seconds
const NEW_COMMAND_TIMEOUT_FLOOR: u64 = 3600;

/// Create a new remote session over an HTTP transport built from the given
/// connection options (caller options merged over the documented defaults)
pub async fn start_session(options: ConnectOptions, capabilities: Value) -> Result<Arc<Session>> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(options)?);
    start_session_with(transport, capabilities).await
}

/// Attach to an already-running remote session by identifier
pub async fn attach_to_session(options: ConnectOptions, session_id: &str) -> Result<Arc<Session>> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(options)?);
    attach_with(transport, session_id).await
}

/// Create a new remote session over an existing transport
pub async fn start_session_with(
    transport: Arc<dyn Transport>,
    capabilities: Value,
) -> Result<Arc<Session>> {
    let caps = apply_safety_overrides(capabilities)?;

    // Both capability generations ride along; the remote end answers in
    // whichever shape it speaks.
    let payload = json!({
        "capabilities": { "alwaysMatch": caps, "firstMatch": [{}] },
        "desiredCapabilities": caps,
    });

    let raw = transport.send(Verb::Post, "/session", Some(payload)).await?;
    let envelope: WireResponse = serde_json::from_value(raw.clone())?;
    let value = unwrap_response(raw)?;

    // Modern shape: value carries sessionId and capabilities. Legacy shape:
    // the envelope carries sessionId and value is the capability map.
    let (id, negotiated, w3c) = if let Some(id) = value.get("sessionId").and_then(|v| v.as_str()) {
        let negotiated = value.get("capabilities").cloned().unwrap_or(json!({}));
        (id.to_string(), negotiated, true)
    } else if let Some(id) = envelope.session_id {
        (id, value, false)
    } else {
        return Err(Error::internal("session response carried no session id"));
    };

    info!("Created session {} (w3c: {})", id, w3c);
    Ok(Session::new(id, negotiated, transport, w3c))
}

/// Attach to a running session over an existing transport
///
/// Fails fast when the identifier is absent; this is fatal, not retried.
/// Protocol mode is forced to the modern standard and capabilities are not
/// renegotiated.
pub async fn attach_with(transport: Arc<dyn Transport>, session_id: &str) -> Result<Arc<Session>> {
    let id = session_id.trim();
    if id.is_empty() {
        return Err(Error::configuration(
            "attaching requires a non-empty session id",
        ));
    }

    info!("Attaching to session {}", id);
    Ok(Session::new(id, json!({}), transport, true))
}

/// Apply connection safety overrides to the capability payload
fn apply_safety_overrides(capabilities: Value) -> Result<Value> {
    let mut caps = match capabilities {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        _ => return Err(Error::configuration("capabilities must be a JSON object")),
    };

    if !caps.contains_key("newCommandTimeout") && !caps.contains_key("appium:newCommandTimeout") {
        caps.insert(
            "appium:newCommandTimeout".to_string(),
            json!(NEW_COMMAND_TIMEOUT_FLOOR),
        );
    }

    Ok(Value::Object(caps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[tokio::test]
    async fn test_start_session_w3c_shape() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Verb::Post,
            "/session",
            json!({
                "value": {
                    "sessionId": "w3c-1",
                    "capabilities": { "platformName": "iOS" }
                }
            }),
        );

        let session = start_session_with(mock.clone(), json!({ "platformName": "iOS" }))
            .await
            .expect("session");

        assert_eq!(session.id(), "w3c-1");
        assert!(session.is_w3c());
        assert_eq!(session.capabilities().platform_name().as_deref(), Some("ios"));
    }

    #[tokio::test]
    async fn test_start_session_legacy_shape() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Verb::Post,
            "/session",
            json!({
                "sessionId": "legacy-1",
                "status": 0,
                "value": { "platformName": "Android" }
            }),
        );

        let session = start_session_with(mock.clone(), json!({}))
            .await
            .expect("session");

        assert_eq!(session.id(), "legacy-1");
        assert!(!session.is_w3c());
        assert_eq!(
            session.capabilities().platform_name().as_deref(),
            Some("android")
        );
    }

    #[tokio::test]
    async fn test_start_session_applies_timeout_floor() {
        let mock = Arc::new(MockTransport::new());
        start_session_with(mock.clone(), json!({ "platformName": "Android" }))
            .await
            .expect("session");

        let requests = mock.requests();
        let caps = &requests[0].body.as_ref().unwrap()["capabilities"]["alwaysMatch"];
        assert_eq!(caps["appium:newCommandTimeout"], 3600);
    }

    #[tokio::test]
    async fn test_start_session_keeps_caller_timeout() {
        let mock = Arc::new(MockTransport::new());
        start_session_with(
            mock.clone(),
            json!({ "appium:newCommandTimeout": 120 }),
        )
        .await
        .expect("session");

        let requests = mock.requests();
        let caps = &requests[0].body.as_ref().unwrap()["capabilities"]["alwaysMatch"];
        assert_eq!(caps["appium:newCommandTimeout"], 120);
    }

    #[tokio::test]
    async fn test_attach_requires_session_id() {
        let mock = Arc::new(MockTransport::new());
        let err = attach_with(mock.clone(), "  ").await.expect_err("fatal");
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_attach_binds_without_renegotiation() {
        let mock = Arc::new(MockTransport::new());
        let session = attach_with(mock.clone(), "running-7").await.expect("attach");

        assert_eq!(session.id(), "running-7");
        assert!(session.is_w3c());
        // No remote call was made to bind.
        assert!(mock.requests().is_empty());
    }
}

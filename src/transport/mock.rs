//! Mock transport for testing
//!
//! Scripted stand-in for the HTTP transport. Tests register canned response
//! envelopes (or transport failures) keyed by verb and path suffix; every
//! request is recorded for later assertions. Unmatched requests fall back to
//! benign defaults so a test only stubs what it cares about.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

use crate::protocol::tables::Verb;
use crate::{Error, Result};

use super::traits::Transport;

/// 1x1 PNG, the default screenshot payload
pub const MOCK_SCREENSHOT_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

/// One request issued through the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub verb: Verb,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
enum Canned {
    Envelope(Value),
    Http(String),
    Timeout(String),
}

/// Mock transport implementation
#[derive(Debug, Default)]
pub struct MockTransport {
    stubs: Mutex<Vec<(Verb, String, Canned)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sticky raw envelope for requests whose path ends with
    /// `suffix`; later registrations win over earlier ones
    pub fn respond(&self, verb: Verb, suffix: &str, envelope: Value) {
        self.stubs
            .lock()
            .expect("stub lock")
            .push((verb, suffix.to_string(), Canned::Envelope(envelope)));
    }

    /// Register a success envelope wrapping `value`
    pub fn respond_value(&self, verb: Verb, suffix: &str, value: Value) {
        self.respond(verb, suffix, json!({ "value": value }));
    }

    /// Register a protocol error envelope
    pub fn respond_error(&self, verb: Verb, suffix: &str, error: &str, message: &str) {
        self.respond(
            verb,
            suffix,
            json!({ "value": { "error": error, "message": message } }),
        );
    }

    /// Register a transport-level failure
    pub fn fail_http(&self, verb: Verb, suffix: &str, message: &str) {
        self.stubs
            .lock()
            .expect("stub lock")
            .push((verb, suffix.to_string(), Canned::Http(message.to_string())));
    }

    /// Register a timeout failure
    pub fn fail_timeout(&self, verb: Verb, suffix: &str, message: &str) {
        self.stubs
            .lock()
            .expect("stub lock")
            .push((verb, suffix.to_string(), Canned::Timeout(message.to_string())));
    }

    /// All requests issued so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request lock").clone()
    }

    /// Requests whose path ends with `suffix`
    pub fn requests_matching(&self, suffix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(suffix))
            .collect()
    }

    fn lookup(&self, verb: Verb, path: &str) -> Option<Canned> {
        let stubs = self.stubs.lock().expect("stub lock");
        stubs
            .iter()
            .rev()
            .find(|(v, suffix, _)| *v == verb && path.ends_with(suffix.as_str()))
            .map(|(_, _, canned)| canned.clone())
    }

    fn canned_default(verb: Verb, path: &str) -> Value {
        if verb == Verb::Post && path == "/session" {
            return json!({
                "value": {
                    "sessionId": "mock-session",
                    "capabilities": {
                        "platformName": "Android",
                        "appium:automationName": "UiAutomator2",
                    }
                }
            });
        }
        if path.ends_with("/screenshot") {
            return json!({ "value": MOCK_SCREENSHOT_B64 });
        }
        if path.ends_with("/source") {
            return json!({ "value": "<hierarchy/>" });
        }
        if path.ends_with("/window/rect") {
            return json!({ "value": { "x": 0, "y": 0, "width": 1080, "height": 1920 } });
        }
        if path.ends_with("/contexts") {
            return json!({ "value": ["NATIVE_APP"] });
        }
        if path.ends_with("/context") && verb == Verb::Get {
            return json!({ "value": "NATIVE_APP" });
        }
        if path.ends_with("/orientation") {
            return json!({ "value": "PORTRAIT" });
        }
        if verb == Verb::Post && path.ends_with("/elements") {
            return json!({ "value": [] });
        }
        if verb == Verb::Post && path.ends_with("/element") {
            return json!({
                "value": { "error": "no such element", "message": "no element stubbed" }
            });
        }
        if path == "/status" {
            return json!({ "value": { "ready": true, "message": "mock ready" } });
        }
        json!({ "value": null })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, verb: Verb, path: &str, body: Option<Value>) -> Result<Value> {
        self.requests.lock().expect("request lock").push(RecordedRequest {
            verb,
            path: path.to_string(),
            body,
        });

        match self.lookup(verb, path) {
            Some(Canned::Envelope(envelope)) => Ok(envelope),
            Some(Canned::Http(message)) => Err(Error::http(message)),
            Some(Canned::Timeout(message)) => Err(Error::timeout(message)),
            None => Ok(Self::canned_default(verb, path)),
        }
    }

    fn endpoint(&self) -> String {
        "mock://".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_session_response() {
        let mock = MockTransport::new();
        let envelope = mock.send(Verb::Post, "/session", None).await.unwrap();
        assert_eq!(envelope["value"]["sessionId"], "mock-session");
    }

    #[tokio::test]
    async fn test_stub_overrides_default() {
        let mock = MockTransport::new();
        mock.respond_value(Verb::Get, "/source", json!("<AppRoot/>"));

        let envelope = mock
            .send(Verb::Get, "/session/s1/source", None)
            .await
            .unwrap();
        assert_eq!(envelope["value"], "<AppRoot/>");
    }

    #[tokio::test]
    async fn test_later_stub_wins() {
        let mock = MockTransport::new();
        mock.respond_value(Verb::Get, "/title", json!("first"));
        mock.respond_value(Verb::Get, "/title", json!("second"));

        let envelope = mock.send(Verb::Get, "/session/s1/title", None).await.unwrap();
        assert_eq!(envelope["value"], "second");
    }

    #[tokio::test]
    async fn test_transport_failure_stub() {
        let mock = MockTransport::new();
        mock.fail_http(Verb::Get, "/screenshot", "connection reset");

        let err = mock
            .send(Verb::Get, "/session/s1/screenshot", None)
            .await
            .expect_err("stubbed failure");
        assert!(matches!(err, Error::Http(_)));
    }

    #[tokio::test]
    async fn test_requests_are_recorded() {
        let mock = MockTransport::new();
        mock.send(Verb::Get, "/session/s1/title", None).await.unwrap();
        mock.send(Verb::Post, "/session/s1/url", Some(json!({"url": "x"})))
            .await
            .unwrap();

        assert_eq!(mock.requests().len(), 2);
        assert_eq!(mock.requests_matching("/url").len(), 1);
    }
}

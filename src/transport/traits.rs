//! Transport layer traits

use async_trait::async_trait;
use serde_json::Value;

use crate::protocol::tables::Verb;
use crate::Result;

/// Remote endpoint transport
///
/// One transport per live session. `send` carries a single protocol command
/// and resolves with the raw response envelope; envelope unwrapping and
/// error classification happen in the protocol layer, not here.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Issue one request against the remote endpoint
    ///
    /// `path` is relative to the endpoint base. POST bodies default to an
    /// empty JSON object when `body` is `None`.
    async fn send(&self, verb: Verb, path: &str, body: Option<Value>) -> Result<Value>;

    /// Human-readable endpoint description (for logging)
    fn endpoint(&self) -> String;

    /// Liveness probe against the endpoint's status route
    async fn status(&self) -> Result<Value> {
        self.send(Verb::Get, "/status", None).await
    }
}

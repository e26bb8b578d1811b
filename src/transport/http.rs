//! HTTP transport implementation
//!
//! reqwest-based transport for the remote automation endpoint. Connection
//! parameters (host, port, base path, scheme, optional credentials and extra
//! headers) are supplied by the caller; vendor resolution happens upstream.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use crate::protocol::tables::Verb;
use crate::{Config, Error, Result};

use super::traits::Transport;

/// Connection parameters for the remote endpoint
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// URL scheme ("http" or "https")
    pub scheme: String,
    /// Endpoint host
    pub host: String,
    /// Endpoint port
    pub port: u16,
    /// Base path prefix (e.g. "/" or "/wd/hub")
    pub path: String,
    /// Optional basic-auth username
    pub username: Option<String>,
    /// Optional basic-auth password
    pub password: Option<String>,
    /// Extra headers supplied by the vendor collaborator
    pub headers: Vec<(String, String)>,
    /// Default timeout for ordinary commands in seconds
    pub command_timeout: u64,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port: 4723,
            path: "/".to_string(),
            username: None,
            password: None,
            headers: Vec::new(),
            command_timeout: 30,
        }
    }
}

impl ConnectOptions {
    /// Build connection options from the process configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            scheme: config.scheme.clone(),
            host: config.host.clone(),
            port: config.port,
            path: config.path.clone(),
            command_timeout: config.command_timeout,
            ..Self::default()
        }
    }

    /// Endpoint base URL with a normalized path prefix
    pub fn base_url(&self) -> String {
        let prefix = self.path.trim_end_matches('/');
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, prefix)
    }
}

/// Timeout configuration per command class
///
/// Screenshot and source fetches routinely outlast ordinary commands, and
/// session creation waits for app launch.
#[derive(Debug, Clone)]
struct TimeoutConfig {
    default_secs: u64,
    screenshot_secs: u64,
    source_secs: u64,
    new_session_secs: u64,
}

impl TimeoutConfig {
    fn with_default(default_secs: u64) -> Self {
        Self {
            default_secs,
            screenshot_secs: 90,
            source_secs: 60,
            new_session_secs: 120,
        }
    }

    /// Timeout duration for a specific request path
    fn for_path(&self, verb: Verb, path: &str) -> std::time::Duration {
        let secs = if path.ends_with("/screenshot") {
            self.screenshot_secs
        } else if path.ends_with("/source") {
            self.source_secs
        } else if verb == Verb::Post && path == "/session" {
            self.new_session_secs
        } else {
            self.default_secs
        };
        std::time::Duration::from_secs(secs)
    }
}

/// HTTP transport implementation
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    options: ConnectOptions,
    base_url: String,
    timeouts: TimeoutConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport from connection options
    pub fn new(options: ConnectOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::configuration(format!("Invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::configuration(format!("Invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = options.base_url();
        let timeouts = TimeoutConfig::with_default(options.command_timeout);

        Ok(Self {
            client,
            options,
            base_url,
            timeouts,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, verb: Verb, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", verb.as_str(), url);

        let mut request = match verb {
            Verb::Get => self.client.get(&url),
            Verb::Post => self
                .client
                .post(&url)
                .json(&body.unwrap_or_else(|| serde_json::json!({}))),
            Verb::Delete => self.client.delete(&url),
        };

        if let Some(username) = &self.options.username {
            request = request.basic_auth(username, self.options.password.as_deref());
        }

        let timeout = self.timeouts.for_path(verb, path);
        let response = request.timeout(timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout(format!("{} {} timed out", verb.as_str(), path))
            } else {
                Error::http(format!("{} {} failed: {}", verb.as_str(), path, e))
            }
        })?;

        let status = response.status();

        // Error envelopes arrive with non-2xx statuses; the body still
        // carries the protocol error object, so parse it either way and let
        // the protocol layer classify.
        match response.json::<Value>().await {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("Non-JSON response ({}) from {} {}", status, verb.as_str(), path);
                Err(Error::http(format!(
                    "{} {} returned {} with unreadable body: {}",
                    verb.as_str(),
                    path,
                    status,
                    e
                )))
            }
        }
    }

    fn endpoint(&self) -> String {
        self.base_url.clone()
    }
}

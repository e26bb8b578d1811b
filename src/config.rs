//! Configuration management for Scout-Oxide

use crate::{Error, Result};
use serde::Deserialize;
use std::env;

/// Inspector configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Remote endpoint host
    pub host: String,

    /// Remote endpoint port
    pub port: u16,

    /// Base path of the remote endpoint (e.g. "/" or "/wd/hub")
    pub path: String,

    /// URL scheme ("http" or "https")
    pub scheme: String,

    /// Existing session id to attach to instead of creating a new session
    pub attach_session_id: Option<String>,

    /// Settle delay after an interaction before refreshing, in milliseconds
    pub settle_delay_ms: u64,

    /// Default timeout for remote commands in seconds
    pub command_timeout: u64,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4723,
            path: "/".to_string(),
            scheme: "http".to_string(),
            attach_session_id: None,
            settle_delay_ms: 500,
            command_timeout: 30,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(host) = env::var("SCOUT_HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("SCOUT_PORT") {
            config.port = port
                .parse()
                .map_err(|_| Error::configuration("Invalid SCOUT_PORT"))?;
        }

        if let Ok(path) = env::var("SCOUT_PATH") {
            config.path = path;
        }

        if let Ok(scheme) = env::var("SCOUT_SCHEME") {
            config.scheme = scheme;
        }

        if let Ok(session_id) = env::var("SCOUT_SESSION_ID") {
            if !session_id.is_empty() {
                config.attach_session_id = Some(session_id);
            }
        }

        if let Ok(settle) = env::var("SCOUT_SETTLE_DELAY_MS") {
            config.settle_delay_ms = settle
                .parse()
                .map_err(|_| Error::configuration("Invalid SCOUT_SETTLE_DELAY_MS"))?;
        }

        if let Ok(timeout) = env::var("SCOUT_COMMAND_TIMEOUT") {
            config.command_timeout = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid SCOUT_COMMAND_TIMEOUT"))?;
        }

        if let Ok(log_level) = env::var("SCOUT_LOG_LEVEL") {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }
}

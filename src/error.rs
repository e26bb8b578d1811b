//! Unified error types for Scout-Oxide

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Scout-Oxide
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Remote protocol errors (response carried an error object)
    #[error("WebDriver error [{error}]: {message}")]
    WebDriver { error: String, message: String },

    /// Single-element search produced no match
    #[error("No such element: {0}")]
    NoSuchElement(String),

    /// Command name is not defined by any protocol table
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Command invoked against the wrong scope (session vs element)
    #[error("Command scope mismatch: {0}")]
    ScopeMismatch(String),

    /// Element id was never fetched into the cache
    #[error("Element not cached: {0}")]
    ElementNotCached(String),

    /// Session has been deleted; the inspector is terminal
    #[error("Session closed: {0}")]
    SessionClosed(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timeout
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new HTTP transport error
    pub fn http<S: Into<String>>(msg: S) -> Self {
        Error::Http(msg.into())
    }

    /// Create a new remote protocol error
    pub fn webdriver<E: Into<String>, M: Into<String>>(error: E, message: M) -> Self {
        Error::WebDriver {
            error: error.into(),
            message: message.into(),
        }
    }

    /// Create a new no-such-element error
    pub fn no_such_element<S: Into<String>>(msg: S) -> Self {
        Error::NoSuchElement(msg.into())
    }

    /// Create a new unknown command error
    pub fn unknown_command<S: Into<String>>(name: S) -> Self {
        Error::UnknownCommand(name.into())
    }

    /// Create a new scope mismatch error
    pub fn scope_mismatch<S: Into<String>>(msg: S) -> Self {
        Error::ScopeMismatch(msg.into())
    }

    /// Create a new element-not-cached error
    pub fn element_not_cached<S: Into<String>>(id: S) -> Self {
        Error::ElementNotCached(id.into())
    }

    /// Create a new session-closed error
    pub fn session_closed<S: Into<String>>(msg: S) -> Self {
        Error::SessionClosed(msg.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Whether this error is an expected search miss rather than a failure
    pub fn is_miss(&self) -> bool {
        matches!(self, Error::NoSuchElement(_))
    }

    /// Whether the remote end reported the command itself as unsupported
    pub fn is_unsupported_command(&self) -> bool {
        match self {
            Error::WebDriver { error, .. } => {
                error == "unknown command"
                    || error == "unknown method"
                    || error == "unsupported operation"
            }
            Error::UnknownCommand(_) => true,
            _ => false,
        }
    }
}

//! Scout-Oxide: session transport and command-dispatch core
//!
//! This library drives a remote automation session (the WebDriver/JSON-Wire
//! family) for visual inspection: the generated command surface over layered
//! protocol tables, element handle tracking, and webview-to-native
//! coordinate reconciliation.

pub mod config;
pub mod error;

pub mod inspector;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use inspector::Inspector;
pub use session::{Element, Session};

/// Scout-Oxide library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Remote endpoint transport layer
//!
//! Defines the abstract transport seam used by the session plus the two
//! implementations: the reqwest-backed HTTP transport and a mock used by
//! tests.

pub mod http;
pub mod mock;
pub mod traits;

pub use http::{ConnectOptions, HttpTransport};
pub use mock::MockTransport;
pub use traits::Transport;

//! Inspector orchestration
//!
//! The stateful façade consumed by the surrounding application: one logical
//! client-method call per `run`, a session-lifetime element cache, the
//! post-call refresh sequence, and webview-to-native coordinate
//! reconciliation.

pub mod cache;
pub mod context;
pub mod gestures;
pub mod orchestrator;
pub mod scripts;
pub mod types;

pub use cache::{CachedElement, ElementCache};
pub use context::NATIVE_CONTEXT;
pub use orchestrator::Inspector;
pub use types::{
    AppMode, ContextEntry, ContextUpdate, ElementMeta, FetchedElement, FetchedElements,
    RunRequest, RunResult, WebviewOffset,
};

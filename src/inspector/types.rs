//! Inspector request and result records
//!
//! Plain structured records at the boundary to the surrounding application;
//! no binary framing at this layer.

use serde::Serialize;
use serde_json::Value;

use crate::session::Rect;

/// Interaction mode of the app under inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    /// Native-only interaction; contexts are left alone
    #[default]
    Native,
    /// Hybrid interaction; refresh recomputes contexts and offsets
    Hybrid,
}

/// One logical client-method call
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Method name to invoke; mutually exclusive with strategy/selector
    pub method: Option<String>,
    /// Locator strategy for a pure element search
    pub strategy: Option<String>,
    /// Selector for a pure element search
    pub selector: Option<String>,
    /// Whether the search fetches all matches instead of one
    pub fetch_multiple: bool,
    /// Cached element identifier the method targets
    pub element_id: Option<String>,
    /// Positional arguments
    pub args: Vec<Value>,
    /// Skip the whole post-call refresh
    pub skip_refresh: bool,
    /// Skip only the screenshot portion of the refresh
    pub skip_screenshot: bool,
    /// Current interaction app-mode
    pub app_mode: AppMode,
}

impl RunRequest {
    /// Request invoking a session-scoped method
    pub fn method(name: impl Into<String>) -> Self {
        Self {
            method: Some(name.into()),
            ..Self::default()
        }
    }

    /// Request invoking a method on a cached element
    pub fn element_method(element_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            method: Some(name.into()),
            element_id: Some(element_id.into()),
            ..Self::default()
        }
    }

    /// Request performing a pure element search
    pub fn search(strategy: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            strategy: Some(strategy.into()),
            selector: Some(selector.into()),
            ..Self::default()
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn with_app_mode(mut self, app_mode: AppMode) -> Self {
        self.app_mode = app_mode;
        self
    }

    pub fn fetch_all(mut self) -> Self {
        self.fetch_multiple = true;
        self
    }

    pub fn without_refresh(mut self) -> Self {
        self.skip_refresh = true;
        self
    }

    pub fn without_screenshot(mut self) -> Self {
        self.skip_screenshot = true;
        self
    }
}

/// Pixel translation from an embedded web surface onto the native screenshot
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WebviewOffset {
    pub top: f64,
    pub left: f64,
}

/// One native or embedded-web execution surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextEntry {
    /// Context identifier used for switching
    pub id: String,
    /// Page title, web surfaces only
    pub title: Option<String>,
    /// Page url, web surfaces only
    pub url: Option<String>,
    /// Reconciled pixel offset, web surfaces only
    pub offset: Option<WebviewOffset>,
}

impl ContextEntry {
    /// The native pseudo-context entry
    pub fn native() -> Self {
        Self {
            id: crate::inspector::context::NATIVE_CONTEXT.to_string(),
            title: None,
            url: None,
            offset: None,
        }
    }
}

/// Outcome of one context reconciliation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContextUpdate {
    /// Whether the remote end supports context enumeration at all
    pub supported: bool,
    /// The current context as reported to the caller
    pub current: Option<String>,
    /// Flattened context list, native pseudo-context first
    pub contexts: Vec<ContextEntry>,
    /// Captured reconciliation error, if any step failed
    pub error: Option<String>,
}

impl ContextUpdate {
    /// Short-circuit result for remotes without context support
    pub fn unsupported() -> Self {
        Self::default()
    }
}

/// Cached-element metadata attached to results
#[derive(Debug, Clone, Serialize)]
pub struct ElementMeta {
    pub id: String,
    pub variable_name: Option<String>,
    pub variable_index: Option<usize>,
    pub strategy: String,
    pub selector: String,
}

/// Outcome of a single-element fetch; empty on a search miss
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchedElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl FetchedElement {
    /// The empty result used for misses and superseded fetches
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Outcome of an all-elements fetch
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchedElements {
    pub ids: Vec<String>,
    pub variable_name: Option<String>,
    pub execution_time_ms: u64,
}

/// Merged result of one `run` call
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    /// Raw value returned by the invoked command, if any
    pub command_result: Option<Value>,
    /// Metadata of the cached element involved, if any
    pub element: Option<ElementMeta>,
    /// Base64 screenshot
    pub screenshot: Option<String>,
    pub screenshot_error: Option<String>,
    /// Window geometry
    pub window_rect: Option<Rect>,
    pub window_error: Option<String>,
    /// Page source
    pub source: Option<String>,
    pub source_error: Option<String>,
    /// Context reconciliation outcome, hybrid refresh only
    pub context: Option<ContextUpdate>,
}

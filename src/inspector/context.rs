//! Context and coordinate reconciliation
//!
//! Evaluated only in hybrid app-mode during a refresh. Reads the current
//! context, measures the webview's native offset from a native-context
//! baseline, and always returns the remote end to the context it started in
//! before reporting. The unsupported short-circuit is the one path allowed
//! to skip the restore, because nothing was switched.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::inspector::scripts::APPLY_OFFSET_SCRIPT;
use crate::inspector::types::{ContextEntry, ContextUpdate, WebviewOffset};
use crate::session::{ScriptMode, Session};

/// The native pseudo-context
pub const NATIVE_CONTEXT: &str = "NATIVE_APP";

/// Webview root element class on Android
const ANDROID_WEBVIEW_CLASS: &str = "android.webkit.WebView";

/// Webview root element class on iOS
const IOS_WEBVIEW_CLASS: &str = "XCUIElementTypeWebView";

/// Content view of the Chrome browser surface, which exposes no plain
/// WebView element
const ANDROID_CHROME_CONTENT_XPATH: &str =
    "//android.view.View[@resource-id='com.android.chrome:id/compositor_view_holder']";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Platform {
    Android,
    Ios,
    Other,
}

fn platform_of(session: &Session) -> Platform {
    match session.capabilities().platform_name().as_deref() {
        Some("android") => Platform::Android,
        Some("ios") => Platform::Ios,
        _ => Platform::Other,
    }
}

fn capture(update: &mut ContextUpdate, err: &crate::Error) {
    if update.error.is_none() {
        update.error = Some(err.to_string());
    }
}

/// Run one reconciliation pass and report the resulting context state
pub async fn reconcile(session: &Arc<Session>) -> ContextUpdate {
    if !session.registry().contains("getContexts")
        || !session.registry().contains("getCurrentContext")
    {
        return ContextUpdate::unsupported();
    }

    let platform = platform_of(session);
    let mut update = ContextUpdate {
        supported: true,
        ..ContextUpdate::default()
    };

    // Support is probed by the first context read; a remote that rejects it
    // as an unknown command has no context surface to restore.
    let original = match session.current_context().await {
        Ok(current) => current,
        Err(err) if err.is_unsupported_command() => return ContextUpdate::unsupported(),
        Err(err) => {
            capture(&mut update, &err);
            NATIVE_CONTEXT.to_string()
        }
    };
    let was_web = original != NATIVE_CONTEXT;

    // Offset computation needs a native measurement baseline.
    if was_web {
        if let Err(err) = session.set_context(NATIVE_CONTEXT).await {
            capture(&mut update, &err);
        }
    }

    match session.contexts().await {
        Ok(raw) => update.contexts = flatten_contexts(platform, &raw),
        Err(err) => {
            capture(&mut update, &err);
            update.contexts = vec![ContextEntry::native()];
        }
    }

    let mut offset = None;
    if was_web {
        let computed = compute_offset(session, platform).await;
        debug!(
            "webview offset for {}: top={} left={}",
            original, computed.top, computed.left
        );
        for entry in update.contexts.iter_mut().filter(|c| c.id != NATIVE_CONTEXT) {
            entry.offset = Some(computed);
        }
        offset = Some(computed);
    }

    // Mandatory on every path that switched away: put the caller back where
    // it started, then push the offsets into the web surface.
    if was_web {
        if let Err(err) = session.set_context(&original).await {
            capture(&mut update, &err);
        }
        if let Some(offset) = offset {
            if let Err(err) = session
                .execute_script(
                    APPLY_OFFSET_SCRIPT,
                    &[json!(offset.top), json!(offset.left)],
                    ScriptMode::Sync,
                )
                .await
            {
                warn!("failed to push webview offsets: {}", err);
            }
        }
    }

    update.current = Some(original);
    update
}

/// Flatten a raw context enumeration payload
///
/// Plain string lists pass through. The richer nested payload (webview
/// descriptors carrying pages) keeps only pages marked attached or carrying
/// no attachment marker. The native pseudo-context is always prepended.
fn flatten_contexts(platform: Platform, raw: &Value) -> Vec<ContextEntry> {
    let mut entries = vec![ContextEntry::native()];

    let items = match raw.as_array() {
        Some(items) => items,
        None => return entries,
    };

    for item in items {
        match item {
            Value::String(id) => {
                if id != NATIVE_CONTEXT {
                    entries.push(ContextEntry {
                        id: id.clone(),
                        title: None,
                        url: None,
                        offset: None,
                    });
                }
            }
            Value::Object(obj) => {
                let id = obj
                    .get("id")
                    .or_else(|| obj.get("webview"))
                    .or_else(|| obj.get("webviewName"))
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                if id.is_empty() || id == NATIVE_CONTEXT {
                    continue;
                }

                match (platform, obj.get("pages").and_then(|p| p.as_array())) {
                    (Platform::Android, Some(pages)) => {
                        for page in pages {
                            let attached = page
                                .get("attached")
                                .and_then(|a| a.as_bool())
                                .unwrap_or(true);
                            if !attached {
                                continue;
                            }
                            entries.push(ContextEntry {
                                id: id.clone(),
                                title: page
                                    .get("title")
                                    .and_then(|t| t.as_str())
                                    .map(|t| t.to_string()),
                                url: page.get("url").and_then(|u| u.as_str()).map(|u| u.to_string()),
                                offset: None,
                            });
                        }
                    }
                    _ => {
                        entries.push(ContextEntry {
                            id,
                            title: obj.get("title").and_then(|t| t.as_str()).map(|t| t.to_string()),
                            url: obj.get("url").and_then(|u| u.as_str()).map(|u| u.to_string()),
                            offset: None,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    entries
}

/// Compute the webview-to-native offset using the platform strategy ladder
///
/// Never fails; the final fallback is a zero offset rather than failing the
/// whole refresh.
async fn compute_offset(session: &Arc<Session>, platform: Platform) -> WebviewOffset {
    match platform {
        Platform::Android => {
            let locator = if session.capabilities().browser_name().as_deref() == Some("chrome") {
                ("xpath", ANDROID_CHROME_CONTENT_XPATH)
            } else {
                ("class name", ANDROID_WEBVIEW_CLASS)
            };
            if let Some(offset) = element_offset(session, locator.0, locator.1).await {
                return offset;
            }
            if let Some(height) = status_bar_height(session).await {
                // In landscape the bar occupies the long edge, so the
                // correction moves to the horizontal axis.
                return if is_landscape(session).await {
                    WebviewOffset {
                        top: 0.0,
                        left: height,
                    }
                } else {
                    WebviewOffset {
                        top: height,
                        left: 0.0,
                    }
                };
            }
            if let Some(offset) = viewport_offset(session).await {
                return offset;
            }
            WebviewOffset::default()
        }
        Platform::Ios => {
            if let Some(offset) = element_offset(session, "class name", IOS_WEBVIEW_CLASS).await {
                return offset;
            }
            if let Some(offset) = viewport_offset(session).await {
                return offset;
            }
            if let Some(height) = stat_bar_height(session).await {
                return WebviewOffset {
                    top: height,
                    left: 0.0,
                };
            }
            WebviewOffset::default()
        }
        Platform::Other => WebviewOffset::default(),
    }
}

/// Offset from the position of a known root element
async fn element_offset(session: &Arc<Session>, using: &str, value: &str) -> Option<WebviewOffset> {
    let element = match session.find_element(using, value).await {
        Ok(element) => element,
        Err(err) => {
            debug!("webview root lookup failed ({} {}): {}", using, value, err);
            return None;
        }
    };
    let rect = element.rect().await.ok()?;
    Some(WebviewOffset {
        top: rect.y,
        left: rect.x,
    })
}

/// Status bar height from the device system-bars query
async fn status_bar_height(session: &Arc<Session>) -> Option<f64> {
    let bars = session.system_bars().await.ok()?;
    bars.get("statusBar")?.get("height")?.as_f64()
}

/// Offset from the raw session viewport details
async fn viewport_offset(session: &Arc<Session>) -> Option<WebviewOffset> {
    let details = session.session_details().await.ok()?;
    let viewport = details.get("viewportRect")?;
    Some(WebviewOffset {
        top: viewport.get("top")?.as_f64()?,
        left: viewport.get("left")?.as_f64()?,
    })
}

/// Status bar height from the raw session details
async fn stat_bar_height(session: &Arc<Session>) -> Option<f64> {
    let details = session.session_details().await.ok()?;
    details.get("statBarHeight")?.as_f64()
}

async fn is_landscape(session: &Arc<Session>) -> bool {
    session
        .orientation()
        .await
        .map(|o| o.eq_ignore_ascii_case("LANDSCAPE"))
        .unwrap_or(false)
}

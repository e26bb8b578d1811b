//! Integration tests for the inspector orchestrator
//!
//! Drives the full stack (orchestrator, session, protocol, transport seam)
//! against the mock transport.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use scout_oxide::inspector::{AppMode, Inspector, RunRequest};
use scout_oxide::protocol::wire::W3C_ELEMENT_KEY;
use scout_oxide::protocol::{Verb, EXCLUDED_COMMANDS, PROTOCOL_TABLES};
use scout_oxide::session::{start_session_with, Session};
use scout_oxide::transport::MockTransport;
use scout_oxide::Error;

/// Helper building an inspector over a mock-backed Android session
fn android_inspector() -> (Inspector, Arc<MockTransport>) {
    let mock = Arc::new(MockTransport::new());
    let session = Session::new(
        "test-session",
        json!({ "platformName": "Android", "appium:automationName": "UiAutomator2" }),
        mock.clone(),
        true,
    );
    let inspector = Inspector::new(session).with_settle_delay(Duration::from_millis(0));
    (inspector, mock)
}

// ============= Command table properties =============

#[test]
fn test_command_table_completeness() {
    let registry = scout_oxide::protocol::CommandRegistry::standard();

    let session: std::collections::HashSet<&str> = registry.session_commands().collect();
    let element: std::collections::HashSet<&str> = registry.element_commands().collect();

    for table in PROTOCOL_TABLES {
        for def in *table {
            if EXCLUDED_COMMANDS.contains(def.name) {
                assert!(
                    !session.contains(def.name) && !element.contains(def.name),
                    "{} is excluded and must not be installed",
                    def.name
                );
            } else {
                assert!(
                    session.contains(def.name) ^ element.contains(def.name),
                    "{} must be installed on exactly one of session/element",
                    def.name
                );
            }
        }
    }
}

#[tokio::test]
async fn test_element_scoped_command_is_rejected_on_session() {
    let (inspector, _mock) = android_inspector();

    let err = inspector
        .run(RunRequest::method("click").without_refresh())
        .await
        .expect_err("element-scoped name through the session path");
    assert!(matches!(err, Error::ScopeMismatch(_)));
}

// ============= Cache properties =============

#[tokio::test]
async fn test_cache_idempotence() {
    let (inspector, mock) = android_inspector();
    mock.respond_value(Verb::Post, "/element", json!({ W3C_ELEMENT_KEY: "stable-1" }));

    let first = inspector.fetch_element("xpath", "//x").await.expect("fetch");
    let second = inspector.fetch_element("xpath", "//x").await.expect("fetch");

    assert_eq!(first.id.as_deref(), Some("stable-1"));
    assert_eq!(second.id.as_deref(), Some("stable-1"));
    assert_eq!(inspector.cached_count(), 1);
}

#[tokio::test]
async fn test_distinct_searches_insert_distinct_entries() {
    let (inspector, mock) = android_inspector();

    mock.respond_value(Verb::Post, "/element", json!({ W3C_ELEMENT_KEY: "id-a" }));
    inspector.fetch_element("xpath", "//a").await.expect("fetch a");

    mock.respond_value(Verb::Post, "/element", json!({ W3C_ELEMENT_KEY: "id-b" }));
    inspector
        .fetch_element("accessibility id", "login")
        .await
        .expect("fetch b");

    assert_eq!(inspector.cached_count(), 2);
}

#[tokio::test]
async fn test_fetch_elements_assigns_group_names() {
    let (inspector, mock) = android_inspector();
    mock.respond_value(
        Verb::Post,
        "/elements",
        json!([{ W3C_ELEMENT_KEY: "r-0" }, { W3C_ELEMENT_KEY: "r-1" }]),
    );

    let fetched = inspector
        .fetch_elements("class name", "android.widget.Button")
        .await
        .expect("fetch all");

    assert_eq!(fetched.ids, vec!["r-0", "r-1"]);
    assert_eq!(fetched.variable_name.as_deref(), Some("els1"));

    let meta = inspector.cached_element("r-1").expect("cached");
    assert_eq!(meta.variable_name.as_deref(), Some("els1"));
    assert_eq!(meta.variable_index, Some(1));

    let again = inspector
        .fetch_elements("class name", "android.widget.Button")
        .await
        .expect("fetch all again");
    assert_eq!(again.variable_name.as_deref(), Some("els2"));
}

// ============= Teardown properties =============

#[tokio::test]
async fn test_teardown_resets_all_state() {
    let (inspector, mock) = android_inspector();
    mock.respond_value(Verb::Post, "/element", json!({ W3C_ELEMENT_KEY: "e-1" }));

    inspector.fetch_element("xpath", "//x").await.expect("fetch");
    assert_eq!(inspector.cached_count(), 1);

    let result = inspector
        .run(RunRequest::method("deleteSession"))
        .await
        .expect("teardown");
    assert!(result.source.is_none());
    assert!(result.screenshot.is_none());
    assert!(result.window_rect.is_none());

    // The previously valid identifier must now be unknown, not silently
    // accepted.
    let err = inspector
        .run(RunRequest::element_method("e-1", "click"))
        .await
        .expect_err("stale identifier");
    assert!(matches!(err, Error::ElementNotCached(_)));
}

#[tokio::test]
async fn test_teardown_survives_remote_delete_failure() {
    let (inspector, mock) = android_inspector();
    mock.fail_http(Verb::Delete, "/session/test-session", "connection reset");

    inspector
        .run(RunRequest::method("deleteSession"))
        .await
        .expect("teardown is best-effort");
    assert!(inspector.is_closed());
}

// ============= Refresh properties =============

#[tokio::test]
async fn test_refresh_isolation_on_screenshot_failure() {
    let (inspector, mock) = android_inspector();
    mock.fail_http(Verb::Get, "/screenshot", "screenshot pipeline broke");

    let result = inspector
        .run(RunRequest::method("navigateTo").with_args(vec![json!("http://x.test")]))
        .await
        .expect("run must not throw");

    assert!(result.screenshot.is_none());
    assert!(result
        .screenshot_error
        .as_deref()
        .unwrap()
        .contains("screenshot pipeline broke"));
    assert!(result.window_rect.is_some());
    assert_eq!(result.source.as_deref(), Some("<hierarchy/>"));
}

#[tokio::test]
async fn test_skip_refresh_suppresses_all_probes() {
    let (inspector, mock) = android_inspector();

    inspector
        .run(RunRequest::method("getTitle").without_refresh())
        .await
        .expect("run");

    assert!(mock.requests_matching("/screenshot").is_empty());
    assert!(mock.requests_matching("/source").is_empty());
    assert!(mock.requests_matching("/window/rect").is_empty());
}

#[tokio::test]
async fn test_skip_screenshot_keeps_other_probes() {
    let (inspector, mock) = android_inspector();

    let result = inspector
        .run(RunRequest::method("getTitle").without_screenshot())
        .await
        .expect("run");

    assert!(mock.requests_matching("/screenshot").is_empty());
    assert!(result.screenshot.is_none());
    assert!(result.screenshot_error.is_none());
    assert!(result.source.is_some());
    assert!(result.window_rect.is_some());
}

#[tokio::test]
async fn test_native_mode_skips_context_reconciliation() {
    let (inspector, mock) = android_inspector();

    let result = inspector
        .run(RunRequest::method("getTitle"))
        .await
        .expect("run");

    assert!(result.context.is_none());
    assert!(mock.requests_matching("/contexts").is_empty());
}

// ============= Context and offset properties =============

#[tokio::test]
async fn test_offset_round_trip() {
    let (inspector, mock) = android_inspector();

    mock.respond_value(Verb::Get, "/context", json!("WEBVIEW_com.shop"));
    mock.respond_value(
        Verb::Get,
        "/contexts",
        json!(["NATIVE_APP", "WEBVIEW_com.shop"]),
    );
    // The detected webview root and its native-context rectangle.
    mock.respond_value(Verb::Post, "/element", json!({ W3C_ELEMENT_KEY: "wv-root" }));
    mock.respond_value(
        Verb::Get,
        "/element/wv-root/rect",
        json!({ "x": 10.0, "y": 40.0, "width": 5.0, "height": 5.0 }),
    );

    let result = inspector
        .run(RunRequest::method("getTitle").with_app_mode(AppMode::Hybrid))
        .await
        .expect("run");

    let context = result.context.expect("context update");
    assert!(context.supported);
    assert_eq!(context.current.as_deref(), Some("WEBVIEW_com.shop"));

    let web = context
        .contexts
        .iter()
        .find(|c| c.id == "WEBVIEW_com.shop")
        .expect("web entry");
    let offset = web.offset.expect("offset");
    assert_eq!(offset.top, 40.0);
    assert_eq!(offset.left, 10.0);

    // The remote end must have been switched to native for the measurement
    // baseline and back to the original web context afterwards.
    let switches: Vec<String> = mock
        .requests_matching("/context")
        .into_iter()
        .filter(|r| r.verb == Verb::Post)
        .map(|r| r.body.unwrap()["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(switches, vec!["NATIVE_APP", "WEBVIEW_com.shop"]);

    // And the offsets were pushed into the web surface.
    let pushes = mock.requests_matching("/execute/sync");
    assert_eq!(pushes.len(), 1);
    let args = &pushes[0].body.as_ref().unwrap()["args"];
    assert_eq!(args[0], 40.0);
    assert_eq!(args[1], 10.0);
}

#[tokio::test]
async fn test_context_restore_happens_even_when_offset_ladder_fails() {
    let (inspector, mock) = android_inspector();

    mock.respond_value(Verb::Get, "/context", json!("WEBVIEW_com.shop"));
    mock.respond_value(
        Verb::Get,
        "/contexts",
        json!(["NATIVE_APP", "WEBVIEW_com.shop"]),
    );
    // Every offset strategy fails: no webview root, no system bars, no
    // session details.
    mock.fail_http(Verb::Post, "/element", "no root");
    mock.fail_http(Verb::Get, "/system_bars", "no bars");
    mock.fail_http(Verb::Get, "/session/test-session", "no details");

    let result = inspector
        .run(RunRequest::method("getTitle").with_app_mode(AppMode::Hybrid))
        .await
        .expect("run");

    let context = result.context.expect("context update");
    assert_eq!(context.current.as_deref(), Some("WEBVIEW_com.shop"));

    // Offset defaults to zero rather than failing the refresh.
    let web = context
        .contexts
        .iter()
        .find(|c| c.id == "WEBVIEW_com.shop")
        .expect("web entry");
    assert_eq!(web.offset.unwrap().top, 0.0);
    assert_eq!(web.offset.unwrap().left, 0.0);

    // Restore still happened.
    let switches: Vec<String> = mock
        .requests_matching("/context")
        .into_iter()
        .filter(|r| r.verb == Verb::Post)
        .map(|r| r.body.unwrap()["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(switches.last().map(|s| s.as_str()), Some("WEBVIEW_com.shop"));
}

#[tokio::test]
async fn test_unsupported_contexts_short_circuit() {
    let (inspector, mock) = android_inspector();

    mock.respond_error(
        Verb::Get,
        "/context",
        "unknown command",
        "context queries are not implemented",
    );

    let result = inspector
        .run(RunRequest::method("getTitle").with_app_mode(AppMode::Hybrid))
        .await
        .expect("run");

    let context = result.context.expect("context update");
    assert!(!context.supported);
    assert!(context.current.is_none());
    assert!(context.contexts.is_empty());
    // Nothing was switched.
    assert!(mock
        .requests_matching("/context")
        .into_iter()
        .all(|r| r.verb == Verb::Get));
}

// ============= Gesture properties =============

#[tokio::test]
async fn test_tap_gesture_translation() {
    let (inspector, mock) = android_inspector();

    inspector
        .run(
            RunRequest::method("tap")
                .with_args(vec![json!(50), json!(80)])
                .without_refresh(),
        )
        .await
        .expect("tap");

    let requests = mock.requests_matching("/actions");
    assert_eq!(requests.len(), 1);

    let actions = &requests[0].body.as_ref().unwrap()["actions"];
    let inputs = actions.as_array().unwrap();
    assert_eq!(inputs.len(), 1);

    let sequence = inputs[0]["actions"].as_array().unwrap();
    let kinds: Vec<&str> = sequence.iter().map(|a| a["type"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["pointerMove", "pointerDown", "pause", "pointerUp"]);
    assert_eq!(sequence[0]["x"], 50.0);
    assert_eq!(sequence[0]["y"], 80.0);
}

// ============= Search-miss vs search-error =============

#[tokio::test]
async fn test_single_search_miss_yields_empty_object() {
    let (inspector, _mock) = android_inspector();

    let result = inspector
        .run(RunRequest::search("xpath", "//nothing").without_refresh())
        .await
        .expect("miss is not an error");

    assert_eq!(result.command_result, Some(json!({})));
    assert!(result.element.is_none());
}

#[tokio::test]
async fn test_list_search_error_propagates() {
    let (inspector, mock) = android_inspector();
    mock.fail_http(Verb::Post, "/elements", "connection reset mid-flight");

    let err = inspector
        .run(
            RunRequest::search("xpath", "//any")
                .fetch_all()
                .without_refresh(),
        )
        .await
        .expect_err("transport error must propagate");
    assert!(matches!(err, Error::Http(_)));
}

#[tokio::test]
async fn test_single_search_transport_error_propagates() {
    // Only a genuine miss converts to the empty result; transport loss
    // keeps failing loudly.
    let (inspector, mock) = android_inspector();
    mock.fail_http(Verb::Post, "/element", "connection reset mid-flight");

    let err = inspector
        .run(RunRequest::search("xpath", "//any").without_refresh())
        .await
        .expect_err("transport error must propagate");
    assert!(matches!(err, Error::Http(_)));
}

// ============= Element dispatch through the cache =============

#[tokio::test]
async fn test_element_method_routes_through_cache() {
    let (inspector, mock) = android_inspector();
    mock.respond_value(Verb::Post, "/element", json!({ W3C_ELEMENT_KEY: "btn-1" }));

    inspector.fetch_element("xpath", "//btn").await.expect("fetch");

    let result = inspector
        .run(RunRequest::element_method("btn-1", "click").without_refresh())
        .await
        .expect("click");

    assert_eq!(result.element.unwrap().id, "btn-1");
    let clicks = mock.requests_matching("/element/btn-1/click");
    assert_eq!(clicks.len(), 1);
}

#[tokio::test]
async fn test_unknown_element_id_is_a_contract_violation() {
    let (inspector, _mock) = android_inspector();

    let err = inspector
        .run(RunRequest::element_method("never-fetched", "click"))
        .await
        .expect_err("not found");
    assert!(matches!(err, Error::ElementNotCached(_)));
}

// ============= Session lifecycle through the starter =============

#[tokio::test]
async fn test_created_session_drives_inspector() {
    let mock = Arc::new(MockTransport::new());
    let session = start_session_with(mock.clone(), json!({ "platformName": "Android" }))
        .await
        .expect("create");
    assert_eq!(session.id(), "mock-session");

    let inspector =
        Inspector::new(session).with_settle_delay(Duration::from_millis(0));
    let result = inspector.run(RunRequest::default()).await.expect("snapshot");

    assert!(result.screenshot.is_some());
    assert!(result.source.is_some());
    assert!(result.window_rect.is_some());
}

//! Session transport
//!
//! One `Session` per live inspection. Exposes the full generated command
//! surface through generic dispatch over the command registry, plus the
//! hand-implemented operations excluded from the generic path: global
//! element search and the two script-execution variants with their element
//! reference marshaling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Weak};
use tracing::debug;

use crate::protocol::tables::{CommandDef, Scope, Verb};
use crate::protocol::wire::{unwrap_response, ElementId};
use crate::protocol::CommandRegistry;
use crate::session::element::Element;
use crate::transport::Transport;
use crate::{Error, Result};

/// Negotiated session capabilities
#[derive(Debug, Clone)]
pub struct Capabilities(Value);

impl Capabilities {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Raw capability payload
    pub fn raw(&self) -> &Value {
        &self.0
    }

    fn string_cap(&self, name: &str) -> Option<String> {
        let obj = self.0.as_object()?;
        obj.get(name)
            .or_else(|| obj.get(&format!("appium:{}", name)))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Platform name, lowercased
    pub fn platform_name(&self) -> Option<String> {
        self.string_cap("platformName").map(|s| s.to_lowercase())
    }

    /// Automation engine name, lowercased
    pub fn automation_name(&self) -> Option<String> {
        self.string_cap("automationName").map(|s| s.to_lowercase())
    }

    /// Browser name, lowercased
    pub fn browser_name(&self) -> Option<String> {
        self.string_cap("browserName").map(|s| s.to_lowercase())
    }
}

/// Pixel rectangle, shared by window geometry and element geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Result of a script execution, with element references unwrapped
#[derive(Debug, Clone)]
pub enum ScriptOutcome {
    /// The script returned one element reference
    Element(Element),
    /// The script returned an array of element references
    Elements(Vec<Element>),
    /// Any other value, unmodified
    Value(Value),
}

/// Script execution variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptMode {
    Sync,
    Async,
}

/// Live session against the remote endpoint
#[derive(Debug)]
pub struct Session {
    id: String,
    capabilities: Capabilities,
    transport: Arc<dyn Transport>,
    registry: Arc<CommandRegistry>,
    w3c: bool,
    created_at: DateTime<Utc>,
    // Handed to element handles as their owner back-reference.
    self_ref: Weak<Session>,
}

impl Session {
    /// Create a session wrapper over an established remote session
    pub fn new(
        id: impl Into<String>,
        capabilities: Value,
        transport: Arc<dyn Transport>,
        w3c: bool,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            id: id.into(),
            capabilities: Capabilities::new(capabilities),
            transport,
            registry: Arc::new(CommandRegistry::standard()),
            w3c,
            created_at: Utc::now(),
            self_ref: self_ref.clone(),
        })
    }

    fn shared(&self) -> Result<Arc<Session>> {
        self.self_ref
            .upgrade()
            .ok_or_else(|| Error::internal("session was dropped"))
    }

    /// Session identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Negotiated capabilities
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Whether the session speaks the modern standard protocol
    pub fn is_w3c(&self) -> bool {
        self.w3c
    }

    /// When this wrapper was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Command registry backing the generated surface
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Underlying transport
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Execute a session-scoped command by name
    pub async fn execute(&self, name: &str, args: &[Value]) -> Result<Value> {
        let def = self
            .registry
            .get(name)
            .ok_or_else(|| Error::unknown_command(name))?;
        if def.scope != Scope::Session {
            return Err(Error::scope_mismatch(format!(
                "{} is element-scoped, invoke it through an element handle",
                name
            )));
        }
        self.dispatch(def, None, args).await
    }

    /// Execute an element-scoped command against the given element reference
    pub async fn execute_for_element(
        &self,
        element: &ElementId,
        name: &str,
        args: &[Value],
    ) -> Result<Value> {
        let def = self
            .registry
            .get(name)
            .ok_or_else(|| Error::unknown_command(name))?;
        if def.scope != Scope::Element {
            return Err(Error::scope_mismatch(format!(
                "{} is session-scoped, it takes no element reference",
                name
            )));
        }
        self.dispatch(def, Some(element), args).await
    }

    async fn dispatch(
        &self,
        def: &CommandDef,
        element: Option<&ElementId>,
        args: &[Value],
    ) -> Result<Value> {
        let (path, body) = self.build_route(def, element, args)?;
        debug!("dispatching {} as {} {}", def.name, def.verb.as_str(), path);
        let raw = self.transport.send(def.verb, &path, body).await?;
        unwrap_response(raw)
    }

    /// Fill the command's URI template and body from positional arguments
    ///
    /// `:sessionId` and `:elementId` come from the session; any other
    /// placeholder consumes leading arguments, and the remainder are zipped
    /// with the declared parameter names into the POST body.
    fn build_route(
        &self,
        def: &CommandDef,
        element: Option<&ElementId>,
        args: &[Value],
    ) -> Result<(String, Option<Value>)> {
        let mut remaining = args.iter();
        let mut segments = Vec::new();

        for segment in def.path.split('/') {
            if segment == ":sessionId" {
                segments.push(self.id.clone());
            } else if segment == ":elementId" {
                let id = element.ok_or_else(|| {
                    Error::internal(format!("{} routed without an element reference", def.name))
                })?;
                segments.push(id.as_str().to_string());
            } else if let Some(name) = segment.strip_prefix(':') {
                let arg = remaining.next().ok_or_else(|| {
                    Error::configuration(format!("{} requires a {} argument", def.name, name))
                })?;
                segments.push(match arg {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
            } else {
                segments.push(segment.to_string());
            }
        }

        let body = match def.verb {
            Verb::Post => {
                let mut map = serde_json::Map::new();
                for (param, value) in def.params.iter().zip(remaining) {
                    map.insert(param.to_string(), value.clone());
                }
                Some(Value::Object(map))
            }
            Verb::Get | Verb::Delete => None,
        };

        Ok((segments.join("/"), body))
    }

    /// Find one element globally; the match is owned by this session
    pub async fn find_element(&self, using: &str, value: &str) -> Result<Element> {
        let owner = self.shared()?;
        let raw = self
            .transport
            .send(
                Verb::Post,
                &format!("/session/{}/element", self.id),
                Some(json!({ "using": using, "value": value })),
            )
            .await?;
        let payload = unwrap_response(raw)?;
        let id = ElementId::from_value(&payload)
            .ok_or_else(|| Error::internal("search result carried no element reference"))?;
        Ok(Element::root(id, owner))
    }

    /// Find all matching elements globally
    pub async fn find_elements(&self, using: &str, value: &str) -> Result<Vec<Element>> {
        let owner = self.shared()?;
        let raw = self
            .transport
            .send(
                Verb::Post,
                &format!("/session/{}/elements", self.id),
                Some(json!({ "using": using, "value": value })),
            )
            .await?;
        let payload = unwrap_response(raw)?;
        let items = payload
            .as_array()
            .ok_or_else(|| Error::internal("list search result was not an array"))?;

        let mut elements = Vec::with_capacity(items.len());
        for item in items {
            let id = ElementId::from_value(item)
                .ok_or_else(|| Error::internal("list search entry carried no element reference"))?;
            elements.push(Element::root(id, Arc::clone(&owner)));
        }
        Ok(elements)
    }

    /// Execute a script in the remote end
    ///
    /// Element references inside the arguments are replaced by their bare
    /// reference objects before transmission; element-shaped values in the
    /// result are wrapped back into handles owned by this session.
    pub async fn execute_script(
        &self,
        script: &str,
        args: &[Value],
        mode: ScriptMode,
    ) -> Result<ScriptOutcome> {
        let owner = self.shared()?;
        let marshaled: Vec<Value> = args.iter().map(marshal_script_arg).collect();

        let path = match (self.w3c, mode) {
            (true, ScriptMode::Sync) => format!("/session/{}/execute/sync", self.id),
            (true, ScriptMode::Async) => format!("/session/{}/execute/async", self.id),
            (false, ScriptMode::Sync) => format!("/session/{}/execute", self.id),
            (false, ScriptMode::Async) => format!("/session/{}/execute_async", self.id),
        };

        let raw = self
            .transport
            .send(
                Verb::Post,
                &path,
                Some(json!({ "script": script, "args": marshaled })),
            )
            .await?;
        let payload = unwrap_response(raw)?;
        Ok(wrap_script_result(&owner, payload))
    }

    /// Delete the remote session
    pub async fn delete(&self) -> Result<()> {
        let raw = self
            .transport
            .send(Verb::Delete, &format!("/session/{}", self.id), None)
            .await?;
        unwrap_response(raw)?;
        Ok(())
    }

    // Typed wrappers over the generated surface, used by the orchestrator.

    /// Base64 screenshot of the native screen
    pub async fn take_screenshot(&self) -> Result<String> {
        let value = self.execute("takeScreenshot", &[]).await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::internal("screenshot response was not a string"))
    }

    /// Page source of the current context
    pub async fn page_source(&self) -> Result<String> {
        let value = self.execute("getPageSource", &[]).await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::internal("page source response was not a string"))
    }

    /// Window geometry
    pub async fn window_rect(&self) -> Result<Rect> {
        let value = self.execute("getWindowRect", &[]).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Raw context enumeration payload
    pub async fn contexts(&self) -> Result<Value> {
        self.execute("getContexts", &[]).await
    }

    /// Currently selected context
    pub async fn current_context(&self) -> Result<String> {
        let value = self.execute("getCurrentContext", &[]).await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::internal("context response was not a string"))
    }

    /// Switch the current context
    pub async fn set_context(&self, name: &str) -> Result<()> {
        self.execute("setContext", &[json!(name)]).await?;
        Ok(())
    }

    /// Device orientation
    pub async fn orientation(&self) -> Result<String> {
        let value = self.execute("getOrientation", &[]).await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::internal("orientation response was not a string"))
    }

    /// Device system bar geometry
    pub async fn system_bars(&self) -> Result<Value> {
        self.execute("getSystemBars", &[]).await
    }

    /// Raw session detail payload
    pub async fn session_details(&self) -> Result<Value> {
        self.execute("getSession", &[]).await
    }

    /// Perform a low-level pointer action sequence
    pub async fn perform_actions(&self, actions: Value) -> Result<Value> {
        self.execute("performActions", &[actions]).await
    }
}

/// Wrap element-shaped script results into handles owned by the session
fn wrap_script_result(owner: &Arc<Session>, payload: Value) -> ScriptOutcome {
    if let Some(id) = ElementId::from_value(&payload) {
        return ScriptOutcome::Element(Element::root(id, Arc::clone(owner)));
    }
    if let Some(items) = payload.as_array() {
        if !items.is_empty() && items.iter().all(ElementId::is_element_value) {
            let elements = items
                .iter()
                .filter_map(ElementId::from_value)
                .map(|id| Element::root(id, Arc::clone(owner)))
                .collect();
            return ScriptOutcome::Elements(elements);
        }
    }
    ScriptOutcome::Value(payload)
}

/// Replace element references embedded in a script argument with their bare
/// reference objects
fn marshal_script_arg(value: &Value) -> Value {
    if let Some(id) = ElementId::from_value(value) {
        return id.to_wire();
    }
    match value {
        Value::Array(items) => Value::Array(items.iter().map(marshal_script_arg).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), marshal_script_arg(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire::{LEGACY_ELEMENT_KEY, W3C_ELEMENT_KEY};
    use crate::transport::MockTransport;

    fn test_session() -> (Arc<Session>, Arc<MockTransport>) {
        let mock = Arc::new(MockTransport::new());
        let session = Session::new(
            "s-1",
            json!({ "platformName": "Android", "appium:automationName": "UiAutomator2" }),
            mock.clone(),
            true,
        );
        (session, mock)
    }

    #[tokio::test]
    async fn test_execute_builds_route_and_body() {
        let (session, mock) = test_session();
        session
            .execute("navigateTo", &[json!("http://x.test")])
            .await
            .expect("navigate");

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/session/s-1/url");
        assert_eq!(requests[0].body.as_ref().unwrap()["url"], "http://x.test");
    }

    #[tokio::test]
    async fn test_execute_fills_extra_path_placeholder() {
        let (session, mock) = test_session();
        let cached = session.registry().get("getNamedCookie").unwrap();
        assert_eq!(cached.path, "/session/:sessionId/cookie/:name");

        session
            .execute("getNamedCookie", &[json!("token")])
            .await
            .expect("cookie");

        let requests = mock.requests();
        assert_eq!(requests[0].path, "/session/s-1/cookie/token");
    }

    #[tokio::test]
    async fn test_execute_rejects_element_scoped_name() {
        let (session, _mock) = test_session();
        let err = session.execute("click", &[]).await.expect_err("scope");
        assert!(matches!(err, Error::ScopeMismatch(_)));
    }

    #[tokio::test]
    async fn test_execute_rejects_unknown_command() {
        let (session, _mock) = test_session();
        let err = session.execute("teleport", &[]).await.expect_err("unknown");
        assert!(matches!(err, Error::UnknownCommand(_)));
    }

    #[tokio::test]
    async fn test_find_element_normalizes_either_key() {
        let (session, mock) = test_session();
        mock.respond_value(
            Verb::Post,
            "/element",
            json!({ LEGACY_ELEMENT_KEY: "legacy-el" }),
        );

        let element = session.find_element("xpath", "//x").await.expect("element");
        assert_eq!(element.id().as_str(), "legacy-el");
    }

    #[tokio::test]
    async fn test_script_args_are_marshaled() {
        let (session, mock) = test_session();
        let element = Element::root(ElementId::new("e-9"), Arc::clone(&session));

        session
            .execute_script(
                "return arguments[0];",
                &[element.id().to_wire(), json!(5)],
                ScriptMode::Sync,
            )
            .await
            .expect("script");

        let requests = mock.requests_matching("/execute/sync");
        assert_eq!(requests.len(), 1);
        let args = &requests[0].body.as_ref().unwrap()["args"];
        assert_eq!(args[0][W3C_ELEMENT_KEY], "e-9");
        assert_eq!(args[0][LEGACY_ELEMENT_KEY], "e-9");
        assert_eq!(args[1], 5);
    }

    #[tokio::test]
    async fn test_script_result_element_is_wrapped() {
        let (session, mock) = test_session();
        mock.respond_value(
            Verb::Post,
            "/execute/sync",
            json!({ W3C_ELEMENT_KEY: "from-script" }),
        );

        let outcome = session
            .execute_script("return document.body;", &[], ScriptMode::Sync)
            .await
            .expect("script");

        match outcome {
            ScriptOutcome::Element(element) => assert_eq!(element.id().as_str(), "from-script"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_capability_accessors() {
        let (session, _mock) = test_session();
        assert_eq!(session.capabilities().platform_name().as_deref(), Some("android"));
        assert_eq!(
            session.capabilities().automation_name().as_deref(),
            Some("uiautomator2")
        );
        assert!(session.capabilities().browser_name().is_none());
    }
}

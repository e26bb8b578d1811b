//! Element handle
//!
//! Wraps one opaque element reference returned by the remote end. The owner
//! back-reference (session, or parent element for nested finds) is routing
//! data only; the remote end stays the authority on element validity.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::protocol::tables::Verb;
use crate::protocol::wire::{unwrap_response, ElementId};
use crate::session::session::{Rect, Session};
use crate::{Error, Result};

/// Owner of an element handle
#[derive(Debug, Clone)]
pub enum Owner {
    /// Fetched by a global search
    Session(Arc<Session>),
    /// Fetched by searching within another element
    Element(Arc<Element>),
}

/// Handle to one remote element
#[derive(Debug, Clone)]
pub struct Element {
    id: ElementId,
    owner: Owner,
}

impl Element {
    /// Wrap an element owned directly by the session
    pub fn root(id: ElementId, session: Arc<Session>) -> Self {
        Self {
            id,
            owner: Owner::Session(session),
        }
    }

    /// Wrap an element found within a parent element
    pub fn nested(id: ElementId, parent: Arc<Element>) -> Self {
        Self {
            id,
            owner: Owner::Element(parent),
        }
    }

    /// The normalized element identifier
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// The immediate owner of this handle
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// The session every command ultimately routes through
    pub fn session(&self) -> &Arc<Session> {
        let mut owner = &self.owner;
        loop {
            match owner {
                Owner::Session(session) => return session,
                Owner::Element(parent) => owner = &parent.owner,
            }
        }
    }

    /// Execute an element-scoped command with this element's reference
    /// attached
    pub async fn execute(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.session().execute_for_element(&self.id, name, args).await
    }

    /// Find one element within this element
    pub async fn find(&self, using: &str, value: &str) -> Result<Element> {
        let session = self.session();
        let raw = session
            .transport()
            .send(
                Verb::Post,
                &format!("/session/{}/element/{}/element", session.id(), self.id),
                Some(json!({ "using": using, "value": value })),
            )
            .await?;
        let payload = unwrap_response(raw)?;
        let id = ElementId::from_value(&payload)
            .ok_or_else(|| Error::internal("nested search result carried no element reference"))?;
        Ok(Element::nested(id, Arc::new(self.clone())))
    }

    /// Find all matching elements within this element
    pub async fn find_all(&self, using: &str, value: &str) -> Result<Vec<Element>> {
        let session = self.session();
        let raw = session
            .transport()
            .send(
                Verb::Post,
                &format!("/session/{}/element/{}/elements", session.id(), self.id),
                Some(json!({ "using": using, "value": value })),
            )
            .await?;
        let payload = unwrap_response(raw)?;
        let items = payload
            .as_array()
            .ok_or_else(|| Error::internal("nested list search result was not an array"))?;

        let parent = Arc::new(self.clone());
        let mut elements = Vec::with_capacity(items.len());
        for item in items {
            let id = ElementId::from_value(item).ok_or_else(|| {
                Error::internal("nested list search entry carried no element reference")
            })?;
            elements.push(Element::nested(id, Arc::clone(&parent)));
        }
        Ok(elements)
    }

    /// Element geometry in the current context's coordinate space
    pub async fn rect(&self) -> Result<Rect> {
        let value = self.execute("getElementRect", &[]).await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire::W3C_ELEMENT_KEY;
    use crate::transport::MockTransport;

    fn test_session() -> (Arc<Session>, Arc<MockTransport>) {
        let mock = Arc::new(MockTransport::new());
        let session = Session::new("s-1", json!({ "platformName": "iOS" }), mock.clone(), true);
        (session, mock)
    }

    #[tokio::test]
    async fn test_element_command_routes_with_reference() {
        let (session, mock) = test_session();
        let element = Element::root(ElementId::new("e-1"), Arc::clone(&session));

        mock.respond_value(Verb::Post, "/click", json!(null));
        element.execute("click", &[]).await.expect("click");

        let requests = mock.requests();
        assert_eq!(requests[0].path, "/session/s-1/element/e-1/click");
    }

    #[tokio::test]
    async fn test_nested_find_is_scoped_to_parent() {
        let (session, mock) = test_session();
        let parent = Element::root(ElementId::new("parent"), Arc::clone(&session));

        mock.respond_value(
            Verb::Post,
            "/element/parent/element",
            json!({ W3C_ELEMENT_KEY: "child" }),
        );

        let child = parent.find("xpath", ".//x").await.expect("child");
        assert_eq!(child.id().as_str(), "child");
        assert!(matches!(child.owner(), Owner::Element(_)));
        assert_eq!(child.session().id(), "s-1");

        let requests = mock.requests();
        assert_eq!(requests[0].path, "/session/s-1/element/parent/element");
    }

    #[tokio::test]
    async fn test_nested_find_all_returns_children_of_parent() {
        let (session, mock) = test_session();
        let parent = Element::root(ElementId::new("parent"), Arc::clone(&session));

        mock.respond_value(
            Verb::Post,
            "/element/parent/elements",
            json!([{ W3C_ELEMENT_KEY: "a" }, { W3C_ELEMENT_KEY: "b" }]),
        );

        let children = parent.find_all("xpath", ".//x").await.expect("children");
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| matches!(c.owner(), Owner::Element(_))));
    }

    #[tokio::test]
    async fn test_rect_parses_geometry() {
        let (session, mock) = test_session();
        let element = Element::root(ElementId::new("e-1"), Arc::clone(&session));

        mock.respond_value(
            Verb::Get,
            "/rect",
            json!({ "x": 10.0, "y": 40.0, "width": 5.0, "height": 5.0 }),
        );

        let rect = element.rect().await.expect("rect");
        assert_eq!(rect.x, 10.0);
        assert_eq!(rect.y, 40.0);
    }
}

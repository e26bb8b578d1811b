//! Session layer
//!
//! Owns the live connection to the remote end: the session transport with
//! its generated command surface, element handles, and the create/attach
//! entry points.

pub mod element;
pub mod session;
pub mod starter;

pub use element::Element;
pub use session::{Capabilities, Rect, ScriptMode, ScriptOutcome, Session};
pub use starter::{attach_to_session, attach_with, start_session, start_session_with};

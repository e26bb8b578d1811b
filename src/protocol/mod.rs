//! Remote protocol definitions
//!
//! Static command tables for the layered protocol generations, the
//! first-definition-wins registry built from them, and wire-format
//! normalization for responses and element references.

pub mod registry;
pub mod tables;
pub mod wire;

pub use registry::CommandRegistry;
pub use tables::{CommandDef, Scope, Verb, EXCLUDED_COMMANDS, PROTOCOL_TABLES};
pub use wire::{unwrap_response, ElementId, WireResponse};

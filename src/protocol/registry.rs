//! Command registry
//!
//! Merges the layered protocol tables into one immutable lookup map at
//! session creation. First definition wins on duplicate names, excluded
//! commands are skipped, and the result partitions into disjoint
//! session-scoped and element-scoped sets.

use std::collections::HashMap;

use crate::protocol::tables::{CommandDef, Scope, EXCLUDED_COMMANDS, PROTOCOL_TABLES};

/// Immutable command lookup built from the protocol tables
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, &'static CommandDef>,
}

impl CommandRegistry {
    /// Build a registry from an explicit ordered list of tables
    pub fn from_tables(tables: &[&'static [CommandDef]]) -> Self {
        let mut commands: HashMap<&'static str, &'static CommandDef> = HashMap::new();

        for table in tables {
            for def in *table {
                if EXCLUDED_COMMANDS.contains(def.name) {
                    continue;
                }
                // First definition wins across overlapping protocol generations.
                commands.entry(def.name).or_insert(def);
            }
        }

        Self { commands }
    }

    /// Build the standard registry from all layered protocol tables
    pub fn standard() -> Self {
        Self::from_tables(PROTOCOL_TABLES)
    }

    /// Look up a command by name
    pub fn get(&self, name: &str) -> Option<&'static CommandDef> {
        self.commands.get(name).copied()
    }

    /// Whether a command is installed at all
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Installed session-scoped command names
    pub fn session_commands(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands
            .values()
            .filter(|d| d.scope == Scope::Session)
            .map(|d| d.name)
    }

    /// Installed element-scoped command names
    pub fn element_commands(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands
            .values()
            .filter(|d| d.scope == Scope::Element)
            .map(|d| d.name)
    }

    /// Number of installed commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::tables::Verb;
    use std::collections::HashSet;

    #[test]
    fn test_standard_registry_excludes_special_commands() {
        let registry = CommandRegistry::standard();

        for name in [
            "newSession",
            "deleteSession",
            "findElement",
            "findElements",
            "findElementFromElement",
            "findElementsFromElement",
            "executeScript",
            "executeAsyncScript",
        ] {
            assert!(!registry.contains(name), "{} should not be installed", name);
        }
    }

    #[test]
    fn test_scope_partition_is_disjoint_and_complete() {
        let registry = CommandRegistry::standard();

        let session: HashSet<&str> = registry.session_commands().collect();
        let element: HashSet<&str> = registry.element_commands().collect();

        assert!(session.is_disjoint(&element));
        assert_eq!(session.len() + element.len(), registry.len());

        // Every declared, non-excluded name is installed on exactly one side.
        for table in PROTOCOL_TABLES {
            for def in *table {
                if EXCLUDED_COMMANDS.contains(def.name) {
                    continue;
                }
                assert!(
                    session.contains(def.name) ^ element.contains(def.name),
                    "{} must be installed on exactly one of session/element",
                    def.name
                );
            }
        }
    }

    #[test]
    fn test_first_definition_wins_on_real_tables() {
        let registry = CommandRegistry::standard();

        // getPageSource is declared by both the legacy and the W3C table;
        // the legacy definition comes first and must win.
        let def = registry.get("getPageSource").expect("getPageSource installed");
        assert_eq!(def.path, "/session/:sessionId/source");

        // getWindowHandle exists only in the W3C table.
        let def = registry.get("getWindowHandle").expect("getWindowHandle installed");
        assert_eq!(def.path, "/session/:sessionId/window");
    }

    #[test]
    fn test_first_definition_wins_classification() {
        // Two synthetic layers declaring the same name with divergent
        // classification: the earlier layer's scope must be the one installed.
        static EARLY: &[CommandDef] = &[CommandDef {
            name: "poke",
            scope: Scope::Element,
            verb: Verb::Post,
            path: "/session/:sessionId/element/:elementId/poke",
            params: &[],
        }];
        static LATE: &[CommandDef] = &[CommandDef {
            name: "poke",
            scope: Scope::Session,
            verb: Verb::Post,
            path: "/session/:sessionId/poke",
            params: &[],
        }];

        let registry = CommandRegistry::from_tables(&[EARLY, LATE]);
        let def = registry.get("poke").expect("poke installed");
        assert_eq!(def.scope, Scope::Element);
        assert_eq!(def.path, "/session/:sessionId/element/:elementId/poke");
    }

    #[test]
    fn test_lookup_miss() {
        let registry = CommandRegistry::standard();
        assert!(registry.get("noSuchCommand").is_none());
    }
}

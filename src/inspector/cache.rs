//! Element cache
//!
//! Keyed by the remote element identifier. Entries accumulate for the
//! lifetime of the session and are never evicted individually; the whole
//! cache is discarded on teardown.

use std::collections::HashMap;

use crate::inspector::types::ElementMeta;
use crate::session::Element;

/// One cached element with its code-generation metadata
#[derive(Debug, Clone)]
pub struct CachedElement {
    pub element: Element,
    pub variable_name: Option<String>,
    pub variable_index: Option<usize>,
    pub strategy: String,
    pub selector: String,
}

impl CachedElement {
    /// Result-record view of this entry
    pub fn meta(&self) -> ElementMeta {
        ElementMeta {
            id: self.element.id().as_str().to_string(),
            variable_name: self.variable_name.clone(),
            variable_index: self.variable_index,
            strategy: self.strategy.clone(),
            selector: self.selector.clone(),
        }
    }
}

/// Session-lifetime element cache
#[derive(Debug, Default)]
pub struct ElementCache {
    entries: HashMap<String, CachedElement>,
    group_counter: usize,
}

impl ElementCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry unless the identifier is already cached
    ///
    /// A given identifier maps to at most one entry; re-fetching the
    /// identical element does not duplicate or overwrite it.
    pub fn insert_if_absent(&mut self, entry: CachedElement) -> bool {
        let id = entry.element.id().as_str().to_string();
        match self.entries.entry(id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    /// Look up an entry by element identifier
    pub fn get(&self, id: &str) -> Option<&CachedElement> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Allocate the next sequential array-group name
    pub fn next_group_name(&mut self) -> String {
        self.group_counter += 1;
        format!("els{}", self.group_counter)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discard every entry; only called on session teardown
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire::ElementId;
    use crate::session::Session;
    use crate::transport::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn entry(id: &str) -> CachedElement {
        let session = Session::new("s-1", json!({}), Arc::new(MockTransport::new()), true);
        CachedElement {
            element: Element::root(ElementId::new(id), session),
            variable_name: None,
            variable_index: None,
            strategy: "xpath".to_string(),
            selector: "//x".to_string(),
        }
    }

    #[test]
    fn test_insert_is_idempotent_per_identifier() {
        let mut cache = ElementCache::new();
        assert!(cache.insert_if_absent(entry("e-1")));
        assert!(!cache.insert_if_absent(entry("e-1")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_identifiers_get_distinct_entries() {
        let mut cache = ElementCache::new();
        cache.insert_if_absent(entry("e-1"));
        cache.insert_if_absent(entry("e-2"));
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("e-1"));
        assert!(cache.contains("e-2"));
    }

    #[test]
    fn test_group_names_are_sequential() {
        let mut cache = ElementCache::new();
        assert_eq!(cache.next_group_name(), "els1");
        assert_eq!(cache.next_group_name(), "els2");
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut cache = ElementCache::new();
        cache.insert_if_absent(entry("e-1"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("e-1").is_none());
    }
}

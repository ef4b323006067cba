//! # Type Registry
//!
//! Declares node kinds and acts as the node factory. Recognition walks kinds
//! from the most recently added one, so a later registration can take over a
//! tag from an earlier kind.

use crate::kind::Kind;
use crate::kinds::{self, CORE_KIND};
use indexmap::IndexMap;
use mailframe_model::{NodeId, NodeTree};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TypeRegistry {
    kinds: IndexMap<String, Kind>,
}

impl TypeRegistry {
    /// Registry holding only the fallback kind
    pub fn new() -> Self {
        let mut registry = Self {
            kinds: IndexMap::new(),
        };
        registry.add_type(kinds::core());
        registry
    }

    /// Fallback kind plus the built-in social and divider kinds
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();
        registry.add_type(kinds::social());
        registry.add_type(kinds::divider());
        registry
    }

    /// Register `kind`, replacing an existing kind of the same name
    pub fn add_type(&mut self, kind: Kind) {
        debug!(kind = %kind.name, tag = ?kind.tag, "Registering kind");
        self.kinds.shift_remove(&kind.name);
        self.kinds.insert(kind.name.clone(), kind);
    }

    pub fn get(&self, name: &str) -> Option<&Kind> {
        self.kinds.get(name)
    }

    pub fn core(&self) -> &Kind {
        self.kinds
            .get(CORE_KIND)
            .or_else(|| self.kinds.values().next())
            .unwrap_or_else(|| unreachable!("registry always holds the fallback kind"))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// Kind claiming a foreign element with `tag`, if any
    pub fn is_component(&self, tag: &str) -> Option<&Kind> {
        self.kinds.values().rev().find(|k| k.is_component(tag))
    }

    /// Recognized kind for `tag`, or the fallback kind
    pub fn resolve(&self, tag: &str) -> &Kind {
        self.is_component(tag).unwrap_or_else(|| self.core())
    }

    /// Factory: a fresh node for `tag`, built from its kind's defaults
    pub fn create(&self, tree: &mut NodeTree, tag: &str) -> NodeId {
        let kind = self.resolve(tag);
        tree.create(kind.node_init(tag))
    }

    /// Kind metadata for the host's trait/style panels
    pub fn describe(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.kinds
                .iter()
                .map(|(name, kind)| {
                    let value = serde_json::to_value(kind).unwrap_or(serde_json::Value::Null);
                    (name.clone(), value)
                })
                .collect(),
        )
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtin_kinds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Kind;
    use mailframe_model::to_markup;

    #[test]
    fn test_recognizer_is_case_insensitive() {
        let registry = TypeRegistry::with_builtin_kinds();
        assert_eq!(registry.is_component("MJ-SOCIAL").unwrap().name, "mj-social");
        assert_eq!(registry.is_component("mj-divider").unwrap().name, "mj-divider");
        assert!(registry.is_component("mj-section").is_none());
    }

    #[test]
    fn test_unknown_tags_fall_back_to_core() {
        let registry = TypeRegistry::with_builtin_kinds();
        let mut tree = NodeTree::new();
        let id = registry.create(&mut tree, "mj-section");
        let node = tree.get(id).unwrap();
        assert_eq!(node.kind(), CORE_KIND);
        assert_eq!(node.tag(), "mj-section");
    }

    #[test]
    fn test_later_registration_wins() {
        let mut registry = TypeRegistry::with_builtin_kinds();
        let mut custom = Kind::new("fancy-divider");
        custom.tag = Some("mj-divider".to_string());
        registry.add_type(custom);
        assert_eq!(registry.resolve("mj-divider").name, "fancy-divider");
    }

    #[test]
    fn test_factory_applies_defaults() {
        let registry = TypeRegistry::with_builtin_kinds();
        let mut tree = NodeTree::new();
        let social = registry.create(&mut tree, "mj-social");
        let node = tree.get(social).unwrap();
        assert!(node.is_void());
        assert_eq!(node.attribute("icon-size"), Some("20px"));
        assert_eq!(node.meta().traits.len(), 14);
        assert_eq!(to_markup(&tree, social).unwrap(), "<mj-social/>");
    }

    #[test]
    fn test_describe_exposes_metadata() {
        let registry = TypeRegistry::with_builtin_kinds();
        let described = registry.describe();
        assert_eq!(described["mj-divider"]["defaults"]["customName"], "Divider");
        assert_eq!(described["mj-divider"]["defaults"]["droppable"], false);
        assert_eq!(described["mj-social"]["template"]["childrenSelector"], "img");
        assert_eq!(described["core"]["viewTag"], "div");
    }
}

//! # Kinds
//!
//! A kind is plain data layered onto the one generic render algorithm: its
//! defaults, the view element it mounts into, and the compilation overrides
//! (skeleton depth, extraction path, children container).

use mailframe_bridge::KindTemplate;
use mailframe_model::{AttrMap, KindMeta, NodeInit};
use serde::Serialize;

/// How imported inner markup maps onto the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentPolicy {
    /// Element children become child nodes, text becomes content
    #[default]
    Children,
    /// Inner markup is kept verbatim as content
    Literal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindDefaults {
    pub attributes: AttrMap,
    pub style: AttrMap,
    pub void: bool,
    #[serde(flatten)]
    pub meta: KindMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kind {
    pub name: String,
    /// Markup tag this kind recognizes; `None` for the fallback kind, which
    /// keeps whatever tag it is instantiated with
    pub tag: Option<String>,
    /// Element the view mounts into
    pub view_tag: String,
    /// Style declaration reapplied on the view element after every mount
    pub view_style: String,
    pub defaults: KindDefaults,
    pub template: KindTemplate,
    pub content: ContentPolicy,
}

impl Kind {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            tag: Some(name.clone()),
            name,
            view_tag: "div".to_string(),
            view_style: String::new(),
            defaults: KindDefaults::default(),
            template: KindTemplate::default(),
            content: ContentPolicy::Children,
        }
    }

    /// Import recognizer: does a foreign element with `tag` belong to this kind
    pub fn is_component(&self, tag: &str) -> bool {
        self.tag
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(tag))
    }

    /// Construction parameters for a fresh node of this kind
    pub fn node_init(&self, tag: &str) -> NodeInit {
        NodeInit {
            kind: self.name.clone(),
            tag: self.tag.clone().unwrap_or_else(|| tag.to_string()),
            attributes: self.defaults.attributes.clone(),
            style: self.defaults.style.clone(),
            content: String::new(),
            src: None,
            void: self.defaults.void,
            meta: self.defaults.meta.clone(),
        }
    }
}

/// Build an [`AttrMap`] from literal pairs
pub fn attr_map(pairs: &[(&str, &str)]) -> AttrMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

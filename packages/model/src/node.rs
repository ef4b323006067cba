use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered attribute/style mapping
pub type AttrMap = IndexMap<String, String>;

/// Handle to a node in a [`crate::NodeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Drag/drop predicate: either a flat yes/no or a selector the host evaluates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Predicate {
    Flag(bool),
    Selector(String),
}

impl Default for Predicate {
    fn default() -> Self {
        Predicate::Flag(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitOption {
    pub value: String,
    pub name: String,
}

/// Trait-panel descriptor, carried for the host editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitDescriptor {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<TraitOption>,
}

impl TraitDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: None,
            label: None,
            value: None,
            options: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: &[(&str, &str)],
    ) -> Self {
        Self {
            name: name.into(),
            input: Some("select".to_string()),
            label: Some(label.into()),
            value: None,
            options: options
                .iter()
                .map(|(value, name)| TraitOption {
                    value: value.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        }
    }
}

/// Kind metadata consumed by the host editor (drag rules, style panel, traits)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    pub draggable: Predicate,
    pub droppable: Predicate,
    #[serde(default)]
    pub stylable: Vec<String>,
    #[serde(default)]
    pub traits: Vec<TraitDescriptor>,
}

/// Everything needed to construct a node
#[derive(Debug, Clone, Default)]
pub struct NodeInit {
    pub kind: String,
    pub tag: String,
    pub attributes: AttrMap,
    pub style: AttrMap,
    pub content: String,
    pub src: Option<String>,
    pub void: bool,
    pub meta: KindMeta,
}

/// A node of the editable tree
///
/// Fields are read through accessors; every mutation goes through
/// [`crate::NodeTree`] so change events are published.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) kind: String,
    pub(crate) tag: String,
    pub(crate) attributes: AttrMap,
    pub(crate) style: AttrMap,
    pub(crate) default_style: AttrMap,
    pub(crate) content: String,
    pub(crate) src: Option<String>,
    pub(crate) void: bool,
    pub(crate) meta: KindMeta,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &AttrMap {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn style(&self) -> &AttrMap {
        &self.style
    }

    /// Style snapshot taken at construction, before any edit
    pub fn default_style(&self) -> &AttrMap {
        &self.default_style
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn is_void(&self) -> bool {
        self.void
    }

    pub fn meta(&self) -> &KindMeta {
        &self.meta
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_serializes_for_trait_panel() {
        let meta = KindMeta {
            custom_name: Some("Divider".to_string()),
            draggable: Predicate::Selector("[data-type=mj-column]".to_string()),
            droppable: Predicate::Flag(false),
            stylable: vec!["width".to_string()],
            traits: vec![
                TraitDescriptor::named("facebook-content").with_value("Share"),
                TraitDescriptor::select("mode", "Mode", &[("horizontal", "Horizontal")]),
            ],
        };

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["customName"], "Divider");
        assert_eq!(json["draggable"], "[data-type=mj-column]");
        assert_eq!(json["droppable"], false);
        assert_eq!(json["traits"][0]["value"], "Share");
        assert_eq!(json["traits"][1]["type"], "select");
        assert_eq!(json["traits"][1]["options"][0]["name"], "Horizontal");
    }
}

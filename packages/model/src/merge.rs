//! # Style/Attribute Merge Controller
//!
//! Keeps `attributes` a superset of `style` (style wins conflicts) and owns the
//! defaulting/diffing rules shared by the compiler anchor and markup export.

use crate::node::{AttrMap, Node};

/// Keys that never reach markup output
const INTERNAL_KEYS: &[&str] = &["style"];

pub struct MergeController;

impl MergeController {
    /// `attributes ∪ style`, style winning on conflicts
    pub fn merged(attributes: &AttrMap, style: &AttrMap) -> AttrMap {
        let mut out = attributes.clone();
        for (key, value) in style {
            out.insert(key.clone(), value.clone());
        }
        out
    }

    /// Construction step: snapshot the default style, then make both maps the
    /// merged set
    pub(crate) fn init(node: &mut Node) {
        node.default_style = node.style.clone();
        let merged = Self::merged(&node.attributes, &node.style);
        node.style = merged.clone();
        node.attributes = merged;
    }

    /// Re-derive attributes after a style write; returns whether they changed
    pub(crate) fn handle_style_change(node: &mut Node) -> bool {
        let merged = Self::merged(&node.attributes, &node.style);
        if merged == node.attributes {
            return false;
        }
        node.attributes = merged;
        true
    }

    /// Attributes handed to the compiler anchor: internal keys dropped, empty
    /// values dropped, `src` promoted from the dedicated field
    pub fn compiler_attributes(node: &Node) -> AttrMap {
        let mut attrs: AttrMap = node
            .attributes
            .iter()
            .filter(|(k, v)| !is_internal(k) && !v.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(src) = node.src.as_deref().filter(|s| !s.is_empty()) {
            attrs.insert("src".to_string(), src.to_string());
        }
        attrs
    }

    /// Attributes worth exporting: those that differ from the default style
    pub fn non_default_attributes(node: &Node) -> AttrMap {
        node.attributes
            .iter()
            .filter(|(k, v)| {
                !is_internal(k) && node.default_style.get(k.as_str()) != Some(*v)
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

fn is_internal(key: &str) -> bool {
    INTERNAL_KEYS.contains(&key)
}

//! Canonical markup export
//!
//! Produces the markup-dialect source of a subtree without going through the
//! compiler. Attributes equal to the kind's default style are dropped so
//! exported markup only carries what the user actually changed.

use crate::error::ModelResult;
use crate::merge::MergeController;
use crate::node::NodeId;
use crate::tree::NodeTree;
use std::fmt::Write;

/// Serialize `id` and its subtree to markup
///
/// Void nodes are written as `<tag/>`; their content and children are never
/// emitted.
pub fn to_markup(tree: &NodeTree, id: NodeId) -> ModelResult<String> {
    let mut out = String::new();
    write_node(tree, id, &mut out)?;
    Ok(out)
}

fn write_node(tree: &NodeTree, id: NodeId, out: &mut String) -> ModelResult<()> {
    let node = tree.get(id)?;
    let tag = node.tag();

    out.push('<');
    out.push_str(tag);
    for (name, value) in MergeController::non_default_attributes(node) {
        if !value.is_empty() {
            let _ = write!(out, " {}=\"{}\"", name, escape_attribute(&value));
        }
    }

    if node.is_void() {
        out.push_str("/>");
        return Ok(());
    }

    out.push('>');
    out.push_str(node.content());
    for child in node.children() {
        write_node(tree, *child, out)?;
    }
    let _ = write!(out, "</{}>", tag);
    Ok(())
}

pub fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

pub fn unescape_attribute(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

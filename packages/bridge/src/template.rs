use crate::compiler::CompilerOutput;
use mailframe_model::{escape_attribute, MergeController, Node};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Minimal valid document around the single insertion point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skeleton {
    pub start: String,
    pub end: String,
}

impl Skeleton {
    /// `<mjml><mj-body>…</mj-body></mjml>`
    pub fn body() -> Self {
        Self {
            start: "<mjml><mj-body>".to_string(),
            end: "</mj-body></mjml>".to_string(),
        }
    }

    /// One level deeper, inside a column, for kinds the compiler only
    /// accepts in column context
    pub fn column() -> Self {
        Self {
            start: "<mjml><mj-body><mj-column>".to_string(),
            end: "</mj-column></mj-body></mjml>".to_string(),
        }
    }
}

/// Where the node's fragment sits in the compiled body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "tag", rename_all = "camelCase")]
pub enum Extraction {
    /// Inner HTML of the scratch container's first element child
    FirstChildInner,
    /// Inner HTML of the first descendant with this tag
    FirstMatchInner(String),
}

impl Extraction {
    pub fn selector(&self) -> &str {
        match self {
            Extraction::FirstChildInner => ":first-child",
            Extraction::FirstMatchInner(tag) => tag,
        }
    }
}

/// Per-kind overrides of the compilation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindTemplate {
    pub skeleton: Skeleton,
    pub extraction: Extraction,
    /// Element inside the fragment receiving content and children; the
    /// fragment root when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children_selector: Option<String>,
}

impl Default for KindTemplate {
    fn default() -> Self {
        Self {
            skeleton: Skeleton::body(),
            extraction: Extraction::FirstChildInner,
            children_selector: None,
        }
    }
}

impl KindTemplate {
    /// Column-wrapped kind whose fragment is the first row of the output
    pub fn column_row(children_selector: impl Into<String>) -> Self {
        Self {
            skeleton: Skeleton::column(),
            extraction: Extraction::FirstMatchInner("tr".to_string()),
            children_selector: Some(children_selector.into()),
        }
    }
}

/// Opening and closing tag of the node itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub start: String,
    pub end: String,
}

impl Anchor {
    pub fn for_node(node: &Node) -> Self {
        let tag = node.tag();
        let mut start = format!("<{}", tag);
        for (name, value) in MergeController::compiler_attributes(node) {
            let _ = write!(start, " {}=\"{}\"", name, escape_attribute(&value));
        }
        start.push('>');
        Self {
            start,
            end: format!("</{}>", tag),
        }
    }
}

/// Full markup document for compiling `node` alone
pub fn wrap(skeleton: &Skeleton, anchor: &Anchor) -> String {
    format!(
        "{}{}{}{}",
        skeleton.start, anchor.start, anchor.end, skeleton.end
    )
}

/// Compiled HTML around the node's children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledTemplate {
    /// Markup up to the end of the children container's content
    pub start: String,
    /// Remainder after the children container's content
    pub end: String,
    /// Warnings reported by the compiler for this node
    pub warnings: Vec<String>,
}

impl CompiledTemplate {
    /// The whole fragment, as mounted into a view
    pub fn html(&self) -> String {
        format!("{}{}", self.start, self.end)
    }

    pub(crate) fn with_output(start: String, end: String, output: &CompilerOutput) -> Self {
        Self {
            start,
            end,
            warnings: output.warnings.clone(),
        }
    }
}

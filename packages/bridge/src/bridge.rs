//! # Compilation Bridge
//!
//! Compiles a single node through the external compiler and pulls its own
//! fragment back out of the full HTML document:
//!
//! ```text
//! skeleton.start + <tag attrs></tag> + skeleton.end
//!         ↓ compiler
//! <html>…<body …>FRAGMENT</body></html>
//!         ↓ extract_body
//! scratch.innerHTML = FRAGMENT
//!         ↓ kind extraction path
//! CompiledTemplate { start, end }
//! ```

use crate::compiler::{CompilerError, MarkupCompiler};
use crate::error::{BridgeError, BridgeResult};
use crate::template::{wrap, Anchor, CompiledTemplate, Extraction, KindTemplate};
use mailframe_dom::{Dom, DomId};
use mailframe_model::Node;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, instrument, warn};

const BODY_OPEN: &str = "<body>";

fn body_open_tag() -> &'static Regex {
    static BODY_OPEN_TAG: OnceLock<Regex> = OnceLock::new();
    BODY_OPEN_TAG.get_or_init(|| Regex::new(r"(?i)<body[^>]*>").expect("static regex"))
}

fn body_close_tag() -> &'static Regex {
    static BODY_CLOSE_TAG: OnceLock<Regex> = OnceLock::new();
    BODY_CLOSE_TAG.get_or_init(|| Regex::new(r"(?i)</body\s*>").expect("static regex"))
}

/// Off-tree staging element, reused across compilations
#[derive(Debug)]
pub struct Scratch {
    dom: Dom,
    root: DomId,
}

impl Scratch {
    pub fn new() -> Self {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        Self { dom, root }
    }

    fn load(&mut self, html: &str) -> BridgeResult<()> {
        self.dom.set_inner_html(self.root, html)?;
        Ok(())
    }

    /// Live nodes currently held, the root included
    pub fn live_count(&self) -> usize {
        self.dom.live_count()
    }

    /// Arena slots allocated so far, free ones included
    pub fn slot_count(&self) -> usize {
        self.dom.slot_count()
    }

    fn extract(&self, kind: &str, template: &KindTemplate) -> BridgeResult<(String, String)> {
        let miss = |selector: &str| BridgeError::ExtractionMiss {
            kind: kind.to_string(),
            selector: selector.to_string(),
        };

        let fragment_root = match &template.extraction {
            Extraction::FirstChildInner => self.dom.first_element_child(self.root)?,
            Extraction::FirstMatchInner(tag) => self.dom.query_selector(self.root, tag)?,
        }
        .ok_or_else(|| miss(template.extraction.selector()))?;

        let container = match template.children_selector.as_deref() {
            Some(selector) => self
                .dom
                .query_selector(fragment_root, selector)?
                .ok_or_else(|| miss(selector))?,
            None => fragment_root,
        };

        Ok(self.dom.split_inner_html(fragment_root, container)?)
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CompilationBridge {
    compiler: Box<dyn MarkupCompiler>,
    scratch: Scratch,
    compilations: u64,
}

impl std::fmt::Debug for CompilationBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilationBridge")
            .field("scratch", &self.scratch)
            .field("compilations", &self.compilations)
            .finish_non_exhaustive()
    }
}

impl CompilationBridge {
    pub fn new(compiler: impl MarkupCompiler + 'static) -> Self {
        Self {
            compiler: Box::new(compiler),
            scratch: Scratch::new(),
            compilations: 0,
        }
    }

    /// Number of compiler invocations so far
    pub fn compilations(&self) -> u64 {
        self.compilations
    }

    pub fn scratch(&self) -> &Scratch {
        &self.scratch
    }

    /// Markup document sent to the compiler for `node`
    pub fn markup_for(node: &Node, template: &KindTemplate) -> String {
        wrap(&template.skeleton, &Anchor::for_node(node))
    }

    /// Compile `node` alone and return its fragment split around the
    /// children container
    #[instrument(skip(self, node, template), fields(node = %node.id(), tag = %node.tag()))]
    pub fn compile(&mut self, node: &Node, template: &KindTemplate) -> BridgeResult<CompiledTemplate> {
        let markup = Self::markup_for(node, template);
        self.compilations += 1;

        let output = self.compiler.compile(&markup)?;
        for warning in &output.warnings {
            warn!(node = %node.id(), warning = %warning, "Compiler warning");
        }
        if output.html.trim().is_empty() {
            return Err(CompilerError::Rejected("compiler returned no HTML".to_string()).into());
        }

        let body = extract_body(&output.html)?;
        self.scratch.load(&body)?;
        let (start, end) = self.scratch.extract(node.kind(), template)?;

        debug!(start = start.len(), end = end.len(), "Extracted compiled fragment");
        Ok(CompiledTemplate::with_output(start, end, &output))
    }
}

/// Content strictly between `<body>` and `</body>`, trimmed
///
/// Compilers decorate the opening body tag with attributes; it is normalized
/// to a bare `<body>` before the boundaries are located.
pub fn extract_body(html: &str) -> BridgeResult<String> {
    let normalized = body_open_tag().replace(html, BODY_OPEN);
    let start = normalized
        .find(BODY_OPEN)
        .map(|i| i + BODY_OPEN.len())
        .ok_or_else(|| BridgeError::MalformedOutput("missing <body>".to_string()))?;
    let end = body_close_tag()
        .find(&normalized[start..])
        .map(|m| start + m.start())
        .ok_or_else(|| BridgeError::MalformedOutput("missing </body>".to_string()))?;
    Ok(normalized[start..end].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompilerOutput;
    use mailframe_model::{AttrMap, NodeId, NodeInit, NodeTree};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn map(pairs: &[(&str, &str)]) -> AttrMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn divider(tree: &mut NodeTree) -> NodeId {
        tree.create(NodeInit {
            kind: "mj-divider".to_string(),
            tag: "mj-divider".to_string(),
            style: map(&[("border-color", "#000000")]),
            ..Default::default()
        })
    }

    fn document(body: &str) -> String {
        format!(
            r#"<!doctype html><html><head><title></title></head><body style="word-spacing:normal;">{}</body></html>"#,
            body
        )
    }

    fn column_output() -> String {
        document(
            r#"
            <div style="margin:0px auto;"><table><tbody><tr><td style="padding:10px 25px;"><p style="border-top:solid 4px #000000;"></p></td></tr></tbody></table></div>
            "#,
        )
    }

    #[test]
    fn test_extract_body_normalizes_open_tag() {
        let html = document("  <div>x</div>\n");
        assert_eq!(extract_body(&html).unwrap(), "<div>x</div>");
    }

    #[test]
    fn test_extract_body_requires_markers() {
        let err = extract_body("<html><div></div></html>").unwrap_err();
        assert!(matches!(err, BridgeError::MalformedOutput(_)));
    }

    #[test]
    fn test_extract_body_uppercase_markers() {
        let html = "<HTML><BODY class=\"x\"><div>x</div></BODY></HTML>";
        assert_eq!(extract_body(html).unwrap(), "<div>x</div>");
    }

    #[test]
    fn test_markup_for_wraps_anchor_in_skeleton() {
        let mut tree = NodeTree::new();
        let id = divider(&mut tree);
        tree.set_src(id, Some("a.png".to_string())).unwrap();
        tree.set_attribute(id, "css-class", "").unwrap();
        let markup = CompilationBridge::markup_for(tree.get(id).unwrap(), &KindTemplate::column_row("p"));
        assert_eq!(
            markup,
            r##"<mjml><mj-body><mj-column><mj-divider border-color="#000000" src="a.png"></mj-divider></mj-column></mj-body></mjml>"##
        );
    }

    #[test]
    fn test_compile_extracts_row_split_at_container() {
        let mut tree = NodeTree::new();
        let id = divider(&mut tree);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let mut bridge = CompilationBridge::new(move |markup: &str| -> Result<CompilerOutput, CompilerError> {
            log.borrow_mut().push(markup.to_string());
            Ok(CompilerOutput::html(column_output()))
        });

        let template = bridge
            .compile(tree.get(id).unwrap(), &KindTemplate::column_row("p"))
            .unwrap();

        assert_eq!(
            template.start,
            r#"<td style="padding: 10px 25px;"><p style="border-top: solid 4px #000000;">"#
        );
        assert_eq!(template.end, "</p></td>");
        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].contains("<mj-column><mj-divider"));
    }

    #[test]
    fn test_default_extraction_takes_first_child_inner() {
        let mut tree = NodeTree::new();
        let id = tree.create(NodeInit {
            kind: "core".to_string(),
            tag: "mj-section".to_string(),
            ..Default::default()
        });
        let mut bridge = CompilationBridge::new(|_: &str| -> Result<CompilerOutput, CompilerError> {
            Ok(CompilerOutput::html(document(
                "<!--[if mso]><table><![endif]--><div class=\"outer\"><div class=\"section\"></div></div>",
            )))
        });

        let template = bridge.compile(tree.get(id).unwrap(), &KindTemplate::default()).unwrap();
        assert_eq!(template.html(), r#"<div class="section"></div>"#);
        assert!(template.end.is_empty());
    }

    #[test]
    fn test_data_uri_background_survives_extraction() {
        let mut tree = NodeTree::new();
        let id = tree.create(NodeInit {
            kind: "core".to_string(),
            tag: "mj-section".to_string(),
            ..Default::default()
        });
        let mut bridge = CompilationBridge::new(|_: &str| -> Result<CompilerOutput, CompilerError> {
            Ok(CompilerOutput::html(document(
                r#"<div><div style="background:url(data:image/png;base64,AAAA) top center;max-width:600px;"></div></div>"#,
            )))
        });

        let template = bridge.compile(tree.get(id).unwrap(), &KindTemplate::default()).unwrap();
        assert_eq!(
            template.html(),
            r#"<div style="background: url(data:image/png;base64,AAAA) top center; max-width: 600px;"></div>"#
        );
    }

    #[test]
    fn test_selector_mismatch_is_extraction_miss() {
        let mut tree = NodeTree::new();
        let id = divider(&mut tree);
        let mut bridge = CompilationBridge::new(|_: &str| -> Result<CompilerOutput, CompilerError> {
            Ok(CompilerOutput::html(column_output()))
        });

        let template = KindTemplate {
            extraction: Extraction::FirstMatchInner("li".to_string()),
            ..KindTemplate::column_row("p")
        };
        let err = bridge.compile(tree.get(id).unwrap(), &template).unwrap_err();
        match err {
            BridgeError::ExtractionMiss { kind, selector } => {
                assert_eq!(kind, "mj-divider");
                assert_eq!(selector, "li");
            }
            other => panic!("expected ExtractionMiss, got {:?}", other),
        }

        let err = bridge
            .compile(tree.get(id).unwrap(), &KindTemplate::column_row("img"))
            .unwrap_err();
        assert!(matches!(err, BridgeError::ExtractionMiss { ref selector, .. } if selector == "img"));
    }

    #[test]
    fn test_compiler_failure_is_reported() {
        let mut tree = NodeTree::new();
        let id = divider(&mut tree);
        let mut bridge = CompilationBridge::new(|_: &str| -> Result<CompilerOutput, CompilerError> {
            Err(CompilerError::Rejected("invalid border-color".to_string()))
        });
        let err = bridge
            .compile(tree.get(id).unwrap(), &KindTemplate::column_row("p"))
            .unwrap_err();
        assert!(matches!(err, BridgeError::Compiler(CompilerError::Rejected(_))));
    }

    #[test]
    fn test_scratch_is_reused_without_growth() {
        let mut tree = NodeTree::new();
        let id = divider(&mut tree);
        let mut bridge = CompilationBridge::new(|_: &str| -> Result<CompilerOutput, CompilerError> {
            Ok(CompilerOutput::html(column_output()))
        });
        let template = KindTemplate::column_row("p");

        bridge.compile(tree.get(id).unwrap(), &template).unwrap();
        let live = bridge.scratch().live_count();
        let slots = bridge.scratch().slot_count();
        for _ in 0..50 {
            bridge.compile(tree.get(id).unwrap(), &template).unwrap();
        }
        assert_eq!(bridge.scratch().live_count(), live);
        assert_eq!(bridge.scratch().slot_count(), slots);
        assert_eq!(bridge.compilations(), 51);
    }
}

//! Markup import
//!
//! Turns existing markup back into nodes: each element is matched to a kind by
//! the registry's recognizers, created from that kind's defaults, and then its
//! parsed attributes are applied as ordinary edits. The default style snapshot
//! therefore stays at the kind defaults and export keeps suppressing them.

use crate::errors::ImportError;
use crate::kind::ContentPolicy;
use crate::registry::TypeRegistry;
use mailframe_dom::{Dom, DomData, DomId};
use mailframe_model::{unescape_attribute, NodeId, NodeTree};
use tracing::debug;

/// Import the first element of `markup` (and its subtree) into `tree`
pub fn import_markup(
    registry: &TypeRegistry,
    tree: &mut NodeTree,
    markup: &str,
) -> Result<NodeId, ImportError> {
    let mut dom = Dom::new();
    let holder = dom.create_element("template");
    dom.set_inner_html(holder, markup)?;
    let root = dom.first_element_child(holder)?.ok_or(ImportError::Empty)?;
    let id = import_element(registry, tree, &dom, root)?;
    debug!(node = %id, "Imported markup");
    Ok(id)
}

fn import_element(
    registry: &TypeRegistry,
    tree: &mut NodeTree,
    dom: &Dom,
    el: DomId,
) -> Result<NodeId, ImportError> {
    let data = dom.element(el)?;
    let kind = registry.resolve(&data.tag);
    let id = tree.create(kind.node_init(&data.tag));

    for (name, value) in &data.attributes {
        tree.set_attribute(id, name.as_str(), unescape_attribute(value))?;
    }

    if kind.defaults.void {
        return Ok(id);
    }

    match kind.content {
        ContentPolicy::Literal => {
            let inner = dom.inner_html(el)?;
            if !inner.trim().is_empty() {
                tree.set_content(id, inner)?;
            }
        }
        ContentPolicy::Children => {
            let mut content = String::new();
            for child in dom.children(el)? {
                match &dom.node(*child)?.data {
                    DomData::Element(_) => {
                        let child_id = import_element(registry, tree, dom, *child)?;
                        tree.append_child(id, child_id)?;
                    }
                    DomData::Text(text) if !text.trim().is_empty() => content.push_str(text),
                    _ => {}
                }
            }
            if !content.is_empty() {
                tree.set_content(id, content)?;
            }
        }
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Kind;
    use mailframe_model::to_markup;

    fn roundtrip(registry: &TypeRegistry, markup: &str) -> String {
        let mut tree = NodeTree::new();
        let id = import_markup(registry, &mut tree, markup).unwrap();
        to_markup(&tree, id).unwrap()
    }

    #[test]
    fn test_import_recognizes_kinds() {
        let registry = TypeRegistry::with_builtin_kinds();
        let mut tree = NodeTree::new();
        let id = import_markup(
            &registry,
            &mut tree,
            r##"<mj-column><mj-divider border-color="#ff0000"></mj-divider><mj-social/></mj-column>"##,
        )
        .unwrap();

        let children = tree.children(id).unwrap().to_vec();
        assert_eq!(children.len(), 2);
        let divider = tree.get(children[0]).unwrap();
        assert_eq!(divider.kind(), "mj-divider");
        assert_eq!(divider.attribute("border-color"), Some("#ff0000"));
        assert_eq!(divider.style().get("border-color").unwrap(), "#ff0000");
        assert_eq!(divider.default_style().get("border-color").unwrap(), "#000000");
        assert!(tree.get(children[1]).unwrap().is_void());
    }

    #[test]
    fn test_roundtrip_is_idempotent() {
        let registry = TypeRegistry::with_builtin_kinds();
        let source = r##"<mj-section padding="0px"><mj-column><mj-divider width="50%" border-color="#ff0000"></mj-divider><mj-social mode="vertical"/><mj-text>Hello</mj-text></mj-column></mj-section>"##;
        let once = roundtrip(&registry, source);
        assert_eq!(once, source);
        assert_eq!(roundtrip(&registry, &once), once);
    }

    #[test]
    fn test_void_kind_ignores_imported_children() {
        let registry = TypeRegistry::with_builtin_kinds();
        let out = roundtrip(&registry, "<mj-social><mj-divider></mj-divider>text</mj-social>");
        assert_eq!(out, "<mj-social/>");
    }

    #[test]
    fn test_literal_kind_keeps_inner_markup() {
        let mut registry = TypeRegistry::with_builtin_kinds();
        let mut text = Kind::new("mj-text");
        text.content = crate::kind::ContentPolicy::Literal;
        registry.add_type(text);

        let mut tree = NodeTree::new();
        let id = import_markup(&registry, &mut tree, "<mj-text><p>Hi <b>there</b></p></mj-text>").unwrap();
        let node = tree.get(id).unwrap();
        assert_eq!(node.content(), "<p>Hi <b>there</b></p>");
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_empty_markup_is_rejected() {
        let registry = TypeRegistry::with_builtin_kinds();
        let mut tree = NodeTree::new();
        let err = import_markup(&registry, &mut tree, "  just text ").unwrap_err();
        assert!(matches!(err, ImportError::Empty));
    }
}

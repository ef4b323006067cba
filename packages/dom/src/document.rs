//! # Live Document
//!
//! Arena-backed mutable document tree. Views mount compiled HTML into it and
//! move rendered child elements between containers without re-creating them.
//!
//! Freed slots are recycled. Every slot carries a generation that is bumped
//! when its node is freed, so a stale [`DomId`] resolves to
//! [`DomError::NodeNotFound`] instead of aliasing the slot's next occupant.

use crate::error::{DomError, DomResult};
use crate::style::InlineStyle;
use crate::tokenizer::{close_tag_name, parse_open_tag, HtmlToken};
use indexmap::IndexMap;
use logos::Logos;
use std::fmt::{self, Write};

/// Handle to a node in a [`Dom`]: slot index plus the slot's generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomId {
    index: usize,
    generation: u32,
}

impl fmt::Display for DomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub style: InlineStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomData {
    Element(ElementData),
    Text(String),
    Comment(String),
    /// Doctype and other `<!...>` directives, kept verbatim
    Directive(String),
}

#[derive(Debug, Clone)]
pub struct DomNode {
    pub data: DomData,
    parent: Option<DomId>,
    children: Vec<DomId>,
}

impl DomNode {
    pub fn parent(&self) -> Option<DomId> {
        self.parent
    }

    pub fn children(&self) -> &[DomId] {
        &self.children
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<DomNode>,
}

#[derive(Debug, Default)]
pub struct Dom {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, data: DomData) -> DomId {
        let node = DomNode {
            data,
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return DomId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        DomId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Take the node out of its slot and retire the slot's generation
    fn release(&mut self, id: DomId) -> Option<DomNode> {
        let slot = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(node)
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> DomId {
        self.alloc(DomData::Element(ElementData {
            tag: tag.into(),
            attributes: IndexMap::new(),
            style: InlineStyle::new(),
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> DomId {
        self.alloc(DomData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> DomId {
        self.alloc(DomData::Comment(text.into()))
    }

    pub fn node(&self, id: DomId) -> DomResult<&DomNode> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: DomId) -> DomResult<&mut DomNode> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(DomError::NodeNotFound(id))
    }

    pub fn contains(&self, id: DomId) -> bool {
        self.node(id).is_ok()
    }

    /// Number of live nodes
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Slots allocated so far, free ones included
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn element(&self, id: DomId) -> DomResult<&ElementData> {
        match &self.node(id)?.data {
            DomData::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn element_mut(&mut self, id: DomId) -> DomResult<&mut ElementData> {
        match &mut self.node_mut(id)?.data {
            DomData::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn is_element(&self, id: DomId) -> bool {
        self.element(id).is_ok()
    }

    pub fn tag(&self, id: DomId) -> DomResult<&str> {
        Ok(&self.element(id)?.tag)
    }

    pub fn parent(&self, id: DomId) -> Option<DomId> {
        self.node(id).ok().and_then(|n| n.parent)
    }

    pub fn children(&self, id: DomId) -> DomResult<&[DomId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn element_children(&self, id: DomId) -> DomResult<Vec<DomId>> {
        Ok(self
            .children(id)?
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect())
    }

    pub fn first_element_child(&self, id: DomId) -> DomResult<Option<DomId>> {
        Ok(self
            .children(id)?
            .iter()
            .copied()
            .find(|c| self.is_element(*c)))
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: DomId, id: DomId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    // ---- Tree mutation ----------------------------------------------------

    /// Append `child` to `parent`, moving it out of its current parent first
    pub fn append_child(&mut self, parent: DomId, child: DomId) -> DomResult<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Unlink `id` from its parent, keeping its subtree alive
    pub fn detach(&mut self, id: DomId) -> DomResult<()> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            if let Ok(p) = self.node_mut(parent) {
                p.children.retain(|c| *c != id);
            }
            self.node_mut(id)?.parent = None;
        }
        Ok(())
    }

    /// Detach `id` and free it together with its whole subtree
    pub fn remove(&mut self, id: DomId) -> DomResult<()> {
        self.detach(id)?;
        self.free_subtree(id);
        Ok(())
    }

    fn free_subtree(&mut self, id: DomId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.release(current) {
                stack.extend(node.children);
            }
        }
    }

    /// Free every child subtree of `id`
    pub fn clear_children(&mut self, id: DomId) -> DomResult<()> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            if let Ok(node) = self.node_mut(child) {
                node.parent = None;
            }
            self.free_subtree(child);
        }
        Ok(())
    }

    // ---- Attributes and style --------------------------------------------

    pub fn set_attribute(
        &mut self,
        id: DomId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> DomResult<()> {
        let name = name.into();
        let value = value.into();
        let el = self.element_mut(id)?;
        if name.eq_ignore_ascii_case("style") {
            el.style = InlineStyle::parse(&value);
        } else {
            el.attributes.insert(name, value);
        }
        Ok(())
    }

    pub fn attribute(&self, id: DomId, name: &str) -> Option<&str> {
        self.element(id)
            .ok()
            .and_then(|el| el.attributes.get(name))
            .map(String::as_str)
    }

    /// Remove every attribute except the inline style
    pub fn clear_attributes(&mut self, id: DomId) -> DomResult<()> {
        self.element_mut(id)?.attributes.clear();
        Ok(())
    }

    pub fn style(&self, id: DomId) -> DomResult<&InlineStyle> {
        Ok(&self.element(id)?.style)
    }

    pub fn set_style(&mut self, id: DomId, style: InlineStyle) -> DomResult<()> {
        self.element_mut(id)?.style = style;
        Ok(())
    }

    pub fn set_style_property(
        &mut self,
        id: DomId,
        prop: impl Into<String>,
        value: impl Into<String>,
    ) -> DomResult<()> {
        self.element_mut(id)?.style.set(prop, value);
        Ok(())
    }

    // ---- Queries ----------------------------------------------------------

    /// First descendant element of `root` (excluding `root`) with the given tag,
    /// in document order
    pub fn query_selector(&self, root: DomId, tag: &str) -> DomResult<Option<DomId>> {
        let mut stack: Vec<DomId> = self.children(root)?.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            if let DomData::Element(el) = &node.data {
                if el.tag.eq_ignore_ascii_case(tag) {
                    return Ok(Some(id));
                }
            }
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(None)
    }

    /// Element descendants of `root` in document order, excluding `root`
    pub fn element_descendants(&self, root: DomId) -> DomResult<Vec<DomId>> {
        let mut out = Vec::new();
        let mut stack: Vec<DomId> = self.children(root)?.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            if matches!(node.data, DomData::Element(_)) {
                out.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(out)
    }

    // ---- HTML in and out --------------------------------------------------

    /// Replace the children of `id` with the parsed `html`
    pub fn set_inner_html(&mut self, id: DomId, html: &str) -> DomResult<()> {
        self.element(id)?;
        self.clear_children(id)?;
        for node in self.parse_fragment(html)? {
            self.append_child(id, node)?;
        }
        Ok(())
    }

    /// Parse `html` into detached top-level nodes
    pub fn parse_fragment(&mut self, html: &str) -> DomResult<Vec<DomId>> {
        let mut roots = Vec::new();
        let mut open: Vec<DomId> = Vec::new();

        let mut lexer = HtmlToken::lexer(html);
        while let Some(result) = lexer.next() {
            let token = result.map_err(|_| DomError::Parse {
                pos: lexer.span().start,
            })?;

            let created = match token {
                HtmlToken::Text(text) => Some(self.create_text(text)),
                HtmlToken::Lt => Some(self.create_text("<")),
                HtmlToken::Comment(raw) => {
                    let body = &raw[4..raw.len() - 3];
                    Some(self.create_comment(body))
                }
                HtmlToken::Directive(raw) => Some(self.alloc(DomData::Directive(raw.to_string()))),
                HtmlToken::OpenTag(raw) => {
                    let tag = parse_open_tag(raw);
                    let id = self.create_element(tag.name);
                    for (name, value) in tag.attributes {
                        self.set_attribute(id, name, value)?;
                    }
                    self.attach(&mut roots, &open, id)?;
                    if !tag.self_closing && !is_void_element(tag.name) {
                        open.push(id);
                    }
                    None
                }
                HtmlToken::CloseTag(raw) => {
                    let name = close_tag_name(raw);
                    let matching = open.iter().rposition(|el| {
                        self.tag(*el)
                            .map(|t| t.eq_ignore_ascii_case(name))
                            .unwrap_or(false)
                    });
                    // Stray closing tags are dropped
                    if let Some(pos) = matching {
                        open.truncate(pos);
                    }
                    None
                }
            };

            if let Some(id) = created {
                self.attach(&mut roots, &open, id)?;
            }
        }

        Ok(roots)
    }

    fn attach(&mut self, roots: &mut Vec<DomId>, open: &[DomId], id: DomId) -> DomResult<()> {
        match open.last() {
            Some(parent) => self.append_child(*parent, id),
            None => {
                roots.push(id);
                Ok(())
            }
        }
    }

    pub fn inner_html(&self, id: DomId) -> DomResult<String> {
        let mut out = String::new();
        for child in self.children(id)? {
            self.write_node(*child, None, &mut out)?;
        }
        Ok(out)
    }

    pub fn outer_html(&self, id: DomId) -> DomResult<String> {
        let mut out = String::new();
        self.write_node(id, None, &mut out)?;
        Ok(out)
    }

    /// Serialize the children of `root`, split at the end of `container`'s
    /// content
    ///
    /// The first half ends right before `container`'s closing tag (or right
    /// after its opening tag for void elements); when `container` is `root`
    /// the whole markup lands in the first half.
    pub fn split_inner_html(&self, root: DomId, container: DomId) -> DomResult<(String, String)> {
        if container == root {
            return Ok((self.inner_html(root)?, String::new()));
        }
        let mut out = String::new();
        let mut split = None;
        for child in self.children(root)? {
            self.write_node(*child, Some((container, &mut split)), &mut out)?;
        }
        let at = split.unwrap_or(out.len());
        let end = out.split_off(at);
        Ok((out, end))
    }

    fn write_node(
        &self,
        id: DomId,
        mut split: Option<(DomId, &mut Option<usize>)>,
        out: &mut String,
    ) -> DomResult<()> {
        let node = self.node(id)?;
        match &node.data {
            DomData::Text(text) => out.push_str(text),
            DomData::Comment(text) => {
                let _ = write!(out, "<!--{}-->", text);
            }
            DomData::Directive(raw) => out.push_str(raw),
            DomData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attributes {
                    write_attribute(out, name, value);
                }
                if !el.style.is_empty() {
                    write_attribute(out, "style", &el.style.to_string());
                }
                out.push('>');

                let is_marker = matches!(&split, Some((marker, _)) if *marker == id);
                if is_void_element(&el.tag) {
                    if is_marker {
                        mark(&mut split, out.len());
                    }
                    return Ok(());
                }

                for child in &node.children {
                    let nested = split.as_mut().map(|(marker, at)| (*marker, &mut **at));
                    self.write_node(*child, nested, out)?;
                }
                if is_marker {
                    mark(&mut split, out.len());
                }
                let _ = write!(out, "</{}>", el.tag);
            }
        }
        Ok(())
    }
}

fn mark(split: &mut Option<(DomId, &mut Option<usize>)>, at: usize) {
    if let Some((_, slot)) = split {
        slot.get_or_insert(at);
    }
}

fn write_attribute(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {}=\"{}\"", name, value.replace('"', "&quot;"));
}

/// HTML elements that never have children or a closing tag
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

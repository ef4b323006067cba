//! Views: one live element per mounted node
//!
//! Views live in an arena owned by the canvas. Slots are recycled, but each
//! [`ViewId`] carries its slot's generation, so a stale id left in another
//! view's cache simply resolves to nothing.

use mailframe_dom::{DomId, InlineStyle};
use mailframe_model::{EventKind, NodeId, SubscriptionId};
use std::collections::HashMap;
use std::fmt;

/// Node events a view re-renders on. Never `Style`: the merge controller
/// turns every style write into one `Attributes` event.
pub(crate) const VIEW_EVENTS: &[EventKind] = &[
    EventKind::Attributes,
    EventKind::Src,
    EventKind::Content,
    EventKind::Children,
    EventKind::Removed,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId {
    index: usize,
    generation: u32,
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPath {
    /// Rebuild child views from scratch
    Cold,
    /// Re-mount the compiled fragment and relocate cached child elements
    Warm,
}

/// Child views bound to a node's children, and the element they live in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildViews {
    pub container: DomId,
    pub views: Vec<ViewId>,
}

#[derive(Debug, Clone)]
pub struct View {
    pub(crate) id: ViewId,
    pub(crate) node: NodeId,
    pub(crate) el: DomId,
    pub(crate) style: InlineStyle,
    pub(crate) child_views: Option<ChildViews>,
    /// Top-level elements of the rendered children, kept for the warm path
    pub(crate) child_els: Vec<DomId>,
    pub(crate) subscriptions: Vec<SubscriptionId>,
    pub(crate) failed: bool,
    pub(crate) render_count: u64,
}

impl View {
    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn el(&self) -> DomId {
        self.el
    }

    pub fn style(&self) -> &InlineStyle {
        &self.style
    }

    pub fn child_views(&self) -> Option<&ChildViews> {
        self.child_views.as_ref()
    }

    pub fn child_els(&self) -> &[DomId] {
        &self.child_els
    }

    /// The last render failed and left `el` empty
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    view: Option<View>,
}

#[derive(Debug, Default)]
pub(crate) struct Views {
    slots: Vec<Slot>,
    free: Vec<usize>,
    by_node: HashMap<NodeId, ViewId>,
}

impl Views {
    pub(crate) fn insert(&mut self, node: NodeId, el: DomId, style: InlineStyle) -> ViewId {
        let index = self.free.pop().unwrap_or_else(|| {
            self.slots.push(Slot::default());
            self.slots.len() - 1
        });
        let slot = &mut self.slots[index];
        let id = ViewId {
            index,
            generation: slot.generation,
        };
        slot.view = Some(View {
            id,
            node,
            el,
            style,
            child_views: None,
            child_els: Vec::new(),
            subscriptions: Vec::new(),
            failed: false,
            render_count: 0,
        });
        self.by_node.insert(node, id);
        id
    }

    pub(crate) fn get(&self, id: ViewId) -> Option<&View> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.view.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.view.as_mut())
    }

    pub(crate) fn of_node(&self, node: NodeId) -> Option<ViewId> {
        self.by_node.get(&node).copied()
    }

    pub(crate) fn remove(&mut self, id: ViewId) -> Option<View> {
        let slot = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)?;
        let view = slot.view.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        if self.by_node.get(&view.node) == Some(&id) {
            self.by_node.remove(&view.node);
        }
        Some(view)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_node.len()
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailframe_dom::Dom;
    use mailframe_model::{NodeInit, NodeTree};

    #[test]
    fn test_stale_view_id_misses_recycled_slot() {
        let mut dom = Dom::new();
        let mut tree = NodeTree::new();
        let node = tree.create(NodeInit::default());
        let mut views = Views::default();

        let first = views.insert(node, dom.create_element("div"), InlineStyle::new());
        assert!(views.remove(first).is_some());
        let second = views.insert(node, dom.create_element("div"), InlineStyle::new());

        assert_ne!(first, second);
        assert!(views.get(first).is_none());
        assert!(views.remove(first).is_none());
        assert_eq!(views.of_node(node), Some(second));
        assert_eq!(views.slot_count(), 1);
    }

    #[test]
    fn test_removing_stale_view_keeps_node_binding() {
        let mut dom = Dom::new();
        let mut tree = NodeTree::new();
        let node = tree.create(NodeInit::default());
        let mut views = Views::default();

        let old = views.insert(node, dom.create_element("div"), InlineStyle::new());
        let new = views.insert(node, dom.create_element("div"), InlineStyle::new());
        views.remove(old);

        assert_eq!(views.of_node(node), Some(new));
        assert_eq!(views.len(), 1);
    }
}

//! # Node Tree
//!
//! Arena of editable nodes. Every mutation publishes a [`NodeEvent`]; the
//! merge controller is wired as an internal `Style` listener on each node at
//! construction, so a style write fans out to exactly one `Attributes` event.

use crate::error::{ModelError, ModelResult};
use crate::events::{Delivery, EventBus, EventKind, Handler, NodeEvent, SubscriptionId};
use crate::merge::MergeController;
use crate::node::{AttrMap, Node, NodeId, NodeInit};
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
    bus: EventBus,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a detached node and attach its merge controller
    pub fn create(&mut self, init: NodeInit) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        let mut node = Node {
            id,
            kind: init.kind,
            tag: init.tag,
            attributes: init.attributes,
            style: init.style,
            default_style: AttrMap::new(),
            content: init.content,
            src: init.src,
            void: init.void,
            meta: init.meta,
            parent: None,
            children: Vec::new(),
        };
        MergeController::init(&mut node);
        debug!(node = %id, tag = %node.tag, kind = %node.kind, "Created node");
        self.nodes.insert(id, node);
        self.bus.subscribe(id, EventKind::Style, Handler::MergeStyle);
        id
    }

    pub fn get(&self, id: NodeId) -> ModelResult<&Node> {
        self.nodes.get(&id).ok_or(ModelError::NodeNotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> ModelResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(ModelError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> ModelResult<&[NodeId]> {
        Ok(self.get(id)?.children())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Distance from the root of `id`'s tree
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// `id` and its descendants, parents first
    pub fn descendants(&self, id: NodeId) -> ModelResult<Vec<NodeId>> {
        self.get(id)?;
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Ok(node) = self.get(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        Ok(out)
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    // ---- Events -----------------------------------------------------------

    /// Queue `kind` events from `source` for the caller to drain
    pub fn listen_to(&mut self, source: NodeId, kind: EventKind) -> ModelResult<SubscriptionId> {
        self.get(source)?;
        Ok(self.bus.subscribe(source, kind, Handler::Queue))
    }

    pub fn stop_listening(&mut self, subscription: SubscriptionId) -> bool {
        self.bus.unsubscribe(subscription)
    }

    pub fn is_listening(&self, subscription: SubscriptionId) -> bool {
        self.bus.is_subscribed(subscription)
    }

    pub fn drain_events(&mut self) -> Vec<Delivery> {
        self.bus.drain()
    }

    pub fn pending_events(&self) -> usize {
        self.bus.pending()
    }

    fn publish(&mut self, node: NodeId, kind: EventKind) {
        let event = NodeEvent { node, kind };
        trace!(node = %node, kind = ?kind, "Publishing node event");
        for (subscription, handler) in self.bus.matching(&event) {
            match handler {
                Handler::MergeStyle => {
                    let changed = self
                        .nodes
                        .get_mut(&node)
                        .map(MergeController::handle_style_change)
                        .unwrap_or(false);
                    if changed {
                        self.publish(node, EventKind::Attributes);
                    }
                }
                Handler::Queue => self.bus.enqueue(subscription, event),
            }
        }
    }

    // ---- Style and attributes --------------------------------------------

    /// Replace the style; attributes are re-derived by the merge controller
    pub fn set_style(&mut self, id: NodeId, style: AttrMap) -> ModelResult<()> {
        self.get_mut(id)?.style = style;
        self.publish(id, EventKind::Style);
        Ok(())
    }

    pub fn set_style_property(
        &mut self,
        id: NodeId,
        prop: impl Into<String>,
        value: impl Into<String>,
    ) -> ModelResult<()> {
        self.get_mut(id)?.style.insert(prop.into(), value.into());
        self.publish(id, EventKind::Style);
        Ok(())
    }

    /// Set one attribute. A key that is also a style property is mirrored
    /// into the style without publishing `Style`.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> ModelResult<()> {
        let name = name.into();
        let value = value.into();
        let node = self.get_mut(id)?;
        if let Some(slot) = node.style.get_mut(&name) {
            *slot = value.clone();
        }
        node.attributes.insert(name, value);
        self.publish(id, EventKind::Attributes);
        Ok(())
    }

    /// Replace all attributes; style keys are kept in sync with the new values
    pub fn set_attributes(&mut self, id: NodeId, attributes: AttrMap) -> ModelResult<()> {
        let node = self.get_mut(id)?;
        for (key, value) in node.style.iter_mut() {
            if let Some(new) = attributes.get(key) {
                *value = new.clone();
            }
        }
        node.style.retain(|k, _| attributes.contains_key(k));
        node.attributes = attributes;
        self.publish(id, EventKind::Attributes);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> ModelResult<Option<String>> {
        let node = self.get_mut(id)?;
        node.style.shift_remove(name);
        let removed = node.attributes.shift_remove(name);
        if removed.is_some() {
            self.publish(id, EventKind::Attributes);
        }
        Ok(removed)
    }

    pub fn set_content(&mut self, id: NodeId, content: impl Into<String>) -> ModelResult<()> {
        self.get_mut(id)?.content = content.into();
        self.publish(id, EventKind::Content);
        Ok(())
    }

    pub fn set_src(&mut self, id: NodeId, src: Option<String>) -> ModelResult<()> {
        self.get_mut(id)?.src = src;
        self.publish(id, EventKind::Src);
        Ok(())
    }

    // ---- Structure --------------------------------------------------------

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> ModelResult<()> {
        let index = self.get(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Insert `child` at `index` under `parent`, moving it out of its previous
    /// parent. Void parents reject children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> ModelResult<()> {
        let parent_node = self.get(parent)?;
        if parent_node.void {
            return Err(ModelError::StructuralInvariantViolation {
                node: parent,
                tag: parent_node.tag.clone(),
            });
        }
        self.get(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(ModelError::CycleDetected { parent, child });
        }

        self.detach(child)?;
        let siblings = &mut self.get_mut(parent)?.children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.get_mut(child)?.parent = Some(parent);
        self.publish(parent, EventKind::Children);
        Ok(())
    }

    /// Unlink `id` from its parent, keeping it alive
    pub fn detach(&mut self, id: NodeId) -> ModelResult<()> {
        let Some(parent) = self.get(id)?.parent else {
            return Ok(());
        };
        if let Ok(p) = self.get_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        self.get_mut(id)?.parent = None;
        self.publish(parent, EventKind::Children);
        Ok(())
    }

    /// Destroy `id` and its subtree
    pub fn remove(&mut self, id: NodeId) -> ModelResult<()> {
        self.detach(id)?;
        for node in self.descendants(id)? {
            self.publish(node, EventKind::Removed);
            self.bus.unsubscribe_source(node);
            self.nodes.remove(&node);
        }
        debug!(node = %id, "Removed node subtree");
        Ok(())
    }
}

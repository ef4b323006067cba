//! # Change events
//!
//! `listen_to(source, kind)` / `stop_listening(id)` subscriptions over node
//! changes. Internal handlers (the merge controller) run synchronously while
//! the mutation is applied; external subscriptions are queued and drained by
//! their owner, which keeps view re-renders out of the mutation call stack.

use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// Raw style write
    Style,
    /// Attributes changed, including re-normalization after a style write
    Attributes,
    Src,
    Content,
    /// Children inserted, removed or reordered
    Children,
    /// The node was destroyed
    Removed,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Style,
        EventKind::Attributes,
        EventKind::Src,
        EventKind::Content,
        EventKind::Children,
        EventKind::Removed,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEvent {
    pub node: NodeId,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A queued event for one external subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub subscription: SubscriptionId,
    pub event: NodeEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handler {
    /// Re-derive attributes from style
    MergeStyle,
    /// Queue for the subscriber to drain
    Queue,
}

#[derive(Debug, Clone)]
struct Listener {
    source: NodeId,
    kind: EventKind,
    handler: Handler,
}

/// Listeners indexed by `(source, kind)`, so publishing only visits the
/// subscriptions it delivers to
#[derive(Debug, Default)]
pub(crate) struct EventBus {
    listeners: HashMap<SubscriptionId, Listener>,
    index: HashMap<(NodeId, EventKind), Vec<SubscriptionId>>,
    next_id: u64,
    queue: VecDeque<Delivery>,
}

impl EventBus {
    pub(crate) fn subscribe(&mut self, source: NodeId, kind: EventKind, handler: Handler) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.insert(
            id,
            Listener {
                source,
                kind,
                handler,
            },
        );
        self.index.entry((source, kind)).or_default().push(id);
        id
    }

    /// Drop one subscription and anything still queued for it
    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(listener) = self.listeners.remove(&id) else {
            return false;
        };
        let key = (listener.source, listener.kind);
        if let Some(ids) = self.index.get_mut(&key) {
            ids.retain(|s| *s != id);
            if ids.is_empty() {
                self.index.remove(&key);
            }
        }
        self.queue.retain(|d| d.subscription != id);
        true
    }

    /// Drop every subscription whose source is `node`. Already queued
    /// deliveries stay so subscribers still see the final `Removed`.
    pub(crate) fn unsubscribe_source(&mut self, node: NodeId) {
        for kind in EventKind::ALL {
            for id in self.index.remove(&(node, kind)).unwrap_or_default() {
                self.listeners.remove(&id);
            }
        }
    }

    /// Handlers matching `event`, in registration order
    pub(crate) fn matching(&self, event: &NodeEvent) -> Vec<(SubscriptionId, Handler)> {
        self.index
            .get(&(event.node, event.kind))
            .into_iter()
            .flatten()
            .filter_map(|id| self.listeners.get(id).map(|l| (*id, l.handler)))
            .collect()
    }

    pub(crate) fn enqueue(&mut self, subscription: SubscriptionId, event: NodeEvent) {
        self.queue.push_back(Delivery {
            subscription,
            event,
        });
    }

    pub(crate) fn drain(&mut self) -> Vec<Delivery> {
        self.queue.drain(..).collect()
    }

    pub(crate) fn pending(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.listeners.contains_key(&id)
    }

    /// Subscriptions currently registered
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(node: NodeId, kind: EventKind) -> NodeEvent {
        NodeEvent { node, kind }
    }

    #[test]
    fn test_matching_only_returns_exact_source_and_kind() {
        let (a, b) = (NodeId(1), NodeId(2));
        let mut bus = EventBus::default();
        let first = bus.subscribe(a, EventKind::Src, Handler::Queue);
        bus.subscribe(a, EventKind::Content, Handler::Queue);
        bus.subscribe(b, EventKind::Src, Handler::Queue);
        let second = bus.subscribe(a, EventKind::Src, Handler::Queue);

        assert_eq!(
            bus.matching(&event(a, EventKind::Src)),
            vec![(first, Handler::Queue), (second, Handler::Queue)]
        );
        assert!(bus.matching(&event(a, EventKind::Children)).is_empty());
    }

    #[test]
    fn test_unsubscribe_updates_index_and_queue() {
        let a = NodeId(1);
        let mut bus = EventBus::default();
        let id = bus.subscribe(a, EventKind::Content, Handler::Queue);
        bus.enqueue(id, event(a, EventKind::Content));

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert!(bus.matching(&event(a, EventKind::Content)).is_empty());
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn test_unsubscribe_source_keeps_queued_deliveries() {
        let (a, b) = (NodeId(1), NodeId(2));
        let mut bus = EventBus::default();
        let removed = bus.subscribe(a, EventKind::Removed, Handler::Queue);
        bus.subscribe(a, EventKind::Style, Handler::MergeStyle);
        let other = bus.subscribe(b, EventKind::Removed, Handler::Queue);
        bus.enqueue(removed, event(a, EventKind::Removed));

        bus.unsubscribe_source(a);
        assert!(!bus.is_subscribed(removed));
        assert!(bus.is_subscribed(other));
        assert_eq!(bus.len(), 1);
        assert_eq!(bus.pending(), 1);
    }
}

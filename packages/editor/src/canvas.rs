//! # Canvas
//!
//! Owns the node tree, the live document and one view per mounted node, and
//! pumps model events into re-renders.
//!
//! ## Render sequence
//!
//! ```text
//! apply attributes → el
//! compile node alone (bridge) → mount fragment into el
//! locate children container (kind selector, or el)
//! content → container            (non-void)
//! children → container           (non-void; cold rebuilds, warm relocates)
//! pointer-events: none outside the container
//! reapply the view style on el
//! ```
//!
//! Model mutations never render directly: they queue events, and
//! [`Canvas::flush`] renders every affected node once, parents first.

use crate::config::Config;
use crate::errors::{ImportError, RenderError};
use crate::import::import_markup;
use crate::registry::TypeRegistry;
use crate::view::{ChildViews, RenderPath, View, ViewId, Views, VIEW_EVENTS};
use mailframe_bridge::{CompilationBridge, MarkupCompiler};
use mailframe_dom::{Dom, DomId, InlineStyle};
use mailframe_model::{to_markup, EventKind, Node, NodeId, NodeTree};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

#[derive(Debug)]
pub struct RenderFailure {
    pub node: NodeId,
    pub error: RenderError,
}

/// Outcome of a render pass: nodes rendered and per-node failures
#[derive(Debug, Default)]
pub struct FlushReport {
    pub rendered: Vec<NodeId>,
    pub failures: Vec<RenderFailure>,
}

impl FlushReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure(&self, node: NodeId) -> Option<&RenderError> {
        self.failures
            .iter()
            .find(|f| f.node == node)
            .map(|f| &f.error)
    }

    fn touched(&self, node: NodeId) -> bool {
        self.rendered.contains(&node) || self.failure(node).is_some()
    }
}

/// Values read from the node and its kind before the DOM is touched
struct Prepared {
    kind: String,
    children_selector: Option<String>,
    void: bool,
    content: Option<String>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
pub struct Canvas {
    registry: TypeRegistry,
    tree: NodeTree,
    dom: Dom,
    root: DomId,
    views: Views,
    bridge: CompilationBridge,
    mask_interaction: bool,
}

impl Canvas {
    pub fn new(registry: TypeRegistry, compiler: impl MarkupCompiler + 'static) -> Self {
        let mut dom = Dom::new();
        let root = dom.create_element("body");
        Self {
            registry,
            tree: NodeTree::new(),
            dom,
            root,
            views: Views::default(),
            bridge: CompilationBridge::new(compiler),
            mask_interaction: true,
        }
    }

    /// Built-in kinds and the configured subprocess compiler
    pub fn from_config(config: &Config) -> Self {
        let mut canvas = Self::new(
            TypeRegistry::with_builtin_kinds(),
            config.compiler.command_compiler(),
        );
        canvas.mask_interaction = config.mask_interaction;
        canvas
    }

    pub fn set_mask_interaction(&mut self, enabled: bool) {
        self.mask_interaction = enabled;
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Mutations made here are picked up by the next [`Canvas::flush`]
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Element every mounted root view is appended to
    pub fn root(&self) -> DomId {
        self.root
    }

    /// Number of compiler invocations so far
    pub fn compilations(&self) -> u64 {
        self.bridge.compilations()
    }

    pub fn view_of(&self, node: NodeId) -> Option<ViewId> {
        self.views.of_node(node)
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.get(id)
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn el_of(&self, node: NodeId) -> Option<DomId> {
        self.view_of(node).and_then(|id| self.views.get(id)).map(View::el)
    }

    // ---- Nodes -----------------------------------------------------------

    /// New node of the kind recognizing `tag`
    pub fn create(&mut self, tag: &str) -> NodeId {
        self.registry.create(&mut self.tree, tag)
    }

    pub fn import(&mut self, markup: &str) -> Result<NodeId, ImportError> {
        import_markup(&self.registry, &mut self.tree, markup)
    }

    /// Destroy `node` and its subtree, then flush so views are released and
    /// the old parent re-renders
    pub fn remove(&mut self, node: NodeId) -> Result<FlushReport, RenderError> {
        self.tree.remove(node)?;
        Ok(self.flush())
    }

    /// Canonical markup of `node`'s subtree
    pub fn export(&self, node: NodeId) -> Result<String, RenderError> {
        Ok(to_markup(&self.tree, node)?)
    }

    // ---- Views -----------------------------------------------------------

    /// Create a view for `node`, append it to the root element and render it
    /// cold
    #[instrument(skip(self))]
    pub fn mount(&mut self, node: NodeId) -> Result<FlushReport, RenderError> {
        self.tree.get(node)?;
        if let Some(existing) = self.views.of_node(node) {
            self.destroy_view(existing);
        }
        let view = self.create_view(node)?;
        let el = self.view_el(view, node)?;
        self.dom.append_child(self.root, el)?;

        let mut report = FlushReport::default();
        self.render_into(node, RenderPath::Cold, &mut report);
        Ok(report)
    }

    /// Destroy `node`'s view subtree and free its elements
    pub fn unmount(&mut self, node: NodeId) -> bool {
        match self.views.of_node(node) {
            Some(view) => {
                self.destroy_view(view);
                true
            }
            None => false,
        }
    }

    #[instrument(skip(self))]
    pub fn render(&mut self, node: NodeId, path: RenderPath) -> FlushReport {
        let mut report = FlushReport::default();
        self.render_into(node, path, &mut report);
        report
    }

    /// Drain queued node events and re-render each affected view once
    ///
    /// A `Children` event makes the node's render cold; any other event
    /// renders it warm. Removed nodes lose their views first, and the rest
    /// render parents before children.
    #[instrument(skip(self))]
    pub fn flush(&mut self) -> FlushReport {
        let mut report = FlushReport::default();
        let mut plan: HashMap<NodeId, RenderPath> = HashMap::new();
        let mut removed = Vec::new();

        for delivery in self.tree.drain_events() {
            let node = delivery.event.node;
            match delivery.event.kind {
                EventKind::Removed => removed.push(node),
                EventKind::Children => {
                    plan.insert(node, RenderPath::Cold);
                }
                _ => {
                    plan.entry(node).or_insert(RenderPath::Warm);
                }
            }
        }

        for node in removed {
            plan.remove(&node);
            if let Some(view) = self.views.of_node(node) {
                self.destroy_view(view);
            }
        }

        let mut order: Vec<(usize, NodeId, RenderPath)> = plan
            .into_iter()
            .filter(|(node, _)| self.tree.contains(*node))
            .map(|(node, path)| (self.tree.depth(node), node, path))
            .collect();
        order.sort_by_key(|(depth, node, _)| (*depth, *node));

        for (_, node, path) in order {
            // Cold parents re-render their children; detached nodes lost
            // their view with the parent's child collection
            if report.touched(node) || self.views.of_node(node).is_none() {
                continue;
            }
            self.render_into(node, path, &mut report);
        }

        debug!(
            rendered = report.rendered.len(),
            failures = report.failures.len(),
            "Flushed canvas"
        );
        report
    }

    /// Static HTML for `node`: its compiled fragment with content and
    /// children previews spliced in at the container
    pub fn preview_html(&mut self, node: NodeId) -> Result<String, RenderError> {
        let (compiled, prepared) = {
            let n = self.tree.get(node)?;
            let kind = self
                .registry
                .get(n.kind())
                .ok_or_else(|| RenderError::UnknownKind(n.kind().to_string()))?;
            let compiled = self.bridge.compile(n, &kind.template)?;
            (compiled, prepare(n, kind.template.children_selector.clone()))
        };

        let mut out = compiled.start;
        if !prepared.void {
            if let Some(content) = &prepared.content {
                out.push_str(content);
            }
            for child in prepared.children {
                out.push_str(&self.preview_html(child)?);
            }
        }
        out.push_str(&compiled.end);
        Ok(out)
    }

    /// Live HTML of everything mounted
    pub fn html(&self) -> Result<String, RenderError> {
        Ok(self.dom.inner_html(self.root)?)
    }

    // ---- Internals -------------------------------------------------------

    fn view_el(&self, view: ViewId, node: NodeId) -> Result<DomId, RenderError> {
        self.views
            .get(view)
            .map(View::el)
            .ok_or(RenderError::NotMounted(node))
    }

    fn create_view(&mut self, node: NodeId) -> Result<ViewId, RenderError> {
        let (el, style) = {
            let n = self.tree.get(node)?;
            let kind = self
                .registry
                .get(n.kind())
                .ok_or_else(|| RenderError::UnknownKind(n.kind().to_string()))?;
            (
                self.dom.create_element(kind.view_tag.as_str()),
                InlineStyle::parse(&kind.view_style),
            )
        };
        let id = self.views.insert(node, el, style);

        let mut subscriptions = Vec::with_capacity(VIEW_EVENTS.len());
        for kind in VIEW_EVENTS {
            subscriptions.push(self.tree.listen_to(node, *kind)?);
        }
        if let Some(view) = self.views.get_mut(id) {
            view.subscriptions = subscriptions;
        }
        debug!(node = %node, view = %id, "Created view");
        Ok(id)
    }

    fn destroy_view(&mut self, id: ViewId) {
        let Some(view) = self.views.remove(id) else {
            return;
        };
        for subscription in &view.subscriptions {
            self.tree.stop_listening(*subscription);
        }
        if let Some(children) = &view.child_views {
            for child in &children.views {
                self.destroy_view(*child);
            }
        }
        if let Err(error) = self.dom.remove(view.el) {
            debug!(view = %id, error = %error, "View element already freed");
        }
        debug!(node = %view.node, view = %id, "Destroyed view");
    }

    fn destroy_child_views(&mut self, id: ViewId) {
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        let children = view.child_views.take();
        view.child_els.clear();
        if let Some(children) = children {
            for child in children.views {
                self.destroy_view(child);
            }
        }
    }

    fn render_into(&mut self, node: NodeId, path: RenderPath, report: &mut FlushReport) {
        let Some(view) = self.views.of_node(node) else {
            report.failures.push(RenderFailure {
                node,
                error: RenderError::NotMounted(node),
            });
            return;
        };

        match self.render_view(view, node, path, report) {
            Ok(()) => report.rendered.push(node),
            Err(error) => {
                warn!(node = %node, error = %error, "Render failed");
                self.fail_view(view);
                report.failures.push(RenderFailure { node, error });
            }
        }
    }

    /// Leave `el` empty and drop the child cache so the next render is cold
    fn fail_view(&mut self, id: ViewId) {
        self.destroy_child_views(id);
        let Some(view) = self.views.get_mut(id) else {
            return;
        };
        view.failed = true;
        let el = view.el;
        if let Err(error) = self.dom.clear_children(el) {
            debug!(view = %id, error = %error, "Failed view element already freed");
        }
    }

    fn render_view(
        &mut self,
        id: ViewId,
        node: NodeId,
        path: RenderPath,
        report: &mut FlushReport,
    ) -> Result<(), RenderError> {
        let view = self.views.get_mut(id).ok_or(RenderError::NotMounted(node))?;
        let el = view.el;
        let path = if view.failed || view.child_views.is_none() {
            RenderPath::Cold
        } else {
            path
        };

        match path {
            RenderPath::Cold => self.destroy_child_views(id),
            RenderPath::Warm => {
                let dom = &mut self.dom;
                view.child_els.retain(|child| dom.contains(*child));
                for child in &view.child_els {
                    dom.detach(*child)?;
                }
            }
        }

        // Apply attributes, compile and mount
        let (compiled, prepared) = {
            let n = self.tree.get(node)?;
            let kind = self
                .registry
                .get(n.kind())
                .ok_or_else(|| RenderError::UnknownKind(n.kind().to_string()))?;

            self.dom.clear_attributes(el)?;
            for (name, value) in n.attributes() {
                if name != "style" {
                    self.dom.set_attribute(el, name.as_str(), value.as_str())?;
                }
            }

            let compiled = self.bridge.compile(n, &kind.template)?;
            (compiled, prepare(n, kind.template.children_selector.clone()))
        };

        self.dom.clear_children(el)?;
        self.dom.set_inner_html(el, &compiled.html())?;

        let container = match &prepared.children_selector {
            Some(selector) => self.dom.query_selector(el, selector)?.ok_or_else(|| {
                RenderError::ExtractionMiss {
                    kind: prepared.kind.clone(),
                    selector: selector.clone(),
                }
            })?,
            None => el,
        };

        if !prepared.void {
            if let Some(content) = &prepared.content {
                self.dom.set_inner_html(container, content)?;
            }
        }

        if prepared.void {
            self.destroy_child_views(id);
            self.set_child_views(id, container);
        } else {
            match path {
                RenderPath::Cold => {
                    self.set_child_views(id, container);
                    for child in prepared.children {
                        self.render_child(id, container, child, report)?;
                    }
                }
                RenderPath::Warm => {
                    let view = self.views.get_mut(id).ok_or(RenderError::NotMounted(node))?;
                    if let Some(children) = view.child_views.as_mut() {
                        children.container = container;
                    }
                    for child in &view.child_els {
                        self.dom.append_child(container, *child)?;
                    }
                }
            }
        }

        if self.mask_interaction && container != el {
            self.mask(el, container)?;
        }

        let view = self.views.get_mut(id).ok_or(RenderError::NotMounted(node))?;
        self.dom.set_style(el, view.style.clone())?;
        view.failed = false;
        view.render_count += 1;

        debug!(node = %node, view = %id, path = ?path, "Rendered view");
        Ok(())
    }

    fn set_child_views(&mut self, id: ViewId, container: DomId) {
        if let Some(view) = self.views.get_mut(id) {
            view.child_views = Some(ChildViews {
                container,
                views: Vec::new(),
            });
            view.child_els.clear();
        }
    }

    /// Cold path: fresh view for `child`, appended under `container`
    fn render_child(
        &mut self,
        parent: ViewId,
        container: DomId,
        child: NodeId,
        report: &mut FlushReport,
    ) -> Result<(), RenderError> {
        // A node moved in from another parent drops its old view
        if let Some(existing) = self.views.of_node(child) {
            self.destroy_view(existing);
        }
        let view = self.create_view(child)?;
        let child_el = self.view_el(view, child)?;

        if let Some(parent_view) = self.views.get_mut(parent) {
            parent_view.child_els.push(child_el);
            if let Some(children) = parent_view.child_views.as_mut() {
                children.views.push(view);
            }
        }

        self.dom.append_child(container, child_el)?;
        self.render_into(child, RenderPath::Cold, report);
        Ok(())
    }

    /// Disable pointer events on everything under `parent` except the
    /// children container, which is not entered
    fn mask(&mut self, parent: DomId, container: DomId) -> Result<(), RenderError> {
        for child in self.dom.element_children(parent)? {
            if child == container {
                continue;
            }
            self.dom.set_style_property(child, "pointer-events", "none")?;
            self.mask(child, container)?;
        }
        Ok(())
    }
}

fn prepare(node: &Node, children_selector: Option<String>) -> Prepared {
    let content = node.content();
    Prepared {
        kind: node.kind().to_string(),
        children_selector,
        void: node.is_void(),
        content: (!content.trim().is_empty()).then(|| content.to_string()),
        children: node.children().to_vec(),
    }
}

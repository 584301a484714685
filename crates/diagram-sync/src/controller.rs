use crate::ids::IdSource;
use crate::sample::sample_document;
use crate::scheduler::{Clock, Scheduler, SystemClock, TaskKind};
use crate::settings::SyncSettings;
use crate::snapshot::load_saved_graph;
use crate::view::ViewAdapter;
use diagram_core::{
    CONNECTED_EDGE_STROKE, DiagramError, Edge, EdgeStyle, Graph, Node, NodeData, Position,
    normalize_edges, normalize_nodes,
};
use diagram_events::FormState;
use diagram_layout::{LayeredLayouter, LayoutEngine, Layouter};
use diagram_storage::DiagramStore;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

pub const EXPORT_FILE_NAME: &str = "diagram-export.json";

/// Data keys owned by typed `NodeData` fields or by the view.
const RESERVED_DATA_KEYS: &[&str] = &["label", "desc", "onDelete"];

/// Where a node lands before the relayout that follows its creation.
pub const DEFAULT_NEW_NODE_POSITION: Position = Position { x: 250.0, y: 150.0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Mutating,
    Relayouting,
    Persisting,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDataPatch {
    pub label: Option<String>,
    pub desc: Option<String>,
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeChanges {
    pub data: Option<NodeDataPatch>,
    pub position: Option<Position>,
}

impl NodeChanges {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            data: Some(NodeDataPatch {
                label: Some(label.into()),
                ..NodeDataPatch::default()
            }),
            position: None,
        }
    }

    pub fn position(position: Position) -> Self {
        Self {
            data: None,
            position: Some(position),
        }
    }
}

/// Shallow edge patch. An empty `label` clears the label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeChanges {
    pub label: Option<String>,
    pub animated: Option<bool>,
    pub style: Option<EdgeStyle>,
    pub source: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    pub form: FormState,
    pub selected_node: Option<String>,
    pub selected_edge: Option<String>,
}

/// Owns the diagram and mediates every change to it.
///
/// Each command mutates the graph, relayouts when the command calls for it,
/// writes the result through to storage and re-renders. Viewport refits are
/// deferred onto the scheduler and fired by [`SyncController::poll`].
pub struct SyncController {
    graph: Graph,
    store: DiagramStore,
    view: Box<dyn ViewAdapter>,
    engine: LayoutEngine<Box<dyn Layouter>>,
    settings: SyncSettings,
    scheduler: Scheduler,
    ids: IdSource,
    editor: EditorState,
    phase: SyncPhase,
    container_width: f64,
    last_node_count: usize,
}

impl SyncController {
    pub fn new(store: DiagramStore, view: impl ViewAdapter + 'static, settings: SyncSettings) -> Self {
        Self::with_clock(store, Box::new(view), settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: DiagramStore,
        view: Box<dyn ViewAdapter>,
        settings: SyncSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            graph: Graph::new(),
            store,
            view,
            engine: LayoutEngine::<Box<dyn Layouter>>::with_layouter(Box::new(LayeredLayouter)),
            container_width: settings.default_container_width,
            settings,
            scheduler: Scheduler::new(clock),
            ids: IdSource::default(),
            editor: EditorState::default(),
            phase: SyncPhase::Idle,
            last_node_count: 0,
        }
    }

    /// Swaps the layout algorithm.
    pub fn with_layouter(mut self, layouter: impl Layouter + 'static) -> Self {
        self.engine = LayoutEngine::<Box<dyn Layouter>>::with_layouter(Box::new(layouter));
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn container_width(&self) -> f64 {
        self.container_width
    }

    pub fn store(&self) -> &DiagramStore {
        &self.store
    }

    /// Restores the persisted diagram, or the bundled sample when nothing
    /// usable was saved.
    pub fn bootstrap(&mut self) {
        self.begin("bootstrap");
        let (nodes, edges) = match load_saved_graph(&self.store) {
            Some(saved) => {
                tracing::info!(
                    "Restored {} nodes and {} edges from {}",
                    saved.node_count(),
                    saved.edge_count(),
                    self.store.key()
                );
                (saved.nodes().to_vec(), saved.edges().to_vec())
            }
            None => {
                tracing::info!("No saved diagram, loading sample");
                let sample = sample_document();
                (normalize_nodes(&sample["nodes"]), normalize_edges(&sample["edges"]))
            }
        };

        self.adopt(nodes, edges);
        self.persist();
        self.schedule_fit_view(self.settings.fit_view_delay());
        self.finish();
    }

    pub fn add_node(
        &mut self,
        label: &str,
        desc: &str,
        position: Option<Position>,
    ) -> Result<String, DiagramError> {
        self.begin("add_node");
        let id = self.ids.next_id("n", |id| self.graph.contains_node(id));
        let label = if label.is_empty() {
            format!("Node {}", self.graph.node_count() + 1)
        } else {
            label.to_string()
        };
        let node = Node::new(
            id.clone(),
            position.unwrap_or(DEFAULT_NEW_NODE_POSITION),
            NodeData::new(label, desc),
        );
        if let Err(err) = self.graph.push_node(node) {
            self.phase = SyncPhase::Idle;
            return Err(err);
        }

        self.relayout();
        self.persist();
        self.set_form(FormState::Closed);
        self.schedule_fit_view(self.settings.add_node_fit_view_delay());
        self.finish();
        Ok(id)
    }

    /// Merges `changes` into node `id`. Returns `false` for an unknown id.
    pub fn update_node(&mut self, id: &str, changes: NodeChanges) -> bool {
        self.begin("update_node");
        let Some(node) = self.graph.node_mut(id) else {
            tracing::debug!("update_node: no node {}", id);
            self.phase = SyncPhase::Idle;
            return false;
        };

        if let Some(patch) = changes.data {
            if let Some(label) = patch.label {
                node.data.label = label;
            }
            if let Some(desc) = patch.desc {
                node.data.desc = desc;
            }
            node.data.extra.extend(
                patch
                    .extra
                    .into_iter()
                    .filter(|(key, _)| !RESERVED_DATA_KEYS.contains(&key.as_str())),
            );
        }
        if let Some(position) = changes.position {
            node.position = position;
        }

        self.persist();
        self.close_forms_quietly();
        self.finish();
        true
    }

    /// Removes node `id` and every edge touching it.
    pub fn delete_node(&mut self, id: &str) -> bool {
        self.begin("delete_node");
        let Some(removed_edges) = self.graph.remove_node_cascade(id) else {
            tracing::debug!("delete_node: no node {}", id);
            self.phase = SyncPhase::Idle;
            return false;
        };
        tracing::debug!("Deleted node {} and {} edges", id, removed_edges.len());

        self.persist();
        self.close_forms_quietly();
        self.schedule_fit_view(self.settings.fit_view_delay());
        self.finish();
        true
    }

    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        label: Option<&str>,
    ) -> Result<String, DiagramError> {
        self.begin("connect");
        let id = self.ids.next_id("e", |id| self.graph.contains_edge(id));
        let mut edge = Edge::new(id.clone(), source, target);
        edge.label = label.filter(|l| !l.is_empty()).map(str::to_string);
        edge.style = EdgeStyle::with_stroke(CONNECTED_EDGE_STROKE);

        if !self.graph.contains_node(source) || !self.graph.contains_node(target) {
            tracing::debug!("connect: edge {} has a missing endpoint", id);
        }
        if let Err(err) = self.graph.push_edge(edge) {
            self.phase = SyncPhase::Idle;
            return Err(err);
        }

        self.persist();
        self.finish();
        Ok(id)
    }

    pub fn update_edge(&mut self, id: &str, changes: EdgeChanges) -> bool {
        self.begin("update_edge");
        let Some(edge) = self.graph.edge_mut(id) else {
            tracing::debug!("update_edge: no edge {}", id);
            self.phase = SyncPhase::Idle;
            return false;
        };

        if let Some(label) = changes.label {
            edge.label = (!label.is_empty()).then_some(label);
        }
        if let Some(animated) = changes.animated {
            edge.animated = animated;
        }
        if let Some(style) = changes.style {
            edge.style = style;
        }
        if let Some(source) = changes.source {
            edge.source = source;
        }
        if let Some(target) = changes.target {
            edge.target = target;
        }

        self.persist();
        self.close_forms_quietly();
        self.finish();
        true
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        self.begin("delete_edge");
        if self.graph.remove_edge(id).is_none() {
            tracing::debug!("delete_edge: no edge {}", id);
            self.phase = SyncPhase::Idle;
            return false;
        }

        self.persist();
        self.schedule_fit_view(self.settings.fit_view_delay());
        self.finish();
        true
    }

    /// Replaces the whole diagram with an imported document.
    ///
    /// Both `nodes` and `edges` must be arrays; otherwise nothing changes and
    /// the view is alerted.
    pub fn import_graph(&mut self, raw: &Value) -> Result<(), DiagramError> {
        let (Some(raw_nodes), Some(raw_edges)) = (
            raw.get("nodes").filter(|v| v.is_array()),
            raw.get("edges").filter(|v| v.is_array()),
        ) else {
            return Err(self.reject(DiagramError::InvalidImport));
        };

        self.begin("import_graph");
        let nodes = normalize_nodes(raw_nodes);
        let edges = normalize_edges(raw_edges);
        tracing::info!("Importing {} nodes and {} edges", nodes.len(), edges.len());

        self.adopt(nodes, edges);
        self.persist();
        self.close_forms_quietly();
        self.schedule_fit_view(self.settings.fit_view_delay());
        self.finish();
        Ok(())
    }

    pub fn import_json(&mut self, text: &str) -> Result<(), DiagramError> {
        match serde_json::from_str::<Value>(text) {
            Ok(raw) => self.import_graph(&raw),
            Err(err) => Err(self.reject(DiagramError::InvalidJson(err))),
        }
    }

    /// Pretty-printed `{nodes, edges}` document of the current diagram.
    pub fn export_graph(&self) -> Result<String, DiagramError> {
        Ok(serde_json::to_string_pretty(&self.graph.to_document())?)
    }

    /// Empties the diagram and purges its persisted copy.
    pub fn clear_graph(&mut self) {
        self.begin("clear_graph");
        self.graph.clear();
        self.phase = SyncPhase::Persisting;
        if let Err(err) = self.store.clear() {
            tracing::warn!("Failed to clear saved diagram: {}", err);
        }
        tracing::info!("Cleared diagram");
        self.close_forms_quietly();
        self.finish();
    }

    pub fn reset_to_sample(&mut self) -> Result<(), DiagramError> {
        self.import_graph(&sample_document())
    }

    /// Records the new container width and relayouts once resizing settles.
    pub fn on_viewport_resize(&mut self, container_width: f64) {
        self.container_width = container_width;
        self.scheduler
            .schedule(TaskKind::ViewportRelayout, self.settings.resize_settle());
    }

    /// Refits the viewport once the node count stops changing.
    pub fn on_node_count_change(&mut self) {
        self.scheduler
            .schedule(TaskKind::CountFitView, self.settings.count_settle());
    }

    /// Runs every due deferred task. Returns whether any task is still
    /// pending.
    pub fn poll(&mut self) -> bool {
        for handle in self.scheduler.take_due() {
            tracing::debug!("Firing {:?} (generation {})", handle.kind, handle.generation);
            match handle.kind {
                TaskKind::FitView | TaskKind::CountFitView => {
                    self.view.fit_view(self.settings.fit_view_padding);
                }
                TaskKind::ViewportRelayout => self.relayout_for_viewport(),
            }
        }
        self.scheduler.has_pending()
    }

    pub fn on_node_double_click(&mut self, id: &str) -> bool {
        if !self.graph.contains_node(id) {
            return false;
        }
        self.editor.selected_node = Some(id.to_string());
        self.editor.selected_edge = None;
        self.set_form(FormState::EditNode { id: id.to_string() });
        true
    }

    pub fn on_edge_double_click(&mut self, id: &str) -> bool {
        if !self.graph.contains_edge(id) {
            return false;
        }
        self.editor.selected_edge = Some(id.to_string());
        self.editor.selected_node = None;
        self.set_form(FormState::EditEdge { id: id.to_string() });
        true
    }

    pub fn open_add_node_form(&mut self) {
        self.editor.selected_node = None;
        self.editor.selected_edge = None;
        self.set_form(FormState::AddNode);
    }

    pub fn close_forms(&mut self) {
        self.close_forms_quietly();
    }

    fn begin(&mut self, command: &str) {
        self.phase = SyncPhase::Mutating;
        tracing::debug!(
            "{} ({} nodes, {} edges)",
            command,
            self.graph.node_count(),
            self.graph.edge_count()
        );
    }

    fn reject(&mut self, err: DiagramError) -> DiagramError {
        tracing::warn!("Import rejected: {}", err);
        if err.is_user_facing() {
            self.view.alert(&err.to_string());
        }
        err
    }

    /// Lays out `nodes` and makes them, with `edges`, the whole diagram.
    fn adopt(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.phase = SyncPhase::Relayouting;
        let options = self.settings.layout_options(self.container_width);
        let nodes = self.engine.apply_layout(nodes, &edges, &options);
        self.graph.replace(nodes, edges);
        self.view
            .layout_applied(self.graph.node_count(), options.direction);
    }

    fn relayout(&mut self) {
        self.phase = SyncPhase::Relayouting;
        let options = self.settings.layout_options(self.container_width);
        let patch = self
            .engine
            .compute_layout(self.graph.nodes(), self.graph.edges(), &options);
        self.graph.set_positions(&patch);
        self.view
            .layout_applied(self.graph.node_count(), options.direction);
    }

    fn relayout_for_viewport(&mut self) {
        tracing::debug!("Viewport settled at width {}", self.container_width);
        self.relayout();
        self.persist();
        self.view.fit_view(self.settings.fit_view_padding);
        self.finish();
    }

    fn persist(&mut self) {
        self.phase = SyncPhase::Persisting;
        if let Err(err) = self.store.save_graph(&self.graph) {
            tracing::warn!("Failed to persist diagram: {}", err);
        }
    }

    fn finish(&mut self) {
        self.view.render(&self.graph);
        let count = self.graph.node_count();
        if count != self.last_node_count {
            self.last_node_count = count;
            self.on_node_count_change();
        }
        self.phase = SyncPhase::Idle;
    }

    fn schedule_fit_view(&mut self, delay: Duration) {
        self.scheduler.schedule(TaskKind::FitView, delay);
    }

    fn set_form(&mut self, form: FormState) {
        if self.editor.form != form {
            self.editor.form = form;
            self.view.form_changed(&self.editor.form);
        }
    }

    fn close_forms_quietly(&mut self) {
        self.editor.selected_node = None;
        self.editor.selected_edge = None;
        self.set_form(FormState::Closed);
    }
}

use crate::graph::{LayoutGraph, Vec2};
use crate::layout::{LayeredLayouter, Layouter};
use crate::options::{LayoutError, LayoutOptions};
use diagram_core::{Edge, Node, Position, PositionPatch};

/// Best-effort layout: a failing layouter never blocks the caller, it just
/// leaves positions where they were.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine<L: Layouter = LayeredLayouter> {
    layouter: L,
}

impl LayoutEngine<LayeredLayouter> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: Layouter> LayoutEngine<L> {
    pub fn with_layouter(layouter: L) -> Self {
        Self { layouter }
    }

    /// Runs the layouter and maps results back to node ids.
    pub fn try_compute_layout(
        &self,
        nodes: &[Node],
        edges: &[Edge],
        options: &LayoutOptions,
    ) -> Result<PositionPatch, LayoutError> {
        let size = Vec2::new(options.node_width, options.node_height);
        let graph = LayoutGraph::from_elements(nodes, edges, size);
        let positions = self.layouter.execute(&graph, options)?;

        Ok(positions
            .into_iter()
            .map(|(idx, pos)| (graph[idx].id.clone(), Position::new(pos.x, pos.y)))
            .collect())
    }

    /// Positions keyed by node id. On failure the input positions are
    /// returned unchanged.
    pub fn compute_layout(
        &self,
        nodes: &[Node],
        edges: &[Edge],
        options: &LayoutOptions,
    ) -> PositionPatch {
        match self.try_compute_layout(nodes, edges, options) {
            Ok(patch) => {
                tracing::debug!(
                    "Laid out {} nodes ({} edges, direction {})",
                    patch.len(),
                    edges.len(),
                    options.direction
                );
                patch
            }
            Err(err) => {
                tracing::warn!("Layout failed, keeping current positions: {}", err);
                nodes
                    .iter()
                    .map(|n| (n.id.clone(), n.position))
                    .collect()
            }
        }
    }

    /// Returns `nodes` with positions replaced by the computed layout.
    /// Nodes the layout did not place keep their position.
    pub fn apply_layout(
        &self,
        nodes: Vec<Node>,
        edges: &[Edge],
        options: &LayoutOptions,
    ) -> Vec<Node> {
        let patch = self.compute_layout(&nodes, edges, options);
        nodes
            .into_iter()
            .map(|mut node| {
                if let Some(&position) = patch.get(&node.id) {
                    node.position = position;
                }
                node
            })
            .collect()
    }
}

use crate::graph::{LayoutGraph, NodeIndex, Vec2};
use crate::options::{LayoutError, LayoutOptions};
use diagram_core::LayoutDirection;
use std::collections::{HashMap, VecDeque};

pub trait Layouter {
    /// Computes the top-left corner of every node in `graph`.
    fn execute(
        &self,
        graph: &LayoutGraph,
        options: &LayoutOptions,
    ) -> Result<HashMap<NodeIndex, Vec2>, LayoutError>;
}

impl<T: Layouter + ?Sized> Layouter for Box<T> {
    fn execute(
        &self,
        graph: &LayoutGraph,
        options: &LayoutOptions,
    ) -> Result<HashMap<NodeIndex, Vec2>, LayoutError> {
        (**self).execute(graph, options)
    }
}

/// Layered (Sugiyama-style) layout.
///
/// Cycles are broken by reversing DFS back edges, nodes are ranked by the
/// longest path from a source, ranks are ordered with barycenter sweeps, and
/// every rank is centered against the widest one.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredLayouter;

#[derive(Default)]
struct Adjacency {
    dag_edges: Vec<(NodeIndex, NodeIndex)>,
    incoming: HashMap<NodeIndex, Vec<NodeIndex>>,
    outgoing: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl LayeredLayouter {
    const BARYCENTER_PASSES: usize = 2;

    fn successors(graph: &LayoutGraph) -> Vec<Vec<NodeIndex>> {
        let mut successors = vec![Vec::new(); graph.node_count()];
        for edge_idx in graph.edge_indices() {
            if let Some((source, target)) = graph.edge_endpoints(edge_idx)
                && source != target
            {
                successors[source.0].push(target);
            }
        }
        successors
    }

    /// Reverses every edge that closes a cycle in an input-order DFS, which
    /// leaves a DAG with the same node set.
    fn build_acyclic(graph: &LayoutGraph) -> Adjacency {
        #[derive(Clone, Copy, PartialEq)]
        enum Visit {
            New,
            OnStack,
            Done,
        }

        let successors = Self::successors(graph);
        let mut state = vec![Visit::New; graph.node_count()];
        let mut adjacency = Adjacency::default();
        let mut reversed = 0usize;

        for root in graph.node_indices() {
            if state[root.0] != Visit::New {
                continue;
            }
            let mut stack: Vec<(NodeIndex, usize)> = vec![(root, 0)];
            state[root.0] = Visit::OnStack;

            while let Some(frame) = stack.last_mut() {
                let (node, next) = *frame;
                let Some(&target) = successors[node.0].get(next) else {
                    state[node.0] = Visit::Done;
                    stack.pop();
                    continue;
                };
                frame.1 += 1;

                match state[target.0] {
                    Visit::OnStack => {
                        adjacency.dag_edges.push((target, node));
                        reversed += 1;
                    }
                    Visit::New => {
                        adjacency.dag_edges.push((node, target));
                        state[target.0] = Visit::OnStack;
                        stack.push((target, 0));
                    }
                    Visit::Done => adjacency.dag_edges.push((node, target)),
                }
            }
        }

        if reversed > 0 {
            tracing::debug!("Reversed {} edges to break cycles", reversed);
        }

        for &(source, target) in &adjacency.dag_edges {
            adjacency.outgoing.entry(source).or_default().push(target);
            adjacency.incoming.entry(target).or_default().push(source);
        }
        adjacency
    }

    /// Longest path from any source, visited in topological order.
    fn assign_ranks(graph: &LayoutGraph, adjacency: &Adjacency) -> Vec<usize> {
        let mut in_degree = vec![0usize; graph.node_count()];
        for &(_, target) in &adjacency.dag_edges {
            in_degree[target.0] += 1;
        }

        let mut ranks = vec![0usize; graph.node_count()];
        let mut queue: VecDeque<NodeIndex> = graph
            .node_indices()
            .filter(|idx| in_degree[idx.0] == 0)
            .collect();

        while let Some(node) = queue.pop_front() {
            let Some(targets) = adjacency.outgoing.get(&node) else {
                continue;
            };
            for &target in targets {
                ranks[target.0] = ranks[target.0].max(ranks[node.0] + 1);
                in_degree[target.0] -= 1;
                if in_degree[target.0] == 0 {
                    queue.push_back(target);
                }
            }
        }

        ranks
    }

    fn build_layers(graph: &LayoutGraph, ranks: &[usize]) -> Vec<Vec<NodeIndex>> {
        let layer_count = ranks.iter().copied().max().map_or(0, |max| max + 1);
        let mut layers = vec![Vec::new(); layer_count];
        for node in graph.node_indices() {
            layers[ranks[node.0]].push(node);
        }
        layers
    }

    fn initialize_layer_coords(layers: &[Vec<NodeIndex>]) -> HashMap<NodeIndex, f64> {
        let mut layer_coords = HashMap::new();
        for layer_nodes in layers {
            for (j, &node_idx) in layer_nodes.iter().enumerate() {
                layer_coords.insert(node_idx, j as f64);
            }
        }
        layer_coords
    }

    fn order_layer_by_barycenter(
        layer_nodes: &mut [NodeIndex],
        layer_coords: &HashMap<NodeIndex, f64>,
        neighbors: &HashMap<NodeIndex, Vec<NodeIndex>>,
    ) {
        let mut barycenters: HashMap<NodeIndex, f64> = HashMap::new();

        for &node_idx in layer_nodes.iter() {
            let mut sum = 0.0;
            let mut count = 0;

            if let Some(adjacent) = neighbors.get(&node_idx) {
                for neighbor in adjacent {
                    if let Some(&coord) = layer_coords.get(neighbor) {
                        sum += coord;
                        count += 1;
                    }
                }
            }

            let barycenter = if count > 0 {
                sum / count as f64
            } else {
                *layer_coords.get(&node_idx).unwrap_or(&0.0)
            };
            barycenters.insert(node_idx, barycenter);
        }

        // Stable sort keeps input order among ties, so repeated runs agree.
        layer_nodes.sort_by(|a, b| {
            barycenters
                .get(a)
                .unwrap_or(&0.0)
                .partial_cmp(barycenters.get(b).unwrap_or(&0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    fn reindex(layer_nodes: &[NodeIndex], layer_coords: &mut HashMap<NodeIndex, f64>) {
        for (j, &node_idx) in layer_nodes.iter().enumerate() {
            layer_coords.insert(node_idx, j as f64);
        }
    }

    fn run_barycenter_passes(layers: &mut [Vec<NodeIndex>], adjacency: &Adjacency) {
        let mut layer_coords = Self::initialize_layer_coords(layers);

        for _ in 0..Self::BARYCENTER_PASSES {
            for layer_nodes in layers.iter_mut().skip(1) {
                Self::order_layer_by_barycenter(layer_nodes, &layer_coords, &adjacency.incoming);
                Self::reindex(layer_nodes, &mut layer_coords);
            }

            let len = layers.len();
            for layer_nodes in layers.iter_mut().take(len.saturating_sub(1)).rev() {
                Self::order_layer_by_barycenter(layer_nodes, &layer_coords, &adjacency.outgoing);
                Self::reindex(layer_nodes, &mut layer_coords);
            }
        }
    }

    fn layer_extent(layer_len: usize, options: &LayoutOptions) -> f64 {
        layer_len as f64 * options.cross_extent()
            + layer_len.saturating_sub(1) as f64 * options.gap
    }

    fn place_layers(
        layers: &[Vec<NodeIndex>],
        options: &LayoutOptions,
    ) -> HashMap<NodeIndex, Vec2> {
        let widest = layers
            .iter()
            .map(|layer| Self::layer_extent(layer.len(), options))
            .fold(0.0, f64::max);
        let rank_step = options.rank_extent() + options.gap;
        let cross_step = options.cross_extent() + options.gap;

        let mut positions = HashMap::new();
        for (rank, layer_nodes) in layers.iter().enumerate() {
            let offset = (widest - Self::layer_extent(layer_nodes.len(), options)) / 2.0;
            let rank_pos = options.margin + rank as f64 * rank_step;

            for (j, &node_idx) in layer_nodes.iter().enumerate() {
                let cross_pos = options.margin + offset + j as f64 * cross_step;
                let position = match options.direction {
                    LayoutDirection::LeftToRight => Vec2::new(rank_pos, cross_pos),
                    LayoutDirection::TopToBottom => Vec2::new(cross_pos, rank_pos),
                };
                positions.insert(node_idx, position);
            }
        }
        positions
    }
}

impl Layouter for LayeredLayouter {
    fn execute(
        &self,
        graph: &LayoutGraph,
        options: &LayoutOptions,
    ) -> Result<HashMap<NodeIndex, Vec2>, LayoutError> {
        options.validate()?;
        if graph.node_count() == 0 {
            return Ok(HashMap::new());
        }

        let adjacency = Self::build_acyclic(graph);
        let ranks = Self::assign_ranks(graph, &adjacency);
        let mut layers = Self::build_layers(graph, &ranks);
        Self::run_barycenter_passes(&mut layers, &adjacency);

        let positions = Self::place_layers(&layers, options);
        if positions.len() != graph.node_count() {
            return Err(LayoutError::Failed(format!(
                "placed {} of {} nodes",
                positions.len(),
                graph.node_count()
            )));
        }
        Ok(positions)
    }
}

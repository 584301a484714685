use diagram_core::{Edge, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeIndex(pub usize);

impl fmt::Display for EdgeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    pub size: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: String,
    pub source_idx: NodeIndex,
    pub target_idx: NodeIndex,
}

/// Directed graph fed to a [`crate::Layouter`]. Holds only ids and
/// footprints; everything else about the diagram stays with the caller.
#[derive(Debug, Default)]
pub struct LayoutGraph {
    nodes: Vec<LayoutNode>,
    edges: Vec<LayoutEdge>,
    pub node_map: HashMap<String, NodeIndex>,
}

impl LayoutGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph where every node gets the same `size` footprint.
    /// Edges with an endpoint outside `nodes` are skipped.
    pub fn from_elements(nodes: &[Node], edges: &[Edge], size: Vec2) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(&node.id, size);
        }
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    pub fn add_node(&mut self, id: &str, size: Vec2) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(id) {
            tracing::debug!("Duplicate node id {} ignored by layout", id);
            return idx;
        }
        let idx = NodeIndex(self.nodes.len());
        self.nodes.push(LayoutNode {
            id: id.to_string(),
            size,
        });
        self.node_map.insert(id.to_string(), idx);
        idx
    }

    pub fn add_edge(&mut self, edge: &Edge) -> Option<EdgeIndex> {
        if edge.source.is_empty() || edge.target.is_empty() {
            tracing::debug!("Skipping edge {} with an empty endpoint", edge.id);
            return None;
        }

        match (self.node_map.get(&edge.source), self.node_map.get(&edge.target)) {
            (Some(&source_idx), Some(&target_idx)) => {
                let idx = EdgeIndex(self.edges.len());
                self.edges.push(LayoutEdge {
                    id: edge.id.clone(),
                    source_idx,
                    target_idx,
                });
                Some(idx)
            }
            _ => {
                tracing::debug!(
                    "Skipping dangling edge {} ({} -> {})",
                    edge.id,
                    edge.source,
                    edge.target
                );
                None
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        (0..self.nodes.len()).map(NodeIndex)
    }

    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> {
        (0..self.edges.len()).map(EdgeIndex)
    }

    pub fn edge_endpoints(&self, index: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.edges
            .get(index.0)
            .map(|e| (e.source_idx, e.target_idx))
    }
}

impl Index<NodeIndex> for LayoutGraph {
    type Output = LayoutNode;
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}

impl Index<EdgeIndex> for LayoutGraph {
    type Output = LayoutEdge;
    fn index(&self, index: EdgeIndex) -> &Self::Output {
        &self.edges[index.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagram_core::{NodeData, Position};

    fn node(id: &str) -> Node {
        Node::new(id, Position::default(), NodeData::new(id, ""))
    }

    #[test]
    fn test_dangling_and_empty_edges_are_skipped() {
        let nodes = vec![node("a"), node("b")];
        let edges = vec![
            Edge::new("e1", "a", "b"),
            Edge::new("e2", "a", "ghost"),
            Edge::new("e3", "", "b"),
        ];
        let graph = LayoutGraph::from_elements(&nodes, &edges, Vec2::new(100.0, 30.0));

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph[EdgeIndex(0)].id, "e1");
    }

    #[test]
    fn test_duplicate_node_ids_keep_first() {
        let nodes = vec![node("a"), node("a")];
        let graph = LayoutGraph::from_elements(&nodes, &[], Vec2::new(1.0, 1.0));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node_map["a"], NodeIndex(0));
    }
}

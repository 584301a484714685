use crate::error::DiagramError;
use crate::model::{Edge, Node};
use crate::{Position, PositionPatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Serialized `{ "nodes": [...], "edges": [...] }` document used for
/// persistence, import and export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// A document whose lists have not been normalized yet.
///
/// Missing fields deserialize to `null`, which normalization treats as an
/// empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub nodes: Value,
    #[serde(default)]
    pub edges: Value,
}

impl RawDocument {
    pub fn is_array_shaped(&self) -> bool {
        self.nodes.is_array() && self.edges.is_array()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge(id).is_some()
    }

    pub fn push_node(&mut self, node: Node) -> Result<(), DiagramError> {
        if self.contains_node(&node.id) {
            return Err(DiagramError::DuplicateNodeId(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    pub fn push_edge(&mut self, edge: Edge) -> Result<(), DiagramError> {
        if self.contains_edge(&edge.id) {
            return Err(DiagramError::DuplicateEdgeId(edge.id));
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Removes the node and every edge that has it as source or target.
    /// Returns the removed edges, or `None` if no such node exists.
    pub fn remove_node_cascade(&mut self, id: &str) -> Option<Vec<Edge>> {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return None;
        }

        let (removed, kept): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.edges)
                .into_iter()
                .partition(|e| e.touches(id));
        self.edges = kept;
        Some(removed)
    }

    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        let index = self.edges.iter().position(|e| e.id == id)?;
        Some(self.edges.remove(index))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    pub fn replace(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = nodes;
        self.edges = edges;
    }

    /// Writes positions from a layout patch without touching any other field.
    /// Nodes missing from the patch keep their current position.
    pub fn set_positions(&mut self, patch: &PositionPatch) -> usize {
        let mut updated = 0;
        for node in &mut self.nodes {
            if let Some(&position) = patch.get(&node.id) {
                node.position = position;
                updated += 1;
            }
        }
        updated
    }

    pub fn position_of(&self, id: &str) -> Option<Position> {
        self.node(id).map(|n| n.position)
    }

    /// Edges whose source or target is absent from the node set.
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
            .collect()
    }

    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }
}

impl From<GraphDocument> for Graph {
    fn from(doc: GraphDocument) -> Self {
        Self::from_parts(doc.nodes, doc.edges)
    }
}

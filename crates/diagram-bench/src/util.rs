use diagram_core::{Edge, Node, NodeData, Position};
use serde_json::{Value, json};

/// A layered DAG: `layers` ranks of `width` nodes, each node wired to two
/// nodes of the next rank, plus one back edge per rank to exercise cycle
/// breaking.
pub fn layered_graph(layers: usize, width: usize) -> (Vec<Node>, Vec<Edge>) {
    let id = |layer: usize, slot: usize| format!("n_{}_{}", layer, slot);
    let mut nodes = Vec::with_capacity(layers * width);
    let mut edges = Vec::new();

    for layer in 0..layers {
        for slot in 0..width {
            nodes.push(Node::new(
                id(layer, slot),
                Position::default(),
                NodeData::new(format!("Step {}.{}", layer, slot), ""),
            ));
            if layer + 1 < layers {
                for offset in 0..2 {
                    let target = (slot + offset) % width;
                    edges.push(Edge::new(
                        format!("e_{}_{}_{}", layer, slot, offset),
                        id(layer, slot),
                        id(layer + 1, target),
                    ));
                }
            }
        }
        if layer > 0 {
            edges.push(Edge::new(
                format!("back_{}", layer),
                id(layer, 0),
                id(layer - 1, width - 1),
            ));
        }
    }

    (nodes, edges)
}

/// Same graph as [`layered_graph`], as an import document with flat labels
/// and no positions.
pub fn layered_document(layers: usize, width: usize) -> Value {
    let (nodes, edges) = layered_graph(layers, width);
    json!({
        "nodes": nodes
            .iter()
            .map(|n| json!({ "id": n.id, "label": n.data.label }))
            .collect::<Vec<_>>(),
        "edges": edges
            .iter()
            .map(|e| json!({ "id": e.id, "source": e.source, "target": e.target }))
            .collect::<Vec<_>>(),
    })
}

use crate::Position;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_NODE_TYPE: &str = "custom";
pub const ARROW_CLOSED: &str = "arrowclosed";
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
/// Stroke applied to every imported or restored edge.
pub const IMPORTED_EDGE_STROKE: &str = "#4f44c3ff";
/// Stroke applied to edges created by a connect gesture.
pub const CONNECTED_EDGE_STROKE: &str = "#5ba5ebff";

/// View-side callback attached to a node's delete button.
///
/// Never serialized: it only lives as long as the in-memory projection.
#[derive(Clone)]
pub struct DeleteHook(Arc<dyn Fn(&str) + Send + Sync>);

impl DeleteHook {
    pub fn new(f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, node_id: &str) {
        (self.0)(node_id)
    }
}

impl fmt::Debug for DeleteHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeleteHook(..)")
    }
}

impl PartialEq for DeleteHook {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub label: String,
    #[serde(default)]
    pub desc: String,
    #[serde(skip)]
    pub on_delete: Option<DeleteHook>,
    /// Fields the editor does not interpret, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeData {
    pub fn new(label: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            desc: desc.into(),
            on_delete: None,
            extra: Map::new(),
        }
    }
}

fn default_node_type() -> String {
    DEFAULT_NODE_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, position: Position, data: NodeData) -> Self {
        Self {
            id: id.into(),
            position,
            data,
            node_type: default_node_type(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerEnd {
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for MarkerEnd {
    fn default() -> Self {
        Self {
            kind: ARROW_CLOSED.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke_width: f64,
    pub stroke: String,
}

impl EdgeStyle {
    pub fn with_stroke(stroke: &str) -> Self {
        Self {
            stroke_width: DEFAULT_STROKE_WIDTH,
            stroke: stroke.to_string(),
        }
    }
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self::with_stroke(IMPORTED_EDGE_STROKE)
    }
}

fn default_animated() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_animated")]
    pub animated: bool,
    #[serde(default)]
    pub marker_end: MarkerEnd,
    #[serde(default)]
    pub style: EdgeStyle,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
            animated: true,
            marker_end: MarkerEnd::default(),
            style: EdgeStyle::default(),
            extra: Map::new(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_delete_hook_is_not_serialized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut data = NodeData::new("A", "first");
        data.on_delete = Some(DeleteHook::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let node = Node::new("a", Position::new(1.0, 2.0), data);

        let json = serde_json::to_value(&node).unwrap();
        assert!(json["data"].get("onDelete").is_none());
        assert!(json["data"].get("on_delete").is_none());
        assert_eq!(json["type"], "custom");

        node.data.on_delete.as_ref().unwrap().call("a");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_edge_serializes_camel_case_fields() {
        let edge = Edge::new("e1", "a", "b");
        let json = serde_json::to_value(&edge).unwrap();

        assert_eq!(json["markerEnd"]["type"], "arrowclosed");
        assert_eq!(json["style"]["strokeWidth"], 2.0);
        assert_eq!(json["style"]["stroke"], IMPORTED_EDGE_STROKE);
        assert!(json.get("label").is_none());
    }

    #[test]
    fn test_extra_fields_round_trip() {
        let raw = serde_json::json!({
            "id": "a",
            "position": {"x": 1.0, "y": 2.0},
            "data": {"label": "A", "desc": "", "color": "red"},
            "type": "custom",
            "selected": true
        });
        let node: Node = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(node.data.extra["color"], "red");
        assert_eq!(node.extra["selected"], true);
        assert_eq!(serde_json::to_value(&node).unwrap(), raw);
    }
}

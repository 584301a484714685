use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub mod error;
pub mod graph;
pub mod model;
pub mod normalize;

pub use error::DiagramError;
pub use graph::{Graph, GraphDocument, RawDocument};
pub use model::{
    ARROW_CLOSED, CONNECTED_EDGE_STROKE, DEFAULT_NODE_TYPE, DEFAULT_STROKE_WIDTH, DeleteHook, Edge,
    EdgeStyle, IMPORTED_EDGE_STROKE, MarkerEnd, Node, NodeData,
};
pub use normalize::{
    InputShape, classify_edges, classify_nodes, grid_fallback, normalize_edges, normalize_nodes,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Positions-only patch produced by a layout pass, keyed by node id.
pub type PositionPatch = HashMap<String, Position>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LayoutDirection {
    #[default]
    #[serde(rename = "LR")]
    LeftToRight,
    #[serde(rename = "TB")]
    TopToBottom,
}

impl fmt::Display for LayoutDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutDirection::LeftToRight => write!(f, "LR"),
            LayoutDirection::TopToBottom => write!(f, "TB"),
        }
    }
}

pub mod engine;
pub mod graph;
pub mod layout;
pub mod options;

pub use engine::LayoutEngine;
pub use graph::{EdgeIndex, LayoutEdge, LayoutGraph, LayoutNode, NodeIndex, Vec2};
pub use layout::{LayeredLayouter, Layouter};
pub use options::{
    DEFAULT_CONTAINER_WIDTH, DEFAULT_GAP, DEFAULT_NODE_HEIGHT, LAYOUT_MARGIN, LayoutError,
    LayoutOptions,
};

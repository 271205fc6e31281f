//! Compound graph data structure APIs used by `cuttle`.
//!
//! A hierarchy of graphs nested inside compound nodes, owned by a single arena-backed
//! [`GraphManager`] per layout run, plus the geometry value types and derived-state algorithms
//! (inclusion depths, lowest common ancestors, bounds, connectivity) the multilevel layout
//! pipeline builds on.

pub mod geometry;
pub mod graph;
pub mod manager;
pub mod params;

pub use geometry::{Clipping, Point, Rect, clip_segment, separation_amount};
pub use graph::{
    CompoundKind, Edge, EdgeId, Graph, GraphId, MultilevelLinks, Node, NodeId, SublayoutState,
};
pub use manager::GraphManager;
pub use params::LayoutParams;

//! Hierarchy entities: nodes, edges, graphs, and their integer handles.
//!
//! All entities live in arenas owned by a [`GraphManager`](crate::GraphManager); the structs here
//! hold index fields instead of references. Ownership edges (a graph owns its member nodes, a node
//! owns at most one child graph) and back-references (node → owner graph, edge → endpoints) are
//! both plain handles, so the usual compound-graph reference cycles never materialize.

use crate::geometry::{self, Point, Rect};

/// Handle of a [`Node`] within one manager. Handles are never reused; using the handle of a
/// removed entity panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Handle of an [`Edge`] within one manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) usize);

/// Handle of a [`Graph`] within one manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl GraphId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Forward/backward links across adjacent levels of the multilevel ladder.
///
/// `next` indexes into the next-coarser manager, `pred1`/`pred2` into the next-finer one. The
/// handles are plain indices, so they are only meaningful against the manager of that level.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MultilevelLinks {
    pub next: Option<NodeId>,
    pub pred1: Option<NodeId>,
    pub pred2: Option<NodeId>,
    /// Set while mirroring a level so a contraction result is added to a graph only once.
    pub processed: bool,
}

/// Sublayout state of a node that was positioned by a different algorithm.
///
/// Pre-laid-out nodes keep positions relative to their sublayout root; bounds updates restore
/// absolute origins from these instead of aggregating children.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SublayoutState {
    pub pre_laid_out: bool,
    pub is_root: bool,
    pub relative_center: Point,
    pub relative_scale: Point,
    pub root: Option<NodeId>,
}

/// A vertex of the hierarchy: either a plain leaf or a compound container owning a child graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub center: Point,
    /// Width (`x`) and height (`y`) of the node's rectangle.
    pub scale: Point,
    /// Incident edges, intra- and inter-graph alike.
    pub edges: Vec<EdgeId>,
    /// Graph this node is a member of. `None` only for detached nodes (freshly allocated, or the
    /// synthetic root-graph owner).
    pub owner: Option<GraphId>,
    /// Child graph nested inside this node; present iff the node is compound.
    pub child: Option<GraphId>,
    /// Nesting level counted from the root graph (root members are depth 1). Unset until
    /// [`GraphManager::calc_inclusion_tree_depths`](crate::GraphManager::calc_inclusion_tree_depths)
    /// runs.
    pub inclusion_tree_depth: usize,
    pub estimated_size: f64,
    pub multilevel: MultilevelLinks,
    pub sublayout: SublayoutState,
}

pub(crate) const DEPTH_UNSET: usize = usize::MAX;

impl Node {
    pub(crate) fn new() -> Self {
        Self {
            center: Point::default(),
            scale: Point::default(),
            edges: Vec::new(),
            owner: None,
            child: None,
            inclusion_tree_depth: DEPTH_UNSET,
            estimated_size: f64::NEG_INFINITY,
            multilevel: MultilevelLinks::default(),
            sublayout: SublayoutState::default(),
        }
    }

    pub fn is_compound(&self) -> bool {
        self.child.is_some()
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center, self.scale.x, self.scale.y)
    }

    /// Corner at minimum x, maximum y.
    pub fn left_front_corner(&self) -> Point {
        Point::new(
            self.center.x - self.scale.x / 2.0,
            self.center.y + self.scale.y / 2.0,
        )
    }

    /// Corner at maximum x, minimum y.
    pub fn right_back_corner(&self) -> Point {
        Point::new(
            self.center.x + self.scale.x / 2.0,
            self.center.y - self.scale.y / 2.0,
        )
    }

    pub fn set_location(&mut self, x: f64, y: f64) {
        self.center = Point::new(x, y);
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.center.x += dx;
        self.center.y += dy;
    }

    pub fn set_width(&mut self, width: f64) {
        self.scale.x = width;
    }

    pub fn set_height(&mut self, height: f64) {
        self.scale.y = height;
    }

    /// Separation displacement against `other` when their rectangles overlap.
    ///
    /// Coincident centers are perturbed slightly before the test so the separation direction is
    /// never degenerate.
    pub fn overlap_with(&self, other: &Node, separation_buffer: f64) -> Option<(f64, f64)> {
        let mut center = self.center;
        if center == other.center {
            center.y += 0.001;
        }
        let rect_a = Rect::from_center(center, self.scale.x, self.scale.y);
        let rect_b = other.rect();
        if rect_a.overlaps(&rect_b) {
            Some(geometry::separation_amount(
                rect_a,
                rect_b,
                separation_buffer,
            ))
        } else {
            None
        }
    }
}

/// A spring between two nodes.
///
/// Cached lengths are oriented target-minus-source and refreshed by the manager once per solver
/// tick; `ideal_length` and the LCA fields are assigned by the pipeline before relaxation starts.
#[derive(Debug, Clone)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    /// True when the endpoints live in different graphs; such edges are owned by the manager, not
    /// by any single graph.
    pub is_inter_graph: bool,
    pub length: f64,
    pub length_x: f64,
    pub length_y: f64,
    /// Set when the endpoint rectangles overlap; spring forces are skipped for the edge then.
    pub overlapping_ends: bool,
    pub ideal_length: f64,
    pub lowest_common_ancestor: Option<GraphId>,
    /// Ancestor of `source` that is a direct member of the LCA graph.
    pub source_in_lca: Option<NodeId>,
    /// Ancestor of `target` that is a direct member of the LCA graph.
    pub target_in_lca: Option<NodeId>,
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl Edge {
    pub(crate) fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            target,
            is_inter_graph: false,
            length: 0.0,
            length_x: 0.0,
            length_y: 0.0,
            overlapping_ends: false,
            ideal_length: 0.0,
            lowest_common_ancestor: None,
            source_in_lca: None,
            target_in_lca: None,
        }
    }

    /// The endpoint opposite to `node`. Panics if `node` is not an endpoint.
    pub fn other_end(&self, node: NodeId) -> NodeId {
        if self.source == node {
            self.target
        } else if self.target == node {
            self.source
        } else {
            panic!("edge is not incident to the given node");
        }
    }

    /// Center-distance length, valid when both endpoints are uniformly sized leaves.
    ///
    /// Components below one unit are snapped to their sign so force directions stay stable for
    /// near-coincident nodes.
    pub fn update_length_simple(&mut self, source_center: Point, target_center: Point) {
        self.length_x = target_center.x - source_center.x;
        self.length_y = target_center.y - source_center.y;
        if self.length_x.abs() < 1.0 {
            self.length_x = sign(self.length_x);
        }
        if self.length_y.abs() < 1.0 {
            self.length_y = sign(self.length_y);
        }
        self.length = (self.length_x * self.length_x + self.length_y * self.length_y).sqrt();
        self.overlapping_ends = false;
    }

    /// Rectangle-clipped length: the distance between the border clip points of the endpoint
    /// rectangles. Overlapping rectangles set `overlapping_ends` and leave the lengths untouched.
    pub fn update_length(&mut self, source_rect: Rect, target_rect: Rect) {
        let clip = geometry::clip_segment(target_rect, source_rect);
        self.overlapping_ends = clip.overlapping;
        if clip.overlapping {
            return;
        }

        self.length_x = clip.clip_a.x - clip.clip_b.x;
        self.length_y = clip.clip_a.y - clip.clip_b.y;
        if self.length_x.abs() < 1.0 {
            self.length_x = sign(self.length_x);
        }
        if self.length_y.abs() < 1.0 {
            self.length_y = sign(self.length_y);
        }
        self.length = (self.length_x * self.length_x + self.length_y * self.length_y).sqrt();
    }
}

/// How a compound graph's bounds are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompoundKind {
    /// Bounds are aggregated bottom-up from the members.
    #[default]
    Computed,
    /// The owner node was laid out by another algorithm; its bounds are taken as given.
    PreLaidOut,
}

/// An ordered set of member nodes plus the edges strictly internal to it.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Owning parent node. The root graph's parent is a synthetic node owned by no graph.
    pub parent: NodeId,
    pub nodes: Vec<NodeId>,
    /// Intra-graph edges only; inter-graph edges are held by the manager.
    pub edges: Vec<EdgeId>,
    /// Corner at minimum x, maximum y of the bounding rectangle.
    pub left_front: Point,
    /// Corner at maximum x, minimum y of the bounding rectangle.
    pub right_back: Point,
    pub center: Point,
    pub scale: Point,
    /// Derived by [`GraphManager::update_connected`](crate::GraphManager::update_connected).
    pub connected: bool,
    pub estimated_size: f64,
    pub kind: CompoundKind,
}

impl Graph {
    pub(crate) fn new(parent: NodeId) -> Self {
        Self {
            parent,
            nodes: Vec::new(),
            edges: Vec::new(),
            left_front: Point::default(),
            right_back: Point::default(),
            center: Point::default(),
            scale: Point::default(),
            connected: false,
            estimated_size: f64::NEG_INFINITY,
            kind: CompoundKind::Computed,
        }
    }

    /// Refreshes `center` and `scale` from the corner pair.
    pub fn update_bounding(&mut self) {
        self.scale.x = self.right_back.x - self.left_front.x;
        self.scale.y = self.left_front.y - self.right_back.y;
        self.center.x = self.left_front.x + self.scale.x / 2.0;
        self.center.y = self.right_back.y + self.scale.y / 2.0;
    }
}

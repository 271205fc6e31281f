//! The arena-owning manager of one compound hierarchy.
//!
//! A `GraphManager` owns every node, edge and graph of one layout run and is the only place
//! structural mutation happens. All failure modes here are caller misuse (stale handles, duplicate
//! registration, removing an edge its endpoints do not know) and panic with a descriptive message;
//! there is no recoverable error surface.

use std::collections::VecDeque;

use rustc_hash::FxBuildHasher;

use crate::geometry::{Point, Rect};
use crate::graph::{CompoundKind, Edge, EdgeId, Graph, GraphId, Node, NodeId};
use crate::params::LayoutParams;

type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

pub struct GraphManager {
    params: LayoutParams,

    nodes: Vec<Option<Node>>,
    edges: Vec<Option<Edge>>,
    graph_arena: Vec<Option<Graph>>,

    /// Graphs in registration order.
    graphs: Vec<GraphId>,
    /// Edges whose endpoints live in different graphs; intra-graph edges are listed on their
    /// owning graph instead.
    inter_graph_edges: Vec<EdgeId>,

    root: Option<GraphId>,

    // Flattened views over the whole hierarchy. Both are memoized and must be cleared by every
    // structural mutation; the multilevel pipeline relies on their completeness, so a stale memo
    // is a correctness bug, not just a slow path.
    all_nodes: Option<Vec<NodeId>>,
    all_edges: Option<Vec<EdgeId>>,

    /// Storage for the external solver: the nodes gravitation currently applies to.
    gravitation_targets: Option<Vec<NodeId>>,
}

impl GraphManager {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            params,
            nodes: Vec::new(),
            edges: Vec::new(),
            graph_arena: Vec::new(),
            graphs: Vec::new(),
            inter_graph_edges: Vec::new(),
            root: None,
            all_nodes: None,
            all_edges: None,
            gravitation_targets: None,
        }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    fn invalidate(&mut self) {
        self.all_nodes = None;
        self.all_edges = None;
    }

    // ---- entity access ----------------------------------------------------

    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .unwrap_or_else(|| panic!("unknown or removed node {id:?}"))
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .unwrap_or_else(|| panic!("unknown or removed node {id:?}"))
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        self.edges
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .unwrap_or_else(|| panic!("unknown or removed edge {id:?}"))
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        self.edges
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .unwrap_or_else(|| panic!("unknown or removed edge {id:?}"))
    }

    pub fn graph(&self, id: GraphId) -> &Graph {
        self.graph_arena
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .unwrap_or_else(|| panic!("unknown graph {id:?}"))
    }

    pub fn graph_mut(&mut self, id: GraphId) -> &mut Graph {
        self.graph_arena
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .unwrap_or_else(|| panic!("unknown graph {id:?}"))
    }

    pub fn graphs(&self) -> &[GraphId] {
        &self.graphs
    }

    pub fn inter_graph_edges(&self) -> &[EdgeId] {
        &self.inter_graph_edges
    }

    pub fn root_graph(&self) -> GraphId {
        self.root.expect("graph manager has no root graph")
    }

    pub fn has_root_graph(&self) -> bool {
        self.root.is_some()
    }

    // ---- construction -----------------------------------------------------

    /// Allocates a node that is not yet a member of any graph.
    pub fn new_node(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node::new()));
        id
    }

    /// Creates and registers the unique root graph, owned by a synthetic node that belongs to no
    /// graph. Panics if the manager already has a root graph.
    pub fn add_root_graph(&mut self) -> GraphId {
        assert!(
            self.root.is_none(),
            "graph manager already has a root graph"
        );
        let parent = self.new_node();
        let root = self.add_graph(parent);
        self.root = Some(root);
        root
    }

    /// Registers a new child graph under `parent`. Panics if `parent` already owns one.
    pub fn add_graph(&mut self, parent: NodeId) -> GraphId {
        assert!(
            self.node(parent).child.is_none(),
            "parent node already owns a child graph"
        );
        let id = GraphId(self.graph_arena.len());
        self.graph_arena.push(Some(Graph::new(parent)));
        self.graphs.push(id);
        self.node_mut(parent).child = Some(id);
        self.invalidate();
        id
    }

    /// Makes `node` a member of `graph`. Panics if the node is already a member somewhere.
    pub fn add_node(&mut self, node: NodeId, graph: GraphId) {
        assert!(
            self.node(node).owner.is_none(),
            "node is already a member of a graph"
        );
        self.graph_mut(graph).nodes.push(node);
        self.node_mut(node).owner = Some(graph);
        self.invalidate();
    }

    /// Allocates a fresh node directly into `graph`.
    pub fn add_new_node(&mut self, graph: GraphId) -> NodeId {
        let node = self.new_node();
        self.add_node(node, graph);
        node
    }

    /// Connects `source` and `target`. Endpoints sharing an owner graph produce an intra-graph
    /// edge listed on that graph; otherwise the edge is registered inter-graph on the manager.
    /// Both endpoints must already be members of some graph.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> EdgeId {
        let source_graph = self
            .node(source)
            .owner
            .unwrap_or_else(|| panic!("edge source {source:?} is not in any graph"));
        let target_graph = self
            .node(target)
            .owner
            .unwrap_or_else(|| panic!("edge target {target:?} is not in any graph"));

        let id = EdgeId(self.edges.len());
        let mut edge = Edge::new(source, target);

        if source_graph == target_graph {
            edge.is_inter_graph = false;
            self.edges.push(Some(edge));
            self.graph_mut(source_graph).edges.push(id);
            self.node_mut(source).edges.push(id);
            if target != source {
                self.node_mut(target).edges.push(id);
            }
        } else {
            edge.is_inter_graph = true;
            self.edges.push(Some(edge));
            self.inter_graph_edges.push(id);
            self.node_mut(source).edges.push(id);
            self.node_mut(target).edges.push(id);
        }

        self.invalidate();
        id
    }

    // ---- removal ----------------------------------------------------------

    /// Removes `node` and every edge incident to it. All structural references are dropped
    /// symmetrically before the node leaves its graph; the handle is dead afterwards.
    pub fn remove_node(&mut self, node: NodeId) {
        let owner = self
            .node(node)
            .owner
            .unwrap_or_else(|| panic!("node {node:?} is not in any graph"));

        let incident: Vec<EdgeId> = self.node(node).edges.clone();
        for edge in incident {
            self.remove_edge(edge);
        }

        let graph = self.graph_mut(owner);
        let position = graph
            .nodes
            .iter()
            .position(|&member| member == node)
            .unwrap_or_else(|| panic!("node {node:?} is not in its owner graph's node list"));
        graph.nodes.remove(position);

        self.nodes[node.0] = None;
        self.invalidate();
    }

    /// Removes `edge` from its endpoints and from the owning graph or the inter-graph list.
    pub fn remove_edge(&mut self, edge: EdgeId) {
        if self.edge(edge).is_inter_graph {
            self.remove_inter_graph_edge(edge);
        } else {
            self.remove_intra_graph_edge(edge);
        }
    }

    fn detach_from_endpoints(&mut self, edge: EdgeId) {
        let (source, target) = {
            let e = self.edge(edge);
            (e.source, e.target)
        };
        assert!(
            self.node(source).edges.contains(&edge) && self.node(target).edges.contains(&edge),
            "an endpoint does not know edge {edge:?}"
        );
        self.node_mut(source).edges.retain(|&e| e != edge);
        if target != source {
            self.node_mut(target).edges.retain(|&e| e != edge);
        }
    }

    fn remove_intra_graph_edge(&mut self, edge: EdgeId) {
        let source = self.edge(edge).source;
        let owner = self
            .node(source)
            .owner
            .unwrap_or_else(|| panic!("source of edge {edge:?} is not in any graph"));

        self.detach_from_endpoints(edge);

        let graph = self.graph_mut(owner);
        let position = graph
            .edges
            .iter()
            .position(|&e| e == edge)
            .unwrap_or_else(|| panic!("edge {edge:?} is not in its owner graph's edge list"));
        graph.edges.remove(position);

        self.edges[edge.0] = None;
        self.invalidate();
    }

    fn remove_inter_graph_edge(&mut self, edge: EdgeId) {
        self.detach_from_endpoints(edge);

        let position = self
            .inter_graph_edges
            .iter()
            .position(|&e| e == edge)
            .unwrap_or_else(|| panic!("edge {edge:?} is not in the inter-graph edge list"));
        self.inter_graph_edges.remove(position);

        self.edges[edge.0] = None;
        self.invalidate();
    }

    // ---- flattened views --------------------------------------------------

    /// Every node that is a member of some graph, across the whole hierarchy. Memoized until the
    /// next structural mutation.
    pub fn all_nodes(&mut self) -> Vec<NodeId> {
        if self.all_nodes.is_none() {
            let mut out = Vec::new();
            for &graph in &self.graphs {
                let g = self.graph_arena[graph.0]
                    .as_ref()
                    .unwrap_or_else(|| panic!("unknown graph {graph:?}"));
                out.extend(g.nodes.iter().copied());
            }
            self.all_nodes = Some(out);
        }
        self.all_nodes.clone().unwrap_or_default()
    }

    /// Every edge of the hierarchy: all intra-graph edges followed by the inter-graph ones.
    /// Memoized until the next structural mutation.
    pub fn all_edges(&mut self) -> Vec<EdgeId> {
        if self.all_edges.is_none() {
            let mut out = Vec::new();
            for &graph in &self.graphs {
                let g = self.graph_arena[graph.0]
                    .as_ref()
                    .unwrap_or_else(|| panic!("unknown graph {graph:?}"));
                out.extend(g.edges.iter().copied());
            }
            out.extend(self.inter_graph_edges.iter().copied());
            self.all_edges = Some(out);
        }
        self.all_edges.clone().unwrap_or_default()
    }

    // ---- hierarchy queries ------------------------------------------------

    /// Distinct nodes adjacent to `node` over its incident edges.
    pub fn neighbors(&self, node: NodeId) -> HashSet<NodeId> {
        let mut out: HashSet<NodeId> = HashSet::default();
        for &edge in &self.node(node).edges {
            let e = self.edge(edge);
            if e.source == node {
                out.insert(e.target);
            } else {
                assert!(
                    e.target == node,
                    "incident edge {edge:?} does not reference node {node:?}"
                );
                out.insert(e.source);
            }
        }
        out
    }

    /// `node` followed by every node in its nested subtree, depth first.
    pub fn with_children(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = vec![node];
        if let Some(child) = self.node(node).child {
            for &member in &self.graph(child).nodes {
                out.extend(self.with_children(member));
            }
        }
        out
    }

    /// Resolves the far end of `edge` (seen from `node`) to the member of `graph` it sits under,
    /// walking owner chains upward. `None` when the far end is not inside `graph` at all.
    pub fn other_end_in_graph(
        &self,
        edge: EdgeId,
        node: NodeId,
        graph: GraphId,
    ) -> Option<NodeId> {
        let root = self.root_graph();
        let mut current = self.edge(edge).other_end(node);
        loop {
            let owner = self.node(current).owner?;
            if owner == graph {
                return Some(current);
            }
            if owner == root {
                return None;
            }
            current = self.graph(owner).parent;
        }
    }

    /// Nesting depth of `graph`: 1 for the root graph, otherwise its parent node's depth.
    pub fn graph_inclusion_depth(&self, graph: GraphId) -> usize {
        if Some(graph) == self.root {
            1
        } else {
            self.node(self.graph(graph).parent).inclusion_tree_depth
        }
    }

    // ---- derived hierarchy state ------------------------------------------

    /// Labels every node with its nesting depth: root-graph members get 1, a compound's members
    /// get the compound's depth plus one. Must be re-run after the hierarchy changes.
    pub fn calc_inclusion_tree_depths(&mut self) {
        let root = self.root_graph();
        self.calc_depth(root, 1);
    }

    fn calc_depth(&mut self, graph: GraphId, depth: usize) {
        let members = self.graph(graph).nodes.clone();
        for node in members {
            self.node_mut(node).inclusion_tree_depth = depth;
            if let Some(child) = self.node(node).child {
                self.calc_depth(child, depth + 1);
            }
        }
    }

    /// Computes, for every edge, the closest graph that is an ancestor of both endpoints, plus
    /// the two in-LCA projections used as force-application points for cross-level springs.
    ///
    /// Panics if some edge's endpoints share no ancestor, which the single-root invariant rules
    /// out; hitting it means the hierarchy itself is corrupt.
    pub fn calc_lowest_common_ancestors(&mut self) {
        let root = self.root_graph();
        for edge in self.all_edges() {
            let (source, target) = {
                let e = self.edge(edge);
                (e.source, e.target)
            };

            if source == target {
                let owner = self.node(source).owner;
                let e = self.edge_mut(edge);
                e.lowest_common_ancestor = owner;
                e.source_in_lca = Some(source);
                e.target_in_lca = Some(target);
                continue;
            }

            let mut lca: Option<GraphId> = None;
            let mut source_in_lca = source;
            let mut target_in_lca = target;
            let mut source_ancestor = self
                .node(source)
                .owner
                .unwrap_or_else(|| panic!("edge source {source:?} is not in any graph"));

            // Walk both ancestor chains in lockstep: for each source-side candidate, scan the
            // whole target chain before stepping the source chain one level up.
            while lca.is_none() {
                target_in_lca = target;
                let mut target_ancestor = self
                    .node(target)
                    .owner
                    .unwrap_or_else(|| panic!("edge target {target:?} is not in any graph"));

                loop {
                    if target_ancestor == source_ancestor {
                        lca = Some(target_ancestor);
                        break;
                    }
                    if target_ancestor == root {
                        break;
                    }
                    target_in_lca = self.graph(target_ancestor).parent;
                    target_ancestor = self
                        .node(target_in_lca)
                        .owner
                        .unwrap_or_else(|| panic!("ancestor chain escaped the hierarchy"));
                }

                if source_ancestor == root {
                    break;
                }
                if lca.is_none() {
                    source_in_lca = self.graph(source_ancestor).parent;
                    source_ancestor = self
                        .node(source_in_lca)
                        .owner
                        .unwrap_or_else(|| panic!("ancestor chain escaped the hierarchy"));
                }
            }

            let lca =
                lca.unwrap_or_else(|| panic!("edge endpoints share no common ancestor graph"));
            let e = self.edge_mut(edge);
            e.lowest_common_ancestor = Some(lca);
            e.source_in_lca = Some(source_in_lca);
            e.target_in_lca = Some(target_in_lca);
        }
    }

    // ---- geometry maintenance ---------------------------------------------

    /// Recomputes compound bounds bottom-up, starting at the root graph.
    pub fn update_bounds(&mut self) {
        let root = self.root_graph();
        self.update_graph_bounds(root, true);
    }

    /// Recomputes the bounds of one graph. Pre-laid-out compounds take their owner node's
    /// corners as given; computed compounds aggregate their members (deepest levels first when
    /// `recursive`), inflated by the graph margin. An empty computed compound keeps its owner's
    /// corners unchanged.
    pub fn update_graph_bounds(&mut self, graph: GraphId, recursive: bool) {
        let parent = self.graph(graph).parent;

        if self.graph(graph).kind == CompoundKind::PreLaidOut {
            let left_front = self.node(parent).left_front_corner();
            let right_back = self.node(parent).right_back_corner();
            let g = self.graph_mut(graph);
            g.left_front = left_front;
            g.right_back = right_back;
            g.update_bounding();

            for member in self.graph(graph).nodes.clone() {
                if recursive && self.node(member).child.is_some() {
                    self.update_node_bounds(member);
                } else {
                    self.restore_origin(member);
                }
            }
            return;
        }

        let mut left_lower = Point::new(f64::INFINITY, f64::NEG_INFINITY);
        let mut right_upper = Point::new(f64::NEG_INFINITY, f64::INFINITY);

        for member in self.graph(graph).nodes.clone() {
            if recursive && self.node(member).child.is_some() {
                self.update_node_bounds(member);
            }

            let left_front = self.node(member).left_front_corner();
            let right_back = self.node(member).right_back_corner();

            if left_lower.x > left_front.x {
                left_lower.x = left_front.x;
            }
            if right_upper.x < right_back.x {
                right_upper.x = right_back.x;
            }
            if right_upper.y > right_back.y {
                right_upper.y = right_back.y;
            }
            if left_lower.y < left_front.y {
                left_lower.y = left_front.y;
            }
        }

        if left_lower.x == f64::INFINITY {
            // Empty compound: keep the owner node's current corners.
            let left_front = self.node(parent).left_front_corner();
            let right_back = self.node(parent).right_back_corner();
            let g = self.graph_mut(graph);
            g.left_front = left_front;
            g.right_back = right_back;
            g.update_bounding();
            return;
        }

        let margin = self.params.graph_margin;
        let g = self.graph_mut(graph);
        g.left_front = Point::new(left_lower.x - margin, left_lower.y + margin);
        g.right_back = Point::new(right_upper.x + margin, right_upper.y - margin);
        g.update_bounding();
    }

    /// Recomputes the bounds of a compound node from its child graph. Panics on leaves.
    pub fn update_node_bounds(&mut self, node: NodeId) {
        let child = self
            .node(node)
            .child
            .unwrap_or_else(|| panic!("node {node:?} has no child graph"));
        let sublayout = self.node(node).sublayout;

        if sublayout.is_root {
            // The root of a sublayout knows its own size; only the subtree is refreshed.
            let n = self.node_mut(node);
            n.set_width(sublayout.relative_scale.x);
            n.set_height(sublayout.relative_scale.y);
            self.update_graph_bounds(child, true);
            return;
        }

        if sublayout.pre_laid_out {
            // Members of a sublayout are positioned relative to its root; restore the absolute
            // origin before the subtree reads these bounds.
            let root = sublayout
                .root
                .unwrap_or_else(|| panic!("pre-laid-out node {node:?} has no sublayout root"));
            let root_center = self.node(root).center;
            let n = self.node_mut(node);
            n.center = sublayout.relative_center.add(root_center);
            n.set_width(sublayout.relative_scale.x);
            n.set_height(sublayout.relative_scale.y);
            self.update_graph_bounds(child, true);
            return;
        }

        if !self.graph(child).nodes.is_empty() {
            self.update_graph_bounds(child, true);
            let (left_front, right_back, scale) = {
                let g = self.graph(child);
                (g.left_front, g.right_back, g.scale)
            };
            let margin = self.params.compound_node_margin;
            let n = self.node_mut(node);
            n.center.x = left_front.x + scale.x / 2.0;
            n.center.y = right_back.y + scale.y / 2.0;
            n.set_width(scale.x + margin + margin);
            n.set_height(scale.y + margin + margin);
        }
    }

    /// Restores a sublayout member's absolute position and size from its root-relative state.
    pub fn restore_origin(&mut self, node: NodeId) {
        let sublayout = self.node(node).sublayout;
        let root = sublayout
            .root
            .unwrap_or_else(|| panic!("node {node:?} has no sublayout root"));
        let root_center = self.node(root).center;
        let n = self.node_mut(node);
        n.center = sublayout.relative_center.add(root_center);
        n.set_width(sublayout.relative_scale.x);
        n.set_height(sublayout.relative_scale.y);
    }

    /// Recomputes `graph`'s connectivity flag. A BFS from the first member, where visiting a
    /// compound pulls in its whole subtree and an edge only counts when its far end resolves to a
    /// member of `graph`. An empty graph is connected.
    pub fn update_connected(&mut self, graph: GraphId) {
        let members = self.graph(graph).nodes.clone();
        if members.is_empty() {
            self.graph_mut(graph).connected = true;
            return;
        }

        let mut visited: HashSet<NodeId> = HashSet::default();
        let mut queue: VecDeque<NodeId> = self.with_children(members[0]).into_iter().collect();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            for edge in self.node(current).edges.clone() {
                if let Some(neighbor) = self.other_end_in_graph(edge, current, graph) {
                    if !visited.contains(&neighbor) {
                        queue.extend(self.with_children(neighbor));
                    }
                }
            }
        }

        let visited_in_graph = visited
            .iter()
            .filter(|&&node| self.node(node).owner == Some(graph))
            .count();
        self.graph_mut(graph).connected = visited_in_graph == members.len();
    }

    /// Bottom-up estimated sizes: a leaf's is the mean of its width and height, a compound's is
    /// its child graph's (which also becomes the compound's scale), and a graph's is the
    /// sqrt-normalized sum of its members, or the configured default when empty.
    pub fn calc_estimated_sizes(&mut self) {
        let root = self.root_graph();
        self.calc_graph_estimated_size(root);
    }

    fn calc_graph_estimated_size(&mut self, graph: GraphId) -> f64 {
        let members = self.graph(graph).nodes.clone();
        let mut size = 0.0;
        for node in &members {
            size += self.calc_node_estimated_size(*node);
        }

        let estimated = if size == 0.0 {
            self.params.empty_compound_size
        } else {
            size / (members.len() as f64).sqrt()
        };
        self.graph_mut(graph).estimated_size = estimated;
        estimated
    }

    fn calc_node_estimated_size(&mut self, node: NodeId) -> f64 {
        match self.node(node).child {
            None => {
                let n = self.node_mut(node);
                n.estimated_size = (n.scale.x + n.scale.y) / 2.0;
                n.estimated_size
            }
            Some(child) => {
                let estimated = self.calc_graph_estimated_size(child);
                let n = self.node_mut(node);
                n.estimated_size = estimated;
                n.scale.x = estimated;
                n.scale.y = estimated;
                estimated
            }
        }
    }

    /// Refreshes every edge's cached length. With uniform leaf sizes, leaf-to-leaf edges use the
    /// cheap center distance; every other edge clips against the endpoint rectangles.
    pub fn update_edge_lengths(&mut self) {
        let uniform = self.params.uniform_leaf_node_size;
        for edge in self.all_edges() {
            let (source, target) = {
                let e = self.edge(edge);
                (e.source, e.target)
            };
            let leaf_ends =
                self.node(source).child.is_none() && self.node(target).child.is_none();
            let (source_center, source_scale) = {
                let n = self.node(source);
                (n.center, n.scale)
            };
            let (target_center, target_scale) = {
                let n = self.node(target);
                (n.center, n.scale)
            };

            let e = self.edge_mut(edge);
            if uniform && leaf_ends {
                e.update_length_simple(source_center, target_center);
            } else {
                e.update_length(
                    Rect::from_center(source_center, source_scale.x, source_scale.y),
                    Rect::from_center(target_center, target_scale.x, target_scale.y),
                );
            }
        }
    }

    // ---- solver-facing storage --------------------------------------------

    pub fn set_gravitation_targets(&mut self, nodes: Vec<NodeId>) {
        self.gravitation_targets = Some(nodes);
    }

    pub fn gravitation_targets(&self) -> Option<&[NodeId]> {
        self.gravitation_targets.as_deref()
    }
}

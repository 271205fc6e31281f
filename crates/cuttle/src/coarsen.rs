//! Auxiliary flat graph used for multilevel reduction.
//!
//! The hierarchy's leaf nodes are flattened into one `CoarsenGraph`; a coarsening pass then
//! contracts matched vertex pairs in place until every vertex is matched, allocating the
//! next-coarser level's model nodes as it finishes. Vertices are arena-backed: contraction
//! removes them from the live list but their slots stay readable, since each contraction result
//! keeps handles to the two partners it merged.

use cuttle_graphlib::{GraphId, GraphManager, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoarsenNodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoarsenEdgeId(usize);

/// One vertex of the coarsening graph: a leaf right after conversion, a contraction result later.
#[derive(Debug, Clone)]
pub struct CoarsenNode {
    /// Model node this vertex stands for: the wrapped leaf after conversion, the freshly
    /// allocated next-level node once a pass completes.
    pub reference: Option<NodeId>,
    /// First partner merged into this vertex (contraction results only).
    pub node1: Option<CoarsenNodeId>,
    /// Second partner, absent when the first matched with nothing.
    pub node2: Option<CoarsenNodeId>,
    pub weight: u32,
    pub matched: bool,
    edges: Vec<CoarsenEdgeId>,
}

#[derive(Debug, Clone, Copy)]
pub struct CoarsenEdge {
    pub source: CoarsenNodeId,
    pub target: CoarsenNodeId,
}

impl CoarsenEdge {
    fn other_end(&self, node: CoarsenNodeId) -> CoarsenNodeId {
        if self.source == node {
            self.target
        } else {
            self.source
        }
    }
}

#[derive(Default)]
pub struct CoarsenGraph {
    node_arena: Vec<CoarsenNode>,
    edge_arena: Vec<Option<CoarsenEdge>>,
    /// Live vertices in insertion order; contraction results are appended at the back.
    nodes: Vec<CoarsenNodeId>,
}

impl CoarsenGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens every leaf of the hierarchy into one coarsening graph. Edges are taken from the
    /// intra-graph edge lists, restricted to leaf endpoints; compound nodes only contribute their
    /// nested leaves.
    pub fn from_hierarchy(manager: &GraphManager) -> Self {
        let mut graph = CoarsenGraph::new();
        let mut by_node: FxHashMap<NodeId, CoarsenNodeId> = FxHashMap::default();
        graph.convert_graph(manager, manager.root_graph(), &mut by_node);
        graph
    }

    fn convert_graph(
        &mut self,
        manager: &GraphManager,
        graph: GraphId,
        by_node: &mut FxHashMap<NodeId, CoarsenNodeId>,
    ) {
        for &node in &manager.graph(graph).nodes {
            if let Some(child) = manager.node(node).child {
                self.convert_graph(manager, child, by_node);
            } else {
                let vertex = self.push(CoarsenNode {
                    reference: Some(node),
                    node1: None,
                    node2: None,
                    weight: 1,
                    matched: false,
                    edges: Vec::new(),
                });
                by_node.insert(node, vertex);
            }
        }

        for &edge in &manager.graph(graph).edges {
            let e = manager.edge(edge);
            if manager.node(e.source).child.is_none() && manager.node(e.target).child.is_none() {
                self.add_edge(by_node[&e.source], by_node[&e.target]);
            }
        }
    }

    fn push(&mut self, node: CoarsenNode) -> CoarsenNodeId {
        let id = CoarsenNodeId(self.node_arena.len());
        self.node_arena.push(node);
        self.nodes.push(id);
        id
    }

    pub fn node(&self, id: CoarsenNodeId) -> &CoarsenNode {
        &self.node_arena[id.0]
    }

    fn node_mut(&mut self, id: CoarsenNodeId) -> &mut CoarsenNode {
        &mut self.node_arena[id.0]
    }

    /// Live vertices only.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Live edges only; edges of contracted vertices are gone.
    pub fn edge_count(&self) -> usize {
        self.edge_arena.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn nodes(&self) -> &[CoarsenNodeId] {
        &self.nodes
    }

    pub fn add_edge(&mut self, source: CoarsenNodeId, target: CoarsenNodeId) {
        let id = CoarsenEdgeId(self.edge_arena.len());
        self.edge_arena.push(Some(CoarsenEdge { source, target }));
        self.node_mut(source).edges.push(id);
        if target != source {
            self.node_mut(target).edges.push(id);
        }
    }

    /// Live neighbors of `node`, in incident-edge order.
    pub fn neighbors(&self, node: CoarsenNodeId) -> Vec<CoarsenNodeId> {
        let mut out = Vec::new();
        for &edge in &self.node(node).edges {
            if let Some(e) = self.edge_arena[edge.0] {
                out.push(e.other_end(node));
            }
        }
        out
    }

    fn remove_node(&mut self, node: CoarsenNodeId) {
        let incident: Vec<CoarsenEdgeId> = self.node(node).edges.clone();
        for edge in incident {
            let Some(e) = self.edge_arena[edge.0] else {
                continue;
            };
            let other = e.other_end(node);
            if other != node {
                self.node_mut(other).edges.retain(|&candidate| candidate != edge);
            }
            self.edge_arena[edge.0] = None;
        }
        self.node_mut(node).edges.clear();
        self.nodes.retain(|&live| live != node);
    }

    fn unmatch_all(&mut self) {
        let live = self.nodes.clone();
        for node in live {
            self.node_mut(node).matched = false;
        }
    }

    /// Matching partner for `vertex`: its unmatched neighbor of minimum weight, if any.
    fn matching(&self, vertex: CoarsenNodeId) -> Option<CoarsenNodeId> {
        let mut best: Option<CoarsenNodeId> = None;
        let mut best_weight = u32::MAX;
        for neighbor in self.neighbors(vertex) {
            if neighbor == vertex || self.node(neighbor).matched {
                continue;
            }
            if self.node(neighbor).weight < best_weight {
                best_weight = self.node(neighbor).weight;
                best = Some(neighbor);
            }
        }
        best
    }

    /// Merges `vertex` and its partner into a fresh contraction result: weights add up, the
    /// neighbor sets union without duplicates, and edges between the partners are dropped rather
    /// than recreated. Both originals leave the live list.
    fn contract(&mut self, vertex: CoarsenNodeId, partner: Option<CoarsenNodeId>) {
        let weight = self.node(vertex).weight;
        let result = self.push(CoarsenNode {
            reference: None,
            node1: Some(vertex),
            node2: partner,
            weight,
            matched: true,
            edges: Vec::new(),
        });

        let mut linked: FxHashSet<CoarsenNodeId> = FxHashSet::default();
        for neighbor in self.neighbors(vertex) {
            if Some(neighbor) == partner || neighbor == vertex {
                continue;
            }
            if linked.insert(neighbor) {
                self.add_edge(result, neighbor);
            }
        }
        self.remove_node(vertex);

        if let Some(partner) = partner {
            let partner_weight = self.node(partner).weight;
            self.node_mut(result).weight += partner_weight;
            for neighbor in self.neighbors(partner) {
                if neighbor == partner || linked.contains(&neighbor) {
                    continue;
                }
                linked.insert(neighbor);
                self.add_edge(result, neighbor);
            }
            self.remove_node(partner);
        }

        trace!(?vertex, ?partner, ?result, "contracted");
    }

    /// One coarsening pass. Every vertex starts unmatched; the first unmatched vertex repeatedly
    /// contracts with its minimum-weight unmatched neighbor (or alone when it has none) until all
    /// vertices are matched. Afterwards each surviving vertex allocates its model node in
    /// `coarse` and the `next`/`pred` links between the two levels are wired up.
    pub fn coarsen(&mut self, fine: &mut GraphManager, coarse: &mut GraphManager) {
        self.unmatch_all();
        if self.nodes.is_empty() {
            return;
        }

        while !self.node(self.nodes[0]).matched {
            let vertex = self.nodes[0];
            let partner = self.matching(vertex);
            self.contract(vertex, partner);
        }

        for index in 0..self.nodes.len() {
            let survivor = self.nodes[index];
            let next = coarse.new_node();

            let node1 = self
                .node(survivor)
                .node1
                .expect("contraction result has no first partner");
            let reference1 = self
                .node(node1)
                .reference
                .expect("contracted vertex lost its model reference");
            coarse.node_mut(next).multilevel.pred1 = Some(reference1);
            fine.node_mut(reference1).multilevel.next = Some(next);

            if let Some(node2) = self.node(survivor).node2 {
                let reference2 = self
                    .node(node2)
                    .reference
                    .expect("contracted vertex lost its model reference");
                coarse.node_mut(next).multilevel.pred2 = Some(reference2);
                fine.node_mut(reference2).multilevel.next = Some(next);
            }

            self.node_mut(survivor).reference = Some(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuttle_graphlib::LayoutParams;

    fn leaf_chain(count: usize) -> (GraphManager, Vec<NodeId>) {
        let mut manager = GraphManager::new(LayoutParams::default());
        let root = manager.add_root_graph();
        let nodes: Vec<NodeId> = (0..count).map(|_| manager.add_new_node(root)).collect();
        for pair in nodes.windows(2) {
            manager.add_edge(pair[0], pair[1]);
        }
        (manager, nodes)
    }

    #[test]
    fn conversion_flattens_leaves_only() {
        let mut manager = GraphManager::new(LayoutParams::default());
        let root = manager.add_root_graph();
        let compound = manager.add_new_node(root);
        let inner = manager.add_graph(compound);
        manager.add_new_node(inner);
        manager.add_new_node(inner);
        manager.add_new_node(root);

        let graph = CoarsenGraph::from_hierarchy(&manager);
        // The compound itself is not a coarsening vertex; its two leaves and the root leaf are.
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn matching_prefers_the_lightest_neighbor() {
        let (manager, _) = leaf_chain(3);
        let mut graph = CoarsenGraph::from_hierarchy(&manager);

        let middle = graph.nodes()[1];
        let heavy = graph.nodes()[0];
        graph.node_mut(heavy).weight = 5;

        let partner = graph.matching(middle).expect("middle vertex has neighbors");
        assert_eq!(partner, graph.nodes()[2]);
    }

    #[test]
    fn lone_vertex_contracts_alone() {
        let (mut fine, _) = leaf_chain(1);
        let mut coarse = GraphManager::new(LayoutParams::default());
        let mut graph = CoarsenGraph::from_hierarchy(&fine);

        graph.coarsen(&mut fine, &mut coarse);

        assert_eq!(graph.node_count(), 1);
        let survivor = graph.node(graph.nodes()[0]);
        assert_eq!(survivor.weight, 1);
        assert!(survivor.node2.is_none());
    }

    #[test]
    fn pass_conserves_total_weight() {
        let (mut fine, _) = leaf_chain(7);
        let mut coarse = GraphManager::new(LayoutParams::default());
        let mut graph = CoarsenGraph::from_hierarchy(&fine);

        graph.coarsen(&mut fine, &mut coarse);

        let total: u32 = graph
            .nodes()
            .iter()
            .map(|&vertex| graph.node(vertex).weight)
            .sum();
        assert_eq!(total, 7);
    }
}

use cuttle::coarsen::CoarsenGraph;
use cuttle::graphlib::{GraphManager, LayoutParams, NodeId};

fn leaf_graph(count: usize, edges: &[(usize, usize)]) -> (GraphManager, Vec<NodeId>) {
    let mut manager = GraphManager::new(LayoutParams::default());
    let root = manager.add_root_graph();
    let nodes: Vec<NodeId> = (0..count).map(|_| manager.add_new_node(root)).collect();
    for &(a, b) in edges {
        manager.add_edge(nodes[a], nodes[b]);
    }
    (manager, nodes)
}

#[test]
fn triangle_contracts_to_two_nodes_and_one_edge() {
    // A, B, C each of weight 1 with edges A-B, B-C, A-C. One pass matches A with B; the shared
    // neighbor C must not produce a duplicate edge.
    let (mut fine, nodes) = leaf_graph(3, &[(0, 1), (1, 2), (0, 2)]);
    let mut coarse = GraphManager::new(LayoutParams::default());
    let mut graph = CoarsenGraph::from_hierarchy(&fine);

    graph.coarsen(&mut fine, &mut coarse);

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);

    let weights: Vec<u32> = graph
        .nodes()
        .iter()
        .map(|&vertex| graph.node(vertex).weight)
        .collect();
    let mut sorted = weights.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![1, 2]);

    // A and B contracted together, so they share their next-level image; C has its own.
    let next_a = fine.node(nodes[0]).multilevel.next.expect("A has an image");
    let next_b = fine.node(nodes[1]).multilevel.next.expect("B has an image");
    let next_c = fine.node(nodes[2]).multilevel.next.expect("C has an image");
    assert_eq!(next_a, next_b);
    assert_ne!(next_a, next_c);

    // The composite image records both predecessors.
    assert_eq!(coarse.node(next_a).multilevel.pred1, Some(nodes[0]));
    assert_eq!(coarse.node(next_a).multilevel.pred2, Some(nodes[1]));
    assert_eq!(coarse.node(next_c).multilevel.pred1, Some(nodes[2]));
    assert_eq!(coarse.node(next_c).multilevel.pred2, None);
}

#[test]
fn passes_never_increase_node_count_and_terminate() {
    let edges: Vec<(usize, usize)> = (0..15).map(|i| (i, i + 1)).collect();
    let (mut fine, _) = leaf_graph(16, &edges);
    let mut graph = CoarsenGraph::from_hierarchy(&fine);

    let mut count = graph.node_count();
    let mut passes = 0;
    loop {
        let previous = count;
        let mut coarse = GraphManager::new(LayoutParams::default());
        graph.coarsen(&mut fine, &mut coarse);
        count = graph.node_count();
        passes += 1;

        assert!(count <= previous, "a pass grew the coarsening graph");
        if previous == count || count <= 1 {
            break;
        }
        // The next pass operates one level up; the freshly allocated nodes take over the
        // finest-manager role for link wiring.
        fine = coarse;
        assert!(passes < 16, "coarsening did not converge");
    }

    assert!(count <= 1);
    // A connected chain halves roughly every pass.
    assert!(passes <= 8);
}

#[test]
fn total_weight_is_conserved_across_passes() {
    let edges: Vec<(usize, usize)> = (0..9).map(|i| (i, i + 1)).collect();
    let (mut fine, _) = leaf_graph(10, &edges);
    let mut graph = CoarsenGraph::from_hierarchy(&fine);

    let mut coarse = GraphManager::new(LayoutParams::default());
    graph.coarsen(&mut fine, &mut coarse);

    let total: u32 = graph
        .nodes()
        .iter()
        .map(|&vertex| graph.node(vertex).weight)
        .sum();
    assert_eq!(total, 10);
}

#[test]
fn isolated_vertices_match_with_nothing() {
    let (mut fine, nodes) = leaf_graph(3, &[]);
    let mut coarse = GraphManager::new(LayoutParams::default());
    let mut graph = CoarsenGraph::from_hierarchy(&fine);

    graph.coarsen(&mut fine, &mut coarse);

    // Nothing to match against: every vertex contracts alone.
    assert_eq!(graph.node_count(), 3);
    for vertex in graph.nodes() {
        assert_eq!(graph.node(*vertex).weight, 1);
        assert!(graph.node(*vertex).node2.is_none());
    }
    for node in nodes {
        assert!(fine.node(node).multilevel.next.is_some());
    }
}

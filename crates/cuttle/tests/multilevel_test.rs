use cuttle::dump::dump_levels;
use cuttle::graphlib::{GraphManager, LayoutParams, NodeId};
use cuttle::ideal::calc_ideal_edge_lengths;
use cuttle::multilevel::{build_levels, project_positions};

fn chain(count: usize) -> GraphManager {
    let mut manager = GraphManager::new(LayoutParams::default());
    let root = manager.add_root_graph();
    let nodes: Vec<NodeId> = (0..count).map(|_| manager.add_new_node(root)).collect();
    for pair in nodes.windows(2) {
        manager.add_edge(pair[0], pair[1]);
    }
    manager
}

/// Root graph with compound `p` (members x, y joined by an edge) and leaf `q`, plus the
/// inter-graph edges x-q and y-q.
fn nested() -> (GraphManager, NodeId, NodeId, NodeId, NodeId) {
    let mut manager = GraphManager::new(LayoutParams::default());
    let root = manager.add_root_graph();
    let p = manager.add_new_node(root);
    let inner = manager.add_graph(p);
    let x = manager.add_new_node(inner);
    let y = manager.add_new_node(inner);
    let q = manager.add_new_node(root);
    manager.add_edge(x, y);
    manager.add_edge(x, q);
    manager.add_edge(y, q);
    (manager, p, x, y, q)
}

#[test]
fn ladder_shrinks_monotonically() {
    let levels = build_levels(chain(16));
    assert!(levels.len() >= 2);

    let mut counts = Vec::new();
    for mut manager in levels {
        counts.push(manager.all_nodes().len());
    }
    assert_eq!(counts[0], 16);
    for pair in counts.windows(2) {
        assert!(pair[1] <= pair[0], "a coarser level grew");
    }
    assert!(*counts.last().expect("at least one level") >= 2);
}

#[test]
fn two_node_graphs_produce_no_coarser_level() {
    let levels = build_levels(chain(2));
    // The only pass collapses the pair to a single vertex; that trivial manager is dropped.
    assert_eq!(levels.len(), 1);
}

#[test]
fn compounds_are_preserved_one_level_down() {
    let (manager, p, x, y, _q) = nested();
    let mut levels = build_levels(manager);
    assert!(levels.len() >= 2);

    let (head, tail) = levels.split_at_mut(1);
    let fine = &mut head[0];
    let coarse = &mut tail[0];

    // The compound's image still owns a child graph; the leaves contracted into one vertex
    // inside it.
    let p_image = fine.node(p).multilevel.next.expect("compound has an image");
    let image_child = coarse
        .node(p_image)
        .child
        .expect("compound image owns a child graph");
    assert_eq!(coarse.graph(image_child).nodes.len(), 1);
    assert_eq!(coarse.node(p_image).multilevel.pred1, Some(p));

    let x_image = fine.node(x).multilevel.next.expect("leaf has an image");
    let y_image = fine.node(y).multilevel.next.expect("leaf has an image");
    assert_eq!(x_image, y_image);
    assert_eq!(coarse.graph(image_child).nodes, vec![x_image]);

    // Root level: the compound image plus q's image.
    assert_eq!(coarse.graph(coarse.root_graph()).nodes.len(), 2);
}

#[test]
fn carried_edges_are_deduplicated() {
    let (manager, _p, _x, _y, _q) = nested();
    let mut levels = build_levels(manager);

    let coarse = &mut levels[1];
    // x-y collapsed into its contraction result; x-q and y-q map to the same coarse pair and
    // must be carried once. It stays inter-graph: one endpoint lives inside the compound image.
    assert_eq!(coarse.all_edges().len(), 1);
    assert_eq!(coarse.inter_graph_edges().len(), 1);
}

#[test]
fn mirrored_nodes_copy_position_and_size() {
    let (mut manager, _p, x, y, q) = nested();
    {
        let node = manager.node_mut(x);
        node.set_location(12.0, -7.0);
        node.set_width(30.0);
        node.set_height(20.0);
    }
    {
        let node = manager.node_mut(y);
        node.set_location(3.0, 9.0);
        node.set_width(16.0);
        node.set_height(14.0);
    }
    {
        let node = manager.node_mut(q);
        node.set_location(-40.0, 2.0);
        node.set_width(6.0);
        node.set_height(6.0);
    }

    let mut levels = build_levels(manager);
    let (head, tail) = levels.split_at_mut(1);
    let fine = &mut head[0];
    let coarse = &mut tail[0];

    // x and y share one contraction result; y is mirrored after x, so its geometry wins.
    let shared = fine.node(x).multilevel.next.expect("leaf has an image");
    assert_eq!(coarse.node(shared).center.x, 3.0);
    assert_eq!(coarse.node(shared).center.y, 9.0);
    assert_eq!(coarse.node(shared).scale.x, 16.0);
    assert_eq!(coarse.node(shared).scale.y, 14.0);

    let q_image = fine.node(q).multilevel.next.expect("leaf has an image");
    assert_eq!(coarse.node(q_image).center.x, -40.0);
    assert_eq!(coarse.node(q_image).scale.x, 6.0);
}

#[test]
fn uncoarsening_projects_positions_down() {
    let (manager, _p, x, y, q) = nested();
    let mut levels = build_levels(manager);
    let (head, tail) = levels.split_at_mut(1);
    let fine = &mut head[0];
    let coarse = &mut tail[0];

    for node in coarse.all_nodes() {
        let offset = node.index() as f64;
        coarse.node_mut(node).set_location(10.0 * offset, -5.0 * offset);
    }

    let edge_length = fine.params().edge_length;
    project_positions(coarse, fine, edge_length);

    let x_image = fine.node(x).multilevel.next.expect("leaf has an image");
    let image_center = coarse.node(x_image).center;

    // x was pred1 of the contraction result, y pred2; q maps to its own image.
    assert_eq!(fine.node(x).center, image_center);
    assert_eq!(fine.node(y).center.x, image_center.x + edge_length);
    assert_eq!(fine.node(y).center.y, image_center.y + edge_length);

    let q_image = fine.node(q).multilevel.next.expect("leaf has an image");
    assert_eq!(fine.node(q).center, coarse.node(q_image).center);
}

#[test]
fn ideal_lengths_grow_with_depth_distance() {
    let (mut manager, _p, x, _y, q) = nested();
    manager.calc_inclusion_tree_depths();
    manager.calc_lowest_common_ancestors();
    manager.calc_estimated_sizes();

    calc_ideal_edge_lengths(&mut manager);

    let base = manager.params().edge_length;
    let factor = manager.params().per_level_ideal_edge_length_factor;

    let mut intra = None;
    let mut inter = None;
    for edge in manager.all_edges() {
        let e = manager.edge(edge);
        if e.source == x && e.target == q {
            inter = Some(e.ideal_length);
        }
        if !e.is_inter_graph {
            intra = Some(e.ideal_length);
        }
    }

    // Intra-graph edges stay at the base length; x (depth 2) to q (depth 1) spans one level
    // beyond their root-level LCA (depth 1).
    assert_eq!(intra.expect("intra edge present"), base);
    assert_eq!(
        inter.expect("inter edge present"),
        base + base * factor * (2.0 + 1.0 - 2.0)
    );
}

#[test]
fn smart_sizing_uses_in_lca_estimates() {
    let params = LayoutParams {
        use_smart_ideal_edge_calculation: true,
        ..Default::default()
    };
    let mut manager = GraphManager::new(params);
    let root = manager.add_root_graph();
    let p = manager.add_new_node(root);
    let inner = manager.add_graph(p);
    let x = manager.add_new_node(inner);
    {
        let node = manager.node_mut(x);
        node.set_width(10.0);
        node.set_height(10.0);
    }
    let q = manager.add_new_node(root);
    {
        let node = manager.node_mut(q);
        node.set_width(10.0);
        node.set_height(10.0);
    }
    let edge = manager.add_edge(x, q);

    manager.calc_inclusion_tree_depths();
    manager.calc_lowest_common_ancestors();
    manager.calc_estimated_sizes();
    calc_ideal_edge_lengths(&mut manager);

    // x projects to its compound p in the root graph; p's estimate is its child graph's (10),
    // q's is its own leaf mean (10). Both replace a simple node of size 40.
    let expected = 50.0 + (10.0 + 10.0 - 2.0 * 40.0) + 50.0 * 0.1 * (2.0 + 1.0 - 2.0);
    assert_eq!(manager.edge(edge).ideal_length, expected);
}

#[test]
fn level_dumps_summarize_the_ladder() {
    let mut levels = build_levels(chain(8));
    let dumps = dump_levels(&mut levels);

    assert_eq!(dumps.len(), levels.len());
    assert_eq!(dumps[0].nodes, 8);
    assert_eq!(dumps[0].edges, 7);
    assert_eq!(dumps[0].inter_graph_edges, 0);
    for pair in dumps.windows(2) {
        assert!(pair[1].nodes <= pair[0].nodes);
    }
}

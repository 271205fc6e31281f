//! Per-edge ideal spring lengths.

use cuttle_graphlib::GraphManager;

/// Assigns every edge its ideal spring length.
///
/// Intra-graph edges get the configured base length. Inter-graph edges additionally grow with
/// the inclusion-depth distance they span (base length times the per-level factor times
/// `source depth + target depth - 2 * LCA depth`) and, under smart sizing, with the estimated
/// sizes of the in-LCA endpoints in place of two simple nodes.
///
/// Inclusion depths, LCAs and estimated sizes must have been computed on `manager` first.
pub fn calc_ideal_edge_lengths(manager: &mut GraphManager) {
    let params = *manager.params();

    for edge in manager.all_edges() {
        manager.edge_mut(edge).ideal_length = params.edge_length;

        let (inter_graph, source, target, source_in_lca, target_in_lca, lca) = {
            let e = manager.edge(edge);
            (
                e.is_inter_graph,
                e.source,
                e.target,
                e.source_in_lca,
                e.target_in_lca,
                e.lowest_common_ancestor,
            )
        };
        if !inter_graph {
            continue;
        }

        let source_in_lca =
            source_in_lca.expect("LCA projections not computed for inter-graph edge");
        let target_in_lca =
            target_in_lca.expect("LCA projections not computed for inter-graph edge");
        let lca = lca.expect("LCA not computed for inter-graph edge");

        let mut ideal = params.edge_length;

        if params.use_smart_ideal_edge_calculation {
            let size_source = manager.node(source_in_lca).estimated_size.round();
            let size_target = manager.node(target_in_lca).estimated_size.round();
            ideal += size_source + size_target - 2.0 * params.simple_node_size;
        }

        let source_depth = manager.node(source).inclusion_tree_depth;
        let target_depth = manager.node(target).inclusion_tree_depth;
        assert!(
            source_depth != usize::MAX && target_depth != usize::MAX,
            "inclusion tree depths not computed"
        );
        let lca_depth = manager.graph_inclusion_depth(lca);

        ideal += params.edge_length
            * params.per_level_ideal_edge_length_factor
            * (source_depth as f64 + target_depth as f64 - 2.0 * lca_depth as f64);

        manager.edge_mut(edge).ideal_length = ideal;
    }
}

//! Building and walking the multilevel ladder.
//!
//! `build_levels` turns one hierarchy into an ordered list of managers from finest to coarsest;
//! the solver relaxes the coarsest level first, then `project_positions` seeds each finer level
//! from the one above it before the next relaxation.

use cuttle_graphlib::{GraphId, GraphManager};
use tracing::debug;

use crate::coarsen::CoarsenGraph;

/// Builds the ladder of managers for multilevel relaxation, finest first.
///
/// One flat coarsening graph over all leaves drives the loop: each pass contracts it, and the
/// hierarchy is mirrored into a fresh manager around the contraction results (compound nodes are
/// preserved one level down, leaves are replaced). The loop stops at the fixed point (a pass
/// that no longer shrinks the graph) or once at most one vertex is left; the manager produced by
/// that final pass carries no extra information and is dropped from the ladder.
pub fn build_levels(manager: GraphManager) -> Vec<GraphManager> {
    let mut levels = vec![manager];
    let mut coarsening = CoarsenGraph::from_hierarchy(&levels[0]);
    let mut current = coarsening.node_count();

    loop {
        let previous = current;
        let params = *levels.last().expect("ladder is never empty").params();
        let mut coarse = GraphManager::new(params);

        {
            let fine = levels.last_mut().expect("ladder is never empty");
            coarsening.coarsen(fine, &mut coarse);
            coarse.add_root_graph();
            let fine_root = fine.root_graph();
            let coarse_root = coarse.root_graph();
            mirror_level(fine, fine_root, &mut coarse, coarse_root);
            carry_edges(fine, &mut coarse);
        }

        current = coarsening.node_count();
        debug!(
            level = levels.len(),
            previous, current, "coarsened one level"
        );
        levels.push(coarse);

        if previous == current || current <= 1 {
            break;
        }
    }

    levels.pop();
    levels
}

/// Mirrors one graph of the fine level into the coarse manager. Compound nodes get a fresh image
/// with its own child graph; leaves reuse the contraction result assigned by the coarsening pass,
/// added to a graph only once. Every image copies its source's position and size.
fn mirror_level(
    fine: &mut GraphManager,
    fine_graph: GraphId,
    coarse: &mut GraphManager,
    coarse_graph: GraphId,
) {
    for node in fine.graph(fine_graph).nodes.clone() {
        if let Some(child) = fine.node(node).child {
            let mirrored = coarse.new_node();
            coarse.node_mut(mirrored).multilevel.pred1 = Some(node);
            fine.node_mut(node).multilevel.next = Some(mirrored);
            coarse.add_node(mirrored, coarse_graph);
            let nested = coarse.add_graph(mirrored);
            mirror_level(fine, child, coarse, nested);
        } else {
            let contracted = fine
                .node(node)
                .multilevel
                .next
                .expect("leaf node was not assigned a contraction result");
            if !coarse.node(contracted).multilevel.processed {
                coarse.add_node(contracted, coarse_graph);
                coarse.node_mut(contracted).multilevel.processed = true;
            }
        }

        let next = fine
            .node(node)
            .multilevel
            .next
            .expect("node has no next-level image");
        let (center, scale) = {
            let n = fine.node(node);
            (n.center, n.scale)
        };
        let image = coarse.node_mut(next);
        image.set_location(center.x, center.y);
        image.set_width(scale.x);
        image.set_height(scale.y);
    }
}

/// Carries the fine level's edges into the coarse manager. Inter-graph edges and edges touching a
/// compound endpoint are structural and always carried; a leaf-to-leaf edge is carried only when
/// its endpoints contracted into distinct results. Duplicates are presence-checked away.
fn carry_edges(fine: &mut GraphManager, coarse: &mut GraphManager) {
    for edge in fine.all_edges() {
        let (source, target, inter_graph) = {
            let e = fine.edge(edge);
            (e.source, e.target, e.is_inter_graph)
        };
        let source_next = fine
            .node(source)
            .multilevel
            .next
            .expect("edge source has no next-level image");
        let target_next = fine
            .node(target)
            .multilevel
            .next
            .expect("edge target has no next-level image");

        let structural = inter_graph
            || fine.node(source).child.is_some()
            || fine.node(target).child.is_some();
        if !structural && source_next == target_next {
            continue;
        }
        if !coarse.neighbors(source_next).contains(&target_next) {
            coarse.add_edge(source_next, target_next);
        }
    }
}

/// Uncoarsening: seeds the finer level from a relaxed coarser one. Each coarse node places its
/// first predecessor at its own center; a second predecessor is offset by one edge length on both
/// axes so the pair does not start coincident.
pub fn project_positions(coarse: &mut GraphManager, fine: &mut GraphManager, edge_length: f64) {
    for node in coarse.all_nodes() {
        let links = coarse.node(node).multilevel;
        let center = coarse.node(node).center;

        let pred1 = links
            .pred1
            .expect("coarse node has no finer predecessor");
        fine.node_mut(pred1).set_location(center.x, center.y);

        if let Some(pred2) = links.pred2 {
            fine.node_mut(pred2)
                .set_location(center.x + edge_length, center.y + edge_length);
        }
    }
}

/// Per-level base edge lengths, finest first: each coarser level shrinks by sqrt(4/7), floored
/// and never below one unit.
pub fn level_edge_lengths(levels: usize, base: f64) -> Vec<f64> {
    let factor = (4.0f64 / 7.0).sqrt();
    let mut out = Vec::with_capacity(levels);
    let mut length = base;
    for level in 0..levels {
        if level > 0 {
            length = (length * factor).floor().max(1.0);
        }
        out.push(length);
    }
    out
}

//! JSON snapshots of a level ladder for diagnostics.

use cuttle_graphlib::GraphManager;
use serde::Serialize;

/// Size summary of one ladder level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelDump {
    pub level: usize,
    pub graphs: usize,
    pub nodes: usize,
    pub edges: usize,
    pub inter_graph_edges: usize,
}

/// Summaries for every level, finest first.
pub fn dump_levels(levels: &mut [GraphManager]) -> Vec<LevelDump> {
    levels
        .iter_mut()
        .enumerate()
        .map(|(level, manager)| LevelDump {
            level,
            graphs: manager.graphs().len(),
            nodes: manager.all_nodes().len(),
            edges: manager.all_edges().len(),
            inter_graph_edges: manager.inter_graph_edges().len(),
        })
        .collect()
}

/// Pretty-printed JSON of [`dump_levels`]; best effort, an empty string on serialization failure.
pub fn dump_levels_json(levels: &mut [GraphManager]) -> String {
    serde_json::to_string_pretty(&dump_levels(levels)).unwrap_or_default()
}

//! Layout parameters shared by the hierarchy model and the multilevel pipeline.

/// Numeric parameters for one layout run.
///
/// One value is passed into [`GraphManager::new`](crate::GraphManager::new) and copied into every
/// coarser level derived from it; there is no process-wide configuration state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Base ideal length of a spring edge.
    pub edge_length: f64,
    /// Margin added on each side of a computed compound graph's bounds.
    pub graph_margin: f64,
    /// Margin between a compound node's border and its child graph's bounds.
    pub compound_node_margin: f64,
    /// Estimated size assigned to a compound with no members.
    pub empty_compound_size: f64,
    /// Estimated size of a plain leaf node, used by smart ideal-length calculation.
    pub simple_node_size: f64,
    /// Ideal-length growth per inclusion-depth level an edge spans.
    pub per_level_ideal_edge_length_factor: f64,
    /// Grow inter-graph ideal lengths by the estimated sizes of the in-LCA endpoints.
    pub use_smart_ideal_edge_calculation: bool,
    /// Shrink the base edge length on coarser levels of the multilevel ladder.
    pub use_smart_multilevel_calculation: bool,
    /// All leaves share one size, allowing the cheap center-distance edge length.
    pub uniform_leaf_node_size: bool,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            edge_length: 50.0,
            graph_margin: 15.0,
            compound_node_margin: 5.0,
            empty_compound_size: 40.0,
            simple_node_size: 40.0,
            per_level_ideal_edge_length_factor: 0.1,
            use_smart_ideal_edge_calculation: false,
            use_smart_multilevel_calculation: false,
            uniform_leaf_node_size: false,
        }
    }
}

//! Multilevel compound graph layout core.
//!
//! The hierarchy model (compound nodes, inter-graph edges, bounds, LCA) lives in
//! `cuttle-graphlib`, re-exported here as [`graphlib`]. This crate adds the multilevel machinery
//! a force solver drives: building the coarsening ladder, projecting positions back down, and
//! assigning per-edge ideal spring lengths.

pub use cuttle_graphlib as graphlib;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod coarsen;
pub mod dump;
pub mod ideal;
pub mod multilevel;

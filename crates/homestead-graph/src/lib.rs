//! Entity dependency graph for the Homestead unlock engine.
//!
//! The graph models only entity-to-entity requirements: a raw token that is
//! exactly the id of another entity becomes an edge. Typed gates such as
//! `farm_stage_3` are not edges; the prerequisite resolver interprets them.
//!
//! # Modules
//!
//! - [`graph`] -- [`DependencyGraph`] build, closures, cycles and depths
//! - [`shared`] -- [`SharedGraph`], an atomically swappable graph holder

pub mod graph;
pub mod shared;

pub use graph::{CycleReport, DependencyGraph, GraphNode, GraphStats};
pub use shared::SharedGraph;

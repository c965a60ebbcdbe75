//! A routing engine for many-to-many travel time and distance matrices.
//!
//! The graph is a road network in edge-based representation, augmented with a
//! nested multi-level cell partition and precomputed shortcut tables between
//! the boundary nodes of each cell.
//! Matrix queries climb and descend this overlay with partition-aware
//! label-setting searches.

#[macro_use]
pub mod report;
pub mod algo;
pub mod datastr;
pub mod util;

//! Cluster hierarchies over the sites of a layout.
//!
//! [`tree::ClusterHierarchy`] is the arena the search walks; [`potential::PotentialHierarchy`]
//! builds one from observation cones.

pub mod potential;
pub mod tree;

pub use potential::{HierarchyProvider, PotentialHierarchy};
pub use tree::{ClusterHierarchy, HierarchyNode};

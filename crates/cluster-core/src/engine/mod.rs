//! # Engine Module
//!
//! The stateful machinery of the ClusterExact search: configuration, caches, potential
//! bounds, the stability check and the branch-and-bound refiner that walks the cluster
//! hierarchy.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Search parameters and their builder
//! - **Enumeration** ([`partition`]) - Distributions of a charge multiset over clusters
//! - **Bounding** ([`bounds`], [`cache`]) - Potential bounds between clusters and their memoisation
//! - **Pruning** ([`stability`]) - Population stability of a clustering under its multisets
//! - **Search** ([`refine`]) - Recursive refinement down to single-site clusters
//! - **Progress Monitoring** ([`progress`]) - Progress events for front ends
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! The search is exact: a clustering is only discarded when the bounds prove that no
//! arrangement of its multisets can be population stable.

pub mod bounds;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod partition;
pub mod progress;
pub mod refine;
pub mod stability;

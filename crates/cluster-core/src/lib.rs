//! # ClusterExact Core Library
//!
//! Exact ground-state search for silicon dangling bond (SiDB) layouts on the
//! hydrogen-passivated Si(100)-2x1 surface.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Data models (`ChargeMultiset`, `Cluster`, `SiteLayout`),
//!   the electrostatics of a charged surface (`ChargeSurface`), the cluster hierarchy and
//!   I/O utilities.
//!
//! - **[`engine`]: The Logic Core.** Potential bounds between clusters, their caches, the
//!   multiset partition enumerator, the population stability check and the recursive
//!   refiner that prunes the search space.
//!
//! - **[`workflows`]: The Public API.** Complete simulations that tie the layers together,
//!   such as [`workflows::ground_state::run`], and the [`workflows::result::SimulationResult`]
//!   they return.

pub mod core;
pub mod engine;
pub mod workflows;

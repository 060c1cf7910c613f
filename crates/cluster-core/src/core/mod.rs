//! # Core Module
//!
//! Stateless building blocks of the ground-state search: the data model of charges,
//! clusters and layouts, the electrostatics of dangling bond surfaces, the cluster
//! hierarchy and file I/O.
//!
//! ## Architecture
//!
//! - **Data Model** ([`models`]) - Charge states, multisets, clusters, configurations and layouts
//! - **Electrostatics** ([`physics`]) - Physical parameters, screened Coulomb potentials and
//!   the [`physics::surface::ChargeSurface`] that evaluates local potentials, energies and validity
//! - **Clustering** ([`hierarchy`]) - The cluster tree the search refines and the cone-angle
//!   provider that builds it
//! - **File I/O** ([`io`]) - CSV layouts and result tables

pub mod hierarchy;
pub mod io;
pub mod models;
pub mod physics;

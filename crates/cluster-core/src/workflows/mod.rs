//! # Workflows Module
//!
//! Top-level entry points that run a complete ground-state simulation of a layout.
//!
//! ## Overview
//!
//! A workflow validates its input, builds the electrostatic model, drives the engine
//! and returns a [`result::SimulationResult`] holding every physically valid charge
//! distribution sorted by energy.
//!
//! - **ClusterExact** ([`ground_state`]) - Branch-and-bound over the cluster hierarchy
//! - **Exhaustive** ([`exhaustive`]) - Brute-force enumeration for small layouts, used as
//!   a reference
//! - **Results** ([`result`]) - The common result type

pub mod exhaustive;
pub mod ground_state;
pub mod result;

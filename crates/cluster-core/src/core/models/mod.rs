//! # Core Models Module
//!
//! Plain data types shared by every layer of the search.
//!
//! ## Key Components
//!
//! - [`charge`] - Charge states and multisets of charge states
//! - [`cluster`] - Site clusters with optional pre-assigned charges
//! - [`configuration`] - Per-site charge configurations and verified distributions
//! - [`layout`] - Site layouts in SiQAD lattice coordinates
//! - [`ids`] - Arena keys
//!
//! ## Usage
//!
//! ```ignore
//! use clusterexact::core::models::charge::{ChargeMultiset, ChargeState};
//! use clusterexact::core::models::cluster::Cluster;
//!
//! let cluster = Cluster::new([3, 1, 2]);
//! let multiset = ChargeMultiset::new(1, 2, 0);
//! assert_eq!(cluster.free_size() as u64, multiset.total());
//! ```

pub mod charge;
pub mod cluster;
pub mod configuration;
pub mod ids;
pub mod layout;

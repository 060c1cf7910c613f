#![allow(dead_code)]

use clusterexact::core::models::layout::{SiteCoord, SiteLayout};
use clusterexact::core::physics::params::{POP_STABILITY_ERR, PhysicalParams};
use clusterexact::engine::config::SearchConfig;
use clusterexact::engine::progress::ProgressReporter;
use clusterexact::workflows::result::SimulationResult;
use clusterexact::workflows::{exhaustive, ground_state};

pub fn layout(sites: &[(i64, i64, u8)]) -> SiteLayout {
    SiteLayout::from_sites(sites.iter().map(|&(x, y, z)| SiteCoord::new(x, y, z))).unwrap()
}

pub fn params_with_mu(mu_minus: f64) -> PhysicalParams {
    PhysicalParams {
        mu_minus,
        ..PhysicalParams::default()
    }
}

pub fn config(params: PhysicalParams, threads: usize, allow_positive: bool) -> SearchConfig {
    SearchConfig::builder()
        .physical_params(params)
        .num_threads(threads)
        .allow_positive_charges(allow_positive)
        .build()
        .unwrap()
}

pub fn cluster_exact(layout: &SiteLayout, config: &SearchConfig) -> SimulationResult {
    ground_state::run(layout, config, &ProgressReporter::new()).unwrap()
}

pub fn exhaustive(layout: &SiteLayout, config: &SearchConfig) -> SimulationResult {
    exhaustive::run(layout, config, &ProgressReporter::new()).unwrap()
}

pub fn rendered(result: &SimulationResult) -> Vec<String> {
    result
        .charge_distributions
        .iter()
        .map(|d| d.configuration.to_string())
        .collect()
}

/// Asserts both results hold the same configurations with matching energies.
pub fn assert_same_distributions(actual: &SimulationResult, expected: &SimulationResult) {
    assert_eq!(
        actual.configurations(),
        expected.configurations(),
        "{} and {} disagree",
        actual.algorithm_name,
        expected.algorithm_name
    );
    for (a, e) in actual
        .charge_distributions
        .iter()
        .zip(&expected.charge_distributions)
    {
        assert!((a.system_energy - e.system_energy).abs() < POP_STABILITY_ERR);
    }
}

/// Y-shaped OR gate with input 01.
pub const Y_GATE: [(i64, i64, u8); 8] = [
    (6, 2, 0),
    (8, 3, 0),
    (12, 3, 0),
    (14, 2, 0),
    (10, 5, 0),
    (10, 6, 1),
    (10, 8, 1),
    (16, 1, 0),
];

/// Two binary-dot-logic pairs between a perturber and an output pair.
pub const BDL_WIRE: [(i64, i64, u8); 7] = [
    (0, 0, 0),
    (5, 0, 0),
    (7, 0, 0),
    (11, 0, 0),
    (13, 0, 0),
    (17, 0, 0),
    (19, 0, 0),
];

/// Four sites where one dimer partner can hold a positive charge.
pub const FOUR_SITES_WITH_POSITIVE: [(i64, i64, u8); 4] =
    [(2, 0, 1), (4, 0, 1), (2, 1, 0), (3, 1, 1)];

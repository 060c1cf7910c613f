use super::result::SimulationResult;
use crate::core::models::charge::ChargeState;
use crate::core::models::configuration::{ChargeConfiguration, ChargeDistribution};
use crate::core::models::layout::SiteLayout;
use crate::core::physics::surface::ChargeSurface;
use crate::engine::config::SearchConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use itertools::Itertools;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, instrument};

pub const ALGORITHM_NAME: &str = "ExhaustiveGS";

/// Largest number of configurations the brute-force enumeration will visit.
pub const MAX_EXHAUSTIVE_CONFIGURATIONS: u64 = 1 << 24;

const TWO_STATES: [ChargeState; 2] = [ChargeState::Negative, ChargeState::Neutral];

/// Enumerates every charge configuration of `layout` and keeps the physically valid ones.
///
/// Positive charges are only enumerated when they are allowed and at least one site
/// could hold one. Serves as the reference the branch-and-bound search is checked against.
#[instrument(skip_all, name = "exhaustive_workflow")]
pub fn run(
    layout: &SiteLayout,
    config: &SearchConfig,
    reporter: &ProgressReporter,
) -> Result<SimulationResult, EngineError> {
    let start = Instant::now();
    layout.validate()?;
    let params = config.physical_params;
    let n = layout.num_sites();

    if layout.is_empty() {
        return Ok(SimulationResult::new(
            ALGORITHM_NAME,
            start.elapsed(),
            params,
            Vec::new(),
        ));
    }

    let surface = ChargeSurface::new(layout, params);
    let states: &[ChargeState] =
        if config.allow_positive_charges && surface.is_three_state_simulation_required() {
            &ChargeState::ALL
        } else {
            &TWO_STATES
        };

    let total = u32::try_from(n)
        .ok()
        .and_then(|n| (states.len() as u64).checked_pow(n))
        .filter(|&total| total <= MAX_EXHAUSTIVE_CONFIGURATIONS)
        .ok_or_else(|| EngineError::InvalidLayout {
            reason: format!(
                "{n} sites with {} charge states exceed the exhaustive search limit of {MAX_EXHAUSTIVE_CONFIGURATIONS} configurations",
                states.len()
            ),
        })?;
    info!(
        sites = n,
        charge_states = states.len(),
        configurations = total,
        "Starting exhaustive enumeration."
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.effective_threads())
        .build()
        .map_err(|e| EngineError::ThreadPool(e.to_string()))?;

    let distributions: Vec<ChargeDistribution> = reporter.phase("Exhaustive Enumeration", || {
        pool.install(|| {
            std::iter::repeat_n(states.iter().copied(), n)
                .multi_cartesian_product()
                .par_bridge()
                .map_init(
                    || surface.clone(),
                    |scratch, charges| {
                        let configuration = ChargeConfiguration::new(charges);
                        scratch.assign_configuration(&configuration);
                        scratch.update_after_charge_change();
                        scratch.is_physically_valid().then(|| ChargeDistribution {
                            system_energy: scratch.system_energy(),
                            configuration,
                        })
                    },
                )
                .flatten()
                .collect()
        })
    });

    let result = SimulationResult::new(ALGORITHM_NAME, start.elapsed(), params, distributions);
    info!(valid = result.len(), "Exhaustive enumeration complete.");
    Ok(result)
}

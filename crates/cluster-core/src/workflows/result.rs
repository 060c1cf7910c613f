use crate::core::models::configuration::{ChargeConfiguration, ChargeDistribution};
use crate::core::physics::params::{POP_STABILITY_ERR, PhysicalParams};
use std::collections::HashSet;
use std::time::Duration;

/// Outcome of a simulation: every physically valid charge distribution that was found.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub algorithm_name: &'static str,
    pub runtime: Duration,
    pub physical_params: PhysicalParams,
    /// Sorted by system energy, ties broken by configuration.
    pub charge_distributions: Vec<ChargeDistribution>,
}

impl SimulationResult {
    pub fn new(
        algorithm_name: &'static str,
        runtime: Duration,
        physical_params: PhysicalParams,
        mut charge_distributions: Vec<ChargeDistribution>,
    ) -> Self {
        charge_distributions.sort_by(|a, b| {
            a.system_energy
                .total_cmp(&b.system_energy)
                .then_with(|| a.configuration.cmp(&b.configuration))
        });
        Self {
            algorithm_name,
            runtime,
            physical_params,
            charge_distributions,
        }
    }

    pub fn len(&self) -> usize {
        self.charge_distributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charge_distributions.is_empty()
    }

    pub fn configurations(&self) -> HashSet<ChargeConfiguration> {
        self.charge_distributions
            .iter()
            .map(|d| d.configuration.clone())
            .collect()
    }

    pub fn ground_state_energy(&self) -> Option<f64> {
        self.charge_distributions.first().map(|d| d.system_energy)
    }

    /// Distributions whose energy lies within the stability tolerance of the minimum.
    pub fn ground_states(&self) -> Vec<&ChargeDistribution> {
        let Some(min) = self.ground_state_energy() else {
            return Vec::new();
        };
        self.charge_distributions
            .iter()
            .take_while(|d| d.system_energy - min < POP_STABILITY_ERR)
            .collect()
    }
}

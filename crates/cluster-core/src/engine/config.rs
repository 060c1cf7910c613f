use crate::core::physics::params::PhysicalParams;
use thiserror::Error;

pub const DEFAULT_CONE_ANGLE: f64 = 45.0;
pub const DEFAULT_BOUND_CACHE_MIN_SIZE: usize = 4;
pub const DEFAULT_MAX_POSITIVE_CANDIDATES: usize = 10;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Invalid physical parameters: {0}")]
    InvalidPhysicalParams(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub physical_params: PhysicalParams,
    /// Opening angle of the hierarchy's observation cones, in degrees.
    pub cone_angle: f64,
    /// Worker threads; `None` uses the available hardware concurrency.
    pub num_threads: Option<usize>,
    /// Combined size of two clusters from which their bounds are memoised.
    pub bound_cache_min_size: usize,
    /// Whether positively charged sites are considered at all.
    pub allow_positive_charges: bool,
    /// Largest candidate count for which every subset of positive candidates is searched.
    pub max_positive_candidates: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            physical_params: PhysicalParams::default(),
            cone_angle: DEFAULT_CONE_ANGLE,
            num_threads: None,
            bound_cache_min_size: DEFAULT_BOUND_CACHE_MIN_SIZE,
            allow_positive_charges: true,
            max_positive_candidates: DEFAULT_MAX_POSITIVE_CANDIDATES,
        }
    }
}

impl SearchConfig {
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }

    /// Thread count to run with, falling back to the hardware concurrency.
    pub fn effective_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

#[derive(Default)]
pub struct SearchConfigBuilder {
    physical_params: Option<PhysicalParams>,
    cone_angle: Option<f64>,
    num_threads: Option<usize>,
    bound_cache_min_size: Option<usize>,
    allow_positive_charges: Option<bool>,
    max_positive_candidates: Option<usize>,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn physical_params(mut self, params: PhysicalParams) -> Self {
        self.physical_params = Some(params);
        self
    }
    pub fn cone_angle(mut self, degrees: f64) -> Self {
        self.cone_angle = Some(degrees);
        self
    }
    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }
    pub fn bound_cache_min_size(mut self, size: usize) -> Self {
        self.bound_cache_min_size = Some(size);
        self
    }
    pub fn allow_positive_charges(mut self, allow: bool) -> Self {
        self.allow_positive_charges = Some(allow);
        self
    }
    pub fn max_positive_candidates(mut self, n: usize) -> Self {
        self.max_positive_candidates = Some(n);
        self
    }

    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let defaults = SearchConfig::default();

        let cone_angle = self.cone_angle.unwrap_or(defaults.cone_angle);
        if !(cone_angle.is_finite() && cone_angle > 0.0 && cone_angle <= 180.0) {
            return Err(ConfigError::InvalidParameter {
                name: "cone_angle",
                reason: format!("expected degrees in (0, 180], got {cone_angle}"),
            });
        }

        if self.num_threads == Some(0) {
            return Err(ConfigError::InvalidParameter {
                name: "num_threads",
                reason: "must be at least 1".to_string(),
            });
        }

        let physical_params = self.physical_params.unwrap_or(defaults.physical_params);
        let errors = physical_params.validation_errors();
        if !errors.is_empty() {
            return Err(ConfigError::InvalidPhysicalParams(errors.join("; ")));
        }

        Ok(SearchConfig {
            physical_params,
            cone_angle,
            num_threads: self.num_threads,
            bound_cache_min_size: self
                .bound_cache_min_size
                .unwrap_or(defaults.bound_cache_min_size),
            allow_positive_charges: self
                .allow_positive_charges
                .unwrap_or(defaults.allow_positive_charges),
            max_positive_candidates: self
                .max_positive_candidates
                .unwrap_or(defaults.max_positive_candidates),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_uses_defaults_for_unset_fields() {
        let config = SearchConfigBuilder::new().build().unwrap();
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.cone_angle, 45.0);
        assert_eq!(config.bound_cache_min_size, 4);
        assert!(config.allow_positive_charges);
    }

    #[test]
    fn build_keeps_explicit_values() {
        let config = SearchConfig::builder()
            .cone_angle(60.0)
            .num_threads(3)
            .bound_cache_min_size(6)
            .allow_positive_charges(false)
            .max_positive_candidates(4)
            .build()
            .unwrap();
        assert_eq!(config.cone_angle, 60.0);
        assert_eq!(config.num_threads, Some(3));
        assert_eq!(config.effective_threads(), 3);
        assert_eq!(config.bound_cache_min_size, 6);
        assert!(!config.allow_positive_charges);
        assert_eq!(config.max_positive_candidates, 4);
    }

    #[test]
    fn build_rejects_out_of_range_cone_angles() {
        for angle in [0.0, -5.0, 180.5, f64::NAN, f64::INFINITY] {
            let result = SearchConfigBuilder::new().cone_angle(angle).build();
            assert!(
                matches!(
                    result,
                    Err(ConfigError::InvalidParameter {
                        name: "cone_angle",
                        ..
                    })
                ),
                "angle {angle} should be rejected"
            );
        }
        assert!(SearchConfigBuilder::new().cone_angle(180.0).build().is_ok());
    }

    #[test]
    fn build_rejects_zero_threads() {
        let result = SearchConfigBuilder::new().num_threads(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "num_threads",
                ..
            })
        ));
    }

    #[test]
    fn build_rejects_invalid_physical_params() {
        let params = PhysicalParams {
            epsilon_r: -1.0,
            ..Default::default()
        };
        let result = SearchConfigBuilder::new().physical_params(params).build();
        assert!(matches!(result, Err(ConfigError::InvalidPhysicalParams(_))));
    }

    #[test]
    fn effective_threads_falls_back_to_hardware() {
        assert!(SearchConfig::default().effective_threads() >= 1);
    }
}

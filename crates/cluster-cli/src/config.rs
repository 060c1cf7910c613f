use crate::cli::SimulateArgs;
use crate::error::{CliError, Result};
use clusterexact::core::physics::params::PhysicalParams;
use clusterexact::engine::config::SearchConfig;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialPhysicsConfig {
    epsilon_r: Option<f64>,
    lambda_tf: Option<f64>,
    mu_minus: Option<f64>,
    lat_a: Option<f64>,
    lat_b: Option<f64>,
    lat_c: Option<f64>,
}

impl PartialPhysicsConfig {
    fn into_params(self) -> PhysicalParams {
        let defaults = PhysicalParams::default();
        PhysicalParams {
            epsilon_r: self.epsilon_r.unwrap_or(defaults.epsilon_r),
            lambda_tf: self.lambda_tf.unwrap_or(defaults.lambda_tf),
            mu_minus: self.mu_minus.unwrap_or(defaults.mu_minus),
            lat_a: self.lat_a.unwrap_or(defaults.lat_a),
            lat_b: self.lat_b.unwrap_or(defaults.lat_b),
            lat_c: self.lat_c.unwrap_or(defaults.lat_c),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSearchConfig {
    cone_angle: Option<f64>,
    num_threads: Option<usize>,
    bound_cache_min_size: Option<usize>,
    allow_positive_charges: Option<bool>,
    max_positive_candidates: Option<usize>,
}

/// Run file contents before CLI overrides are applied; every key is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    physics: Option<PartialPhysicsConfig>,
    search: Option<PartialSearchConfig>,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Resolves the final search configuration. CLI flags win over `--set` values, which
    /// win over the file, which wins over the library defaults.
    pub fn merge_with_cli(
        mut self,
        args: &SimulateArgs,
        threads: Option<usize>,
    ) -> Result<SearchConfig> {
        self.apply_set_values(&args.set_values)?;

        let physics = self.physics.take().unwrap_or_default();
        let search = self.search.take().unwrap_or_default();

        let mut builder = SearchConfig::builder().physical_params(physics.into_params());
        if let Some(angle) = args.cone_angle.or(search.cone_angle) {
            builder = builder.cone_angle(angle);
        }
        if let Some(n) = threads.or(search.num_threads) {
            builder = builder.num_threads(n);
        }
        if let Some(size) = args.bound_cache_min_size.or(search.bound_cache_min_size) {
            builder = builder.bound_cache_min_size(size);
        }
        if args.no_positive {
            builder = builder.allow_positive_charges(false);
        } else if let Some(allow) = search.allow_positive_charges {
            builder = builder.allow_positive_charges(allow);
        }
        if let Some(n) = search.max_positive_candidates {
            builder = builder.max_positive_candidates(n);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "physics.epsilon-r" => {
                    self.physics.get_or_insert_with(Default::default).epsilon_r =
                        Some(parse_value(key, value_str)?)
                }
                "physics.lambda-tf" => {
                    self.physics.get_or_insert_with(Default::default).lambda_tf =
                        Some(parse_value(key, value_str)?)
                }
                "physics.mu-minus" => {
                    self.physics.get_or_insert_with(Default::default).mu_minus =
                        Some(parse_value(key, value_str)?)
                }
                "search.cone-angle" => {
                    self.search.get_or_insert_with(Default::default).cone_angle =
                        Some(parse_value(key, value_str)?)
                }
                "search.bound-cache-min-size" => {
                    self.search.get_or_insert_with(Default::default).bound_cache_min_size =
                        Some(parse_value(key, value_str)?)
                }
                "search.allow-positive-charges" => {
                    self.search.get_or_insert_with(Default::default).allow_positive_charges =
                        Some(parse_value(key, value_str)?)
                }
                "search.max-positive-candidates" => {
                    self.search.get_or_insert_with(Default::default).max_positive_candidates =
                        Some(parse_value(key, value_str)?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

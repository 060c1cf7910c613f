use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Coulomb constant in N·m²/C².
pub const COULOMB_CONSTANT: f64 = 8.987_551_792_3e9;
/// Elementary charge in C.
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
/// Vacuum permittivity in F/m.
pub const VACUUM_PERMITTIVITY: f64 = 8.854_187_812_8e-12;
/// Numerical tolerance of the population stability criterion, in eV.
pub const POP_STABILITY_ERR: f64 = 1e-6;
/// Offset between the (−/0) and (0/+) charge transition levels, in eV.
pub const TRANSITION_LEVEL_GAP: f64 = 0.59;

/// Physical parameters of a dangling bond simulation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PhysicalParams {
    /// Relative permittivity of the substrate.
    pub epsilon_r: f64,
    /// Thomas-Fermi screening length in nm.
    pub lambda_tf: f64,
    /// Energy of the (−/0) transition level in eV.
    pub mu_minus: f64,
    /// Lattice constant along the dimer rows in Å.
    pub lat_a: f64,
    /// Lattice constant between dimer rows in Å.
    pub lat_b: f64,
    /// Intra-dimer spacing in Å.
    pub lat_c: f64,
}

impl Default for PhysicalParams {
    fn default() -> Self {
        Self {
            epsilon_r: 5.6,
            lambda_tf: 5.0,
            mu_minus: -0.32,
            lat_a: 3.84,
            lat_b: 7.68,
            lat_c: 2.25,
        }
    }
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

impl PhysicalParams {
    /// Energy of the (0/+) transition level in eV.
    #[inline]
    pub fn mu_plus(&self) -> f64 {
        self.mu_minus - TRANSITION_LEVEL_GAP
    }

    /// Electrostatic prefactor `1 / (4 π ε₀ ε_r)` in N·m²/C².
    #[inline]
    pub fn k(&self) -> f64 {
        COULOMB_CONSTANT / self.epsilon_r
    }

    /// Human-readable reasons why these parameters cannot be simulated.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(self.epsilon_r.is_finite() && self.epsilon_r > 0.0) {
            errors.push(format!("epsilon-r must be positive, got {}", self.epsilon_r));
        }
        if !(self.lambda_tf.is_finite() && self.lambda_tf > 0.0) {
            errors.push(format!("lambda-tf must be positive, got {}", self.lambda_tf));
        }
        if !self.mu_minus.is_finite() {
            errors.push(format!("mu-minus must be finite, got {}", self.mu_minus));
        }
        for (name, value) in [
            ("lat-a", self.lat_a),
            ("lat-b", self.lat_b),
            ("lat-c", self.lat_c),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(format!("{name} must be non-negative, got {value}"));
            }
        }
        errors
    }

    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn mu_plus_lies_below_mu_minus() {
        let params = PhysicalParams::default();
        assert!((params.mu_plus() - (-0.91)).abs() < 1e-12);
        assert!(params.mu_plus() < params.mu_minus);
    }

    #[test]
    fn default_params_are_valid() {
        assert!(PhysicalParams::default().validation_errors().is_empty());
    }

    #[test]
    fn validation_reports_every_bad_field() {
        let params = PhysicalParams {
            epsilon_r: 0.0,
            lambda_tf: -1.0,
            ..Default::default()
        };
        let errors = params.validation_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("epsilon-r"));
        assert!(errors[1].contains("lambda-tf"));
    }

    #[test]
    fn load_reads_partial_toml_over_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("physics.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            r#"
            epsilon-r = 4.1
            mu-minus = -0.28
            "#
        )
        .unwrap();

        let params = PhysicalParams::load(&path).unwrap();
        assert_eq!(params.epsilon_r, 4.1);
        assert_eq!(params.mu_minus, -0.28);
        assert_eq!(params.lambda_tf, 5.0);
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("physics.toml");
        std::fs::write(&path, "temperature = 4.0\n").unwrap();

        assert!(matches!(
            PhysicalParams::load(&path),
            Err(ParamLoadError::Toml { .. })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempdir().unwrap();
        let result = PhysicalParams::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ParamLoadError::Io { .. })));
    }
}

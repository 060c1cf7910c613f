use super::params::{POP_STABILITY_ERR, PhysicalParams};
use super::potentials::screened_coulomb;
use crate::core::models::charge::ChargeState;
use crate::core::models::configuration::ChargeConfiguration;
use crate::core::models::layout::SiteLayout;
use nalgebra::DMatrix;
use nalgebra::distance;

/// Charge state and electrostatics of a dangling bond layout.
///
/// The pairwise chargeless potentials are computed once on construction.
/// Assigning charges only marks the derived quantities stale; call
/// [`ChargeSurface::update_after_charge_change`] before reading local potentials, the
/// system energy or the validity flag.
#[derive(Debug, Clone)]
pub struct ChargeSurface {
    params: PhysicalParams,
    potentials: DMatrix<f64>,
    charges: Vec<ChargeState>,
    local_potentials: Vec<f64>,
    system_energy: f64,
    valid: bool,
}

impl ChargeSurface {
    /// Creates a surface with every site neutral.
    pub fn new(layout: &SiteLayout, params: PhysicalParams) -> Self {
        let positions = layout.nm_positions(&params);
        let n = positions.len();
        let potentials = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                0.0
            } else {
                screened_coulomb(distance(&positions[i], &positions[j]), &params)
            }
        });

        let mut surface = Self {
            params,
            potentials,
            charges: vec![ChargeState::Neutral; n],
            local_potentials: vec![0.0; n],
            system_energy: 0.0,
            valid: false,
        };
        surface.update_after_charge_change();
        surface
    }

    #[inline]
    pub fn params(&self) -> &PhysicalParams {
        &self.params
    }

    #[inline]
    pub fn num_sites(&self) -> usize {
        self.charges.len()
    }

    /// Potential in V at site `i` caused by a unit charge on site `j`; zero for `i == j`.
    #[inline]
    pub fn chargeless_potential(&self, i: usize, j: usize) -> f64 {
        self.potentials[(i, j)]
    }

    #[inline]
    pub fn charge_state(&self, i: usize) -> ChargeState {
        self.charges[i]
    }

    pub fn assign_charge_state(&mut self, i: usize, cs: ChargeState) {
        self.charges[i] = cs;
    }

    pub fn assign_configuration(&mut self, configuration: &ChargeConfiguration) {
        debug_assert_eq!(configuration.len(), self.num_sites());
        self.charges.clear();
        self.charges.extend_from_slice(configuration.charges());
    }

    pub fn configuration(&self) -> ChargeConfiguration {
        ChargeConfiguration::new(self.charges.clone())
    }

    /// Recomputes local potentials, the system energy and physical validity.
    pub fn update_after_charge_change(&mut self) {
        let n = self.num_sites();
        for i in 0..n {
            self.local_potentials[i] = (0..n)
                .map(|j| self.potentials[(i, j)] * f64::from(self.charges[j].sign()))
                .sum();
        }
        self.system_energy = 0.5
            * self
                .local_potentials
                .iter()
                .zip(&self.charges)
                .map(|(v, cs)| v * f64::from(cs.sign()))
                .sum::<f64>();
        self.valid = self.is_population_stable() && self.is_configuration_stable();
    }

    /// Local electrostatic potential at site `i` in V.
    #[inline]
    pub fn local_potential(&self, i: usize) -> f64 {
        self.local_potentials[i]
    }

    /// Electrostatic energy of the current configuration in eV.
    #[inline]
    pub fn system_energy(&self) -> f64 {
        self.system_energy
    }

    #[inline]
    pub fn is_physically_valid(&self) -> bool {
        self.valid
    }

    fn is_population_stable(&self) -> bool {
        let mu_minus = self.params.mu_minus;
        let mu_plus = self.params.mu_plus();
        self.charges
            .iter()
            .zip(&self.local_potentials)
            .all(|(cs, &v)| match cs {
                ChargeState::Negative => -v + mu_minus < POP_STABILITY_ERR,
                ChargeState::Positive => -v + mu_plus > -POP_STABILITY_ERR,
                ChargeState::Neutral => {
                    -v + mu_minus > -POP_STABILITY_ERR && -v + mu_plus < POP_STABILITY_ERR
                }
            })
    }

    /// No single-electron hop to a site of higher sign lowers the energy beyond tolerance.
    fn is_configuration_stable(&self) -> bool {
        let n = self.num_sites();
        for i in 0..n {
            let cs_i = self.charges[i];
            if cs_i == ChargeState::Positive {
                continue;
            }
            let dn_i = if cs_i == ChargeState::Negative { 1.0 } else { -1.0 };
            for j in 0..n {
                if self.charges[j] <= cs_i {
                    continue;
                }
                let dn_j = -dn_i;
                let hop_delta = self.local_potentials[i] * dn_i
                    + self.local_potentials[j] * dn_j
                    - self.potentials[(i, j)];
                if hop_delta < -POP_STABILITY_ERR {
                    return false;
                }
            }
        }
        true
    }

    /// Sum of the chargeless potentials all other sites exert on `i`.
    fn potential_sum(&self, i: usize) -> f64 {
        self.potentials.row(i).iter().sum()
    }

    /// Sites that are negative in every physically valid configuration.
    ///
    /// Even with every other site negatively charged, the local potential cannot lift the
    /// (−/0) level above the Fermi level.
    pub fn must_be_negative_sites(&self) -> Vec<usize> {
        (0..self.num_sites())
            .filter(|&i| self.potential_sum(i) + self.params.mu_minus < -POP_STABILITY_ERR)
            .collect()
    }

    /// Sites that could be positively charged in some configuration.
    pub fn positive_candidates(&self) -> Vec<usize> {
        (0..self.num_sites())
            .filter(|&i| self.potential_sum(i) + self.params.mu_plus() > -POP_STABILITY_ERR)
            .collect()
    }

    pub fn is_three_state_simulation_required(&self) -> bool {
        !self.positive_candidates().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::layout::SiteCoord;

    fn layout(sites: &[(i64, i64, u8)]) -> SiteLayout {
        SiteLayout::from_sites(sites.iter().map(|&(x, y, z)| SiteCoord::new(x, y, z))).unwrap()
    }

    fn surface(sites: &[(i64, i64, u8)]) -> ChargeSurface {
        ChargeSurface::new(&layout(sites), PhysicalParams::default())
    }

    #[test]
    fn potential_matrix_is_symmetric_with_zero_diagonal() {
        let s = surface(&[(0, 0, 0), (3, 0, 0), (5, 1, 1)]);
        for i in 0..3 {
            assert_eq!(s.chargeless_potential(i, i), 0.0);
            for j in 0..3 {
                assert_eq!(s.chargeless_potential(i, j), s.chargeless_potential(j, i));
            }
        }
        assert!(s.chargeless_potential(0, 1) > s.chargeless_potential(0, 2));
    }

    #[test]
    fn pair_potential_uses_the_lattice_distance_in_nm() {
        let params = PhysicalParams::default();
        let s = surface(&[(0, 0, 0), (3, 0, 0), (0, 1, 1)]);

        let along_row = 3.0 * params.lat_a / 10.0;
        assert!((s.chargeless_potential(0, 1) - screened_coulomb(along_row, &params)).abs() < 1e-12);

        let across_rows = (params.lat_b + params.lat_c) / 10.0;
        assert!(
            (s.chargeless_potential(0, 2) - screened_coulomb(across_rows, &params)).abs() < 1e-12
        );
    }

    #[test]
    fn isolated_site_is_negative_and_valid() {
        let mut s = surface(&[(0, 0, 0)]);
        assert_eq!(s.must_be_negative_sites(), vec![0]);
        assert!(s.positive_candidates().is_empty());

        s.assign_charge_state(0, ChargeState::Negative);
        s.update_after_charge_change();
        assert!(s.is_physically_valid());
        assert_eq!(s.system_energy(), 0.0);

        s.assign_charge_state(0, ChargeState::Neutral);
        s.update_after_charge_change();
        assert!(!s.is_physically_valid());
    }

    #[test]
    fn distant_pair_is_doubly_negative() {
        let mut s = surface(&[(0, 0, 0), (40, 0, 0)]);
        assert_eq!(s.must_be_negative_sites(), vec![0, 1]);
        s.assign_configuration(&ChargeConfiguration::parse("--").unwrap());
        s.update_after_charge_change();
        assert!(s.is_physically_valid());
        assert!(s.system_energy() > 0.0);
    }

    #[test]
    fn neighbouring_pair_shares_a_single_electron() {
        let mut s = surface(&[(0, 0, 0), (1, 0, 0)]);
        assert!(s.must_be_negative_sites().is_empty());
        assert!(!s.is_three_state_simulation_required());

        s.assign_configuration(&ChargeConfiguration::parse("--").unwrap());
        s.update_after_charge_change();
        assert!(!s.is_physically_valid());

        s.assign_configuration(&ChargeConfiguration::parse("-0").unwrap());
        s.update_after_charge_change();
        assert!(s.is_physically_valid());
        assert_eq!(s.system_energy(), 0.0);

        s.assign_configuration(&ChargeConfiguration::parse("0-").unwrap());
        s.update_after_charge_change();
        assert!(s.is_physically_valid());
    }

    #[test]
    fn dimer_pair_polarises_into_opposite_charges() {
        let mut s = surface(&[(0, 0, 0), (0, 0, 1)]);
        assert_eq!(s.positive_candidates(), vec![0, 1]);

        s.assign_configuration(&ChargeConfiguration::parse("-0").unwrap());
        s.update_after_charge_change();
        assert!(!s.is_physically_valid());

        s.assign_configuration(&ChargeConfiguration::parse("-+").unwrap());
        s.update_after_charge_change();
        assert!(s.is_physically_valid());
        assert!(s.system_energy() < 0.0);
    }

    #[test]
    fn local_potential_and_energy_follow_charges() {
        let mut s = surface(&[(0, 0, 0), (5, 0, 0)]);
        s.assign_configuration(&ChargeConfiguration::parse("--").unwrap());
        s.update_after_charge_change();
        let v = s.chargeless_potential(0, 1);
        assert!((s.local_potential(0) + v).abs() < 1e-12);
        assert!((s.system_energy() - v).abs() < 1e-12);
    }

    #[test]
    fn dense_cluster_has_positive_candidates() {
        let s = surface(&[
            (0, 0, 0),
            (1, 0, 0),
            (0, 0, 1),
            (1, 0, 1),
            (2, 0, 0),
            (2, 0, 1),
            (0, 1, 0),
            (1, 1, 0),
        ]);
        assert!(s.is_three_state_simulation_required());
        let negatives = s.must_be_negative_sites();
        for c in s.positive_candidates() {
            assert!(!negatives.contains(&c));
        }
    }
}

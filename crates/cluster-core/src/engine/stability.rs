use super::bounds::PotentialBounds;
use crate::core::models::charge::{ChargeMultiset, ChargeState};
use crate::core::models::cluster::Cluster;
use crate::core::physics::params::{POP_STABILITY_ERR, PhysicalParams};

/// Rejects clusterings whose multisets cannot be population stable under any arrangement.
pub struct StabilityChecker<'a> {
    bounds: PotentialBounds<'a>,
    /// `[ERR - mu_minus, -ERR - mu_minus, ERR - mu_plus, -ERR - mu_plus]`
    thresholds: [f64; 4],
}

impl<'a> StabilityChecker<'a> {
    pub fn new(bounds: PotentialBounds<'a>, params: &PhysicalParams) -> Self {
        let mu_minus = params.mu_minus;
        let mu_plus = params.mu_plus();
        Self {
            bounds,
            thresholds: [
                POP_STABILITY_ERR - mu_minus,
                -POP_STABILITY_ERR - mu_minus,
                POP_STABILITY_ERR - mu_plus,
                -POP_STABILITY_ERR - mu_plus,
            ],
        }
    }

    /// Checks every cluster of `clustering` against the multiset `sigma` assigns it.
    ///
    /// A cluster holding a negative charge fails when even the weakest possible
    /// potential at its receivers leaves that electron above the (−/0) level, and
    /// symmetrically for positive and neutral charges. Returns at the first failure.
    pub fn is_population_stable(&self, clustering: &[&Cluster], sigma: &[ChargeMultiset]) -> bool {
        debug_assert_eq!(clustering.len(), sigma.len());
        let [t0, t1, t2, t3] = self.thresholds;

        for (index, (&c, &sigma_c)) in clustering.iter().zip(sigma).enumerate() {
            if let Some(m) = sigma_c.with_one_converted(ChargeState::Negative, ChargeState::Neutral)
            {
                let v = -self.bounds.v_int_upper(c, m)
                    - self.bounds.v_ext_upper(index, clustering, sigma);
                if v >= t0 {
                    return false;
                }
            }

            if let Some(m) = sigma_c.with_one_converted(ChargeState::Positive, ChargeState::Neutral)
            {
                let v = -self.bounds.v_int_lower(c, m)
                    - self.bounds.v_ext_lower(index, clustering, sigma);
                if v <= t3 {
                    return false;
                }
            }

            if sigma_c.contains(ChargeState::Neutral) {
                let lower = -self.bounds.v_int_lower(c, sigma_c)
                    - self.bounds.v_ext_lower(index, clustering, sigma);
                if lower <= t1 {
                    return false;
                }
                let upper = -self.bounds.v_int_upper(c, sigma_c)
                    - self.bounds.v_ext_upper(index, clustering, sigma);
                if upper >= t2 {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::layout::{SiteCoord, SiteLayout};
    use crate::core::physics::surface::ChargeSurface;
    use crate::engine::cache::{AssignmentCache, BoundCache};

    fn check(sites: &[(i64, i64, u8)], clustering: &[&Cluster], sigma: &[ChargeMultiset]) -> bool {
        let layout =
            SiteLayout::from_sites(sites.iter().map(|&(x, y, z)| SiteCoord::new(x, y, z))).unwrap();
        let params = PhysicalParams::default();
        let surface = ChargeSurface::new(&layout, params);
        let assignments = AssignmentCache::new();
        let cache = BoundCache::new();
        let bounds = PotentialBounds::new(&surface, &assignments, &cache, 4);
        StabilityChecker::new(bounds, &params).is_population_stable(clustering, sigma)
    }

    #[test]
    fn isolated_site_must_not_be_neutral() {
        let c = Cluster::singleton(0);
        assert!(check(&[(0, 0, 0)], &[&c], &[ChargeMultiset::new(1, 0, 0)]));
        assert!(!check(&[(0, 0, 0)], &[&c], &[ChargeMultiset::new(0, 1, 0)]));
        assert!(!check(&[(0, 0, 0)], &[&c], &[ChargeMultiset::new(0, 0, 1)]));
    }

    #[test]
    fn neighbouring_pair_rejects_two_electrons() {
        let sites = [(0, 0, 0), (1, 0, 0)];
        let a = Cluster::singleton(0);
        let b = Cluster::singleton(1);
        let neg = ChargeMultiset::new(1, 0, 0);
        let neu = ChargeMultiset::new(0, 1, 0);
        assert!(!check(&sites, &[&a, &b], &[neg, neg]));
        assert!(check(&sites, &[&a, &b], &[neg, neu]));
        assert!(check(&sites, &[&a, &b], &[neu, neg]));
        assert!(!check(&sites, &[&a, &b], &[neu, neu]));
    }

    #[test]
    fn joint_cluster_bounds_are_conservative() {
        let sites = [(0, 0, 0), (1, 0, 0)];
        let c = Cluster::new([0, 1]);
        assert!(check(&sites, &[&c], &[ChargeMultiset::new(1, 1, 0)]));
        // The receiver range includes the charged site itself, so the pair is not refuted
        // until it is split into singletons.
        assert!(check(&sites, &[&c], &[ChargeMultiset::new(2, 0, 0)]));
        assert!(!check(&sites, &[&c], &[ChargeMultiset::new(0, 2, 0)]));
    }

    #[test]
    fn fully_pre_assigned_clusters_are_not_checked() {
        let fixity = vec![Some(ChargeState::Neutral)];
        let c = Cluster::singleton(0).with_fixed_charges(&fixity);
        assert!(check(&[(0, 0, 0)], &[&c], &[ChargeMultiset::empty()]));
    }
}

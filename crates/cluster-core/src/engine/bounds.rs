use super::cache::{AssignmentCache, BoundCache, BoundKey, BoundKind};
use crate::core::models::charge::ChargeMultiset;
use crate::core::models::cluster::Cluster;
use crate::core::physics::surface::ChargeSurface;
use std::sync::Arc;

/// Bounds on the local potential a cluster's charges can induce on the sites of another.
///
/// For a receiving cluster `c1` and a source cluster `c2` whose free sites hold the
/// charges of a multiset, the lower (upper) bound is the smallest (largest) potential any
/// free receiver in `c1` experiences from `c2`, taken over every way of arranging the
/// multiset on `c2`'s free sites. Pre-assigned sources contribute their fixed charge.
#[derive(Clone, Copy)]
pub struct PotentialBounds<'a> {
    surface: &'a ChargeSurface,
    assignments: &'a AssignmentCache,
    cache: &'a BoundCache,
    min_cache_size: usize,
}

impl<'a> PotentialBounds<'a> {
    pub fn new(
        surface: &'a ChargeSurface,
        assignments: &'a AssignmentCache,
        cache: &'a BoundCache,
        min_cache_size: usize,
    ) -> Self {
        Self {
            surface,
            assignments,
            cache,
            min_cache_size,
        }
    }

    /// Potential bound of `c2`, charged according to `multiset`, on the free sites of `c1`.
    ///
    /// Pairs whose combined size reaches the cache threshold are memoised.
    pub fn bound(
        &self,
        c1: &Cluster,
        c2: &Cluster,
        multiset: ChargeMultiset,
        kind: BoundKind,
    ) -> f64 {
        if c1.size() + c2.size() < self.min_cache_size {
            return self.compute(c1, c2, multiset, kind);
        }

        let key = BoundKey {
            receivers: Arc::clone(c1.key()),
            sources: Arc::clone(c2.key()),
            free_sources: c2.free_size(),
            multiset,
            kind,
        };
        if let Some(value) = self.cache.get(&key) {
            return value;
        }
        let value = self.compute(c1, c2, multiset, kind);
        self.cache.insert(key, value);
        value
    }

    fn compute(&self, c1: &Cluster, c2: &Cluster, multiset: ChargeMultiset, kind: BoundKind) -> f64 {
        let assignments = self.assignments.get(c2.free_size(), multiset);
        let free_sources: Vec<usize> = c2.free_members().collect();

        let mut extreme = match kind {
            BoundKind::Lower => f64::INFINITY,
            BoundKind::Upper => f64::NEG_INFINITY,
        };
        for i in c1.free_members() {
            let fixed: f64 = c2
                .fixed_members()
                .filter(|&(j, _)| j != i)
                .map(|(j, cs)| self.surface.chargeless_potential(i, j) * f64::from(cs.sign()))
                .sum();

            for assignment in assignments.iter() {
                let potential = fixed
                    + free_sources
                        .iter()
                        .zip(assignment)
                        .filter(|&(&j, _)| j != i)
                        .map(|(&j, cs)| {
                            self.surface.chargeless_potential(i, j) * f64::from(cs.sign())
                        })
                        .sum::<f64>();
                extreme = match kind {
                    BoundKind::Lower => extreme.min(potential),
                    BoundKind::Upper => extreme.max(potential),
                };
            }
        }
        extreme
    }

    /// Lower bound of the potential a cluster induces on itself; zero for singletons.
    pub fn v_int_lower(&self, c: &Cluster, multiset: ChargeMultiset) -> f64 {
        if c.is_singleton() {
            return 0.0;
        }
        self.bound(c, c, multiset, BoundKind::Lower)
    }

    /// Upper bound of the potential a cluster induces on itself; zero for singletons.
    pub fn v_int_upper(&self, c: &Cluster, multiset: ChargeMultiset) -> f64 {
        if c.is_singleton() {
            return 0.0;
        }
        self.bound(c, c, multiset, BoundKind::Upper)
    }

    /// Lower bound of the potential every other cluster of `clustering` induces on entry `index`.
    pub fn v_ext_lower(
        &self,
        index: usize,
        clustering: &[&Cluster],
        sigma: &[ChargeMultiset],
    ) -> f64 {
        self.v_ext(index, clustering, sigma, BoundKind::Lower)
    }

    pub fn v_ext_upper(
        &self,
        index: usize,
        clustering: &[&Cluster],
        sigma: &[ChargeMultiset],
    ) -> f64 {
        self.v_ext(index, clustering, sigma, BoundKind::Upper)
    }

    fn v_ext(
        &self,
        index: usize,
        clustering: &[&Cluster],
        sigma: &[ChargeMultiset],
        kind: BoundKind,
    ) -> f64 {
        let c = clustering[index];
        clustering
            .iter()
            .zip(sigma)
            .enumerate()
            .filter(|&(k, _)| k != index)
            .map(|(_, (other, &m))| self.bound(c, other, m, kind))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::charge::ChargeState;
    use crate::core::models::layout::{SiteCoord, SiteLayout};
    use crate::core::physics::params::PhysicalParams;

    const TOLERANCE: f64 = 1e-12;

    fn surface() -> ChargeSurface {
        let layout = SiteLayout::from_sites([
            SiteCoord::new(0, 0, 0),
            SiteCoord::new(2, 0, 0),
            SiteCoord::new(5, 0, 0),
            SiteCoord::new(5, 1, 0),
        ])
        .unwrap();
        ChargeSurface::new(&layout, PhysicalParams::default())
    }

    fn with_bounds<T>(min_cache_size: usize, f: impl FnOnce(&PotentialBounds, &BoundCache) -> T) -> T {
        let s = surface();
        let assignments = AssignmentCache::new();
        let cache = BoundCache::new();
        let bounds = PotentialBounds::new(&s, &assignments, &cache, min_cache_size);
        f(&bounds, &cache)
    }

    #[test]
    fn singleton_internal_bounds_are_zero() {
        with_bounds(4, |b, _| {
            let c = Cluster::singleton(2);
            assert_eq!(b.v_int_lower(&c, ChargeMultiset::new(1, 0, 0)), 0.0);
            assert_eq!(b.v_int_upper(&c, ChargeMultiset::new(1, 0, 0)), 0.0);
        });
    }

    #[test]
    fn external_bound_of_a_single_negative_source_is_exact() {
        let s = surface();
        with_bounds(4, |b, _| {
            let receiver = Cluster::singleton(0);
            let source = Cluster::singleton(1);
            let m = ChargeMultiset::new(1, 0, 0);
            let expected = -s.chargeless_potential(0, 1);
            assert!((b.bound(&receiver, &source, m, BoundKind::Lower) - expected).abs() < TOLERANCE);
            assert!((b.bound(&receiver, &source, m, BoundKind::Upper) - expected).abs() < TOLERANCE);
        });
    }

    #[test]
    fn internal_bounds_enclose_every_arrangement() {
        let s = surface();
        with_bounds(4, |b, _| {
            let c = Cluster::new([0, 1, 2]);
            let m = ChargeMultiset::new(1, 2, 0);
            let lower = b.v_int_lower(&c, m);
            let upper = b.v_int_upper(&c, m);
            assert!(lower <= upper);

            // The negative charge sits on one site and acts on the other two.
            let mut potentials = Vec::new();
            for neg in 0..3 {
                for i in 0..3 {
                    potentials.push(if i == neg {
                        0.0
                    } else {
                        -s.chargeless_potential(i, neg)
                    });
                }
            }
            let min = potentials.iter().copied().fold(f64::INFINITY, f64::min);
            let max = potentials.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert!((lower - min).abs() < TOLERANCE);
            assert!((upper - max).abs() < TOLERANCE);
        });
    }

    #[test]
    fn fixed_sources_contribute_their_charge() {
        let s = surface();
        with_bounds(4, |b, _| {
            let fixity = vec![None, Some(ChargeState::Positive), None, None];
            let receiver = Cluster::singleton(0).with_fixed_charges(&fixity);
            let source = Cluster::new([1, 2]).with_fixed_charges(&fixity);
            let m = ChargeMultiset::new(1, 0, 0);
            let expected = s.chargeless_potential(0, 1) - s.chargeless_potential(0, 2);
            assert!((b.bound(&receiver, &source, m, BoundKind::Lower) - expected).abs() < TOLERANCE);
        });
    }

    #[test]
    fn only_large_pairs_are_cached() {
        with_bounds(4, |b, cache| {
            let small = Cluster::new([0, 1]);
            let other = Cluster::singleton(2);
            b.bound(&small, &other, ChargeMultiset::new(1, 0, 0), BoundKind::Lower);
            assert!(cache.is_empty());

            let big = Cluster::new([0, 1, 2]);
            b.bound(&big, &Cluster::singleton(3), ChargeMultiset::new(0, 1, 0), BoundKind::Upper);
            assert_eq!(cache.len(), 1);
        });
    }

    #[test]
    fn external_bounds_sum_over_other_clusters() {
        let s = surface();
        with_bounds(4, |b, _| {
            let a = Cluster::singleton(0);
            let c = Cluster::singleton(1);
            let d = Cluster::new([2, 3]);
            let clustering = [&a, &c, &d];
            let sigma = [
                ChargeMultiset::new(1, 0, 0),
                ChargeMultiset::new(1, 0, 0),
                ChargeMultiset::new(2, 0, 0),
            ];
            let expected = -s.chargeless_potential(0, 1)
                - s.chargeless_potential(0, 2)
                - s.chargeless_potential(0, 3);
            assert!((b.v_ext_lower(0, &clustering, &sigma) - expected).abs() < TOLERANCE);
            assert!((b.v_ext_upper(0, &clustering, &sigma) - expected).abs() < TOLERANCE);
        });
    }
}

use super::charge::ChargeState;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A group of sites whose potential contribution is bounded jointly.
///
/// Identity (equality, ordering and hashing) is given by the member set alone, so a
/// cluster can serve directly as a cache key. Members may carry a fixed charge state;
/// such sites are pre-assigned and take no part in the multiset distribution.
#[derive(Debug, Clone)]
pub struct Cluster {
    members: Arc<[usize]>,
    fixed: Arc<[Option<ChargeState>]>,
}

impl Cluster {
    /// Creates a cluster with no pre-assigned members.
    ///
    /// Member indices are sorted and deduplicated.
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut sorted: Vec<usize> = members.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();
        let fixed = vec![None; sorted.len()];
        Self {
            members: sorted.into(),
            fixed: fixed.into(),
        }
    }

    pub fn singleton(site: usize) -> Self {
        Self::new([site])
    }

    /// Returns a copy whose pre-assignment flags are read from a layout-wide fixity map.
    pub fn with_fixed_charges(&self, fixity: &[Option<ChargeState>]) -> Self {
        let fixed: Vec<Option<ChargeState>> = self
            .members
            .iter()
            .map(|&site| fixity.get(site).copied().flatten())
            .collect();
        Self {
            members: Arc::clone(&self.members),
            fixed: fixed.into(),
        }
    }

    #[inline]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Shared handle on the member set, cheap to clone into cache keys.
    #[inline]
    pub fn key(&self) -> &Arc<[usize]> {
        &self.members
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    pub fn free_size(&self) -> usize {
        self.fixed.iter().filter(|f| f.is_none()).count()
    }

    pub fn is_fully_assigned(&self) -> bool {
        self.fixed.iter().all(Option::is_some)
    }

    pub fn contains(&self, site: usize) -> bool {
        self.members.binary_search(&site).is_ok()
    }

    /// Free members in ascending order.
    pub fn free_members(&self) -> impl Iterator<Item = usize> + '_ {
        self.members
            .iter()
            .zip(self.fixed.iter())
            .filter(|(_, f)| f.is_none())
            .map(|(&site, _)| site)
    }

    /// Pre-assigned members with their charge, in ascending order.
    pub fn fixed_members(&self) -> impl Iterator<Item = (usize, ChargeState)> + '_ {
        self.members
            .iter()
            .zip(self.fixed.iter())
            .filter_map(|(&site, f)| f.map(|cs| (site, cs)))
    }

    pub fn fixed_charge(&self, site: usize) -> Option<ChargeState> {
        self.members
            .binary_search(&site)
            .ok()
            .and_then(|pos| self.fixed[pos])
    }
}

impl PartialEq for Cluster {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for Cluster {}

impl PartialOrd for Cluster {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cluster {
    fn cmp(&self, other: &Self) -> Ordering {
        self.members.cmp(&other.members)
    }
}

impl Hash for Cluster {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.members.hash(state);
    }
}

/// Free-site count of one cluster within a clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterSize {
    pub free: usize,
    pub fully_assigned: bool,
}

/// Free-site counts of every cluster, in the iteration order of `clustering`.
///
/// Fully pre-assigned clusters are flagged; they receive no share of a multiset but
/// still contribute their fixed charges to the final configuration.
pub fn cluster_sizes(clustering: &[&Cluster]) -> Vec<ClusterSize> {
    clustering
        .iter()
        .map(|c| {
            let free = c.free_size();
            ClusterSize {
                free,
                fully_assigned: free == 0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn new_sorts_and_deduplicates_members() {
        let c = Cluster::new([4, 1, 3, 1]);
        assert_eq!(c.members(), &[1, 3, 4]);
        assert_eq!(c.size(), 3);
        assert_eq!(c.free_size(), 3);
        assert!(c.contains(3));
        assert!(!c.contains(2));
    }

    #[test]
    fn identity_ignores_pre_assignment_flags() {
        let plain = Cluster::new([0, 1, 2]);
        let fixity = vec![Some(ChargeState::Negative), None, None];
        let fixed = plain.with_fixed_charges(&fixity);

        assert_eq!(plain, fixed);
        let set: HashSet<Cluster> = [plain.clone(), fixed.clone()].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(fixed.free_size(), 2);
        assert_eq!(fixed.fixed_charge(0), Some(ChargeState::Negative));
        assert_eq!(fixed.fixed_charge(1), None);
        assert_eq!(fixed.free_members().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn clusters_are_ordered_by_member_set() {
        let a = Cluster::new([0, 1]);
        let b = Cluster::new([0, 2]);
        let c = Cluster::new([1]);
        let mut v = vec![c.clone(), b.clone(), a.clone()];
        v.sort();
        assert_eq!(v, vec![a, b, c]);
    }

    #[test]
    fn cluster_sizes_flags_fully_assigned_clusters() {
        let fixity = vec![
            Some(ChargeState::Negative),
            Some(ChargeState::Negative),
            None,
            None,
        ];
        let full = Cluster::new([0, 1]).with_fixed_charges(&fixity);
        let partial = Cluster::new([2, 3]).with_fixed_charges(&fixity);

        let sizes = cluster_sizes(&[&full, &partial]);
        assert_eq!(
            sizes,
            vec![
                ClusterSize {
                    free: 0,
                    fully_assigned: true
                },
                ClusterSize {
                    free: 2,
                    fully_assigned: false
                },
            ]
        );
        assert!(full.is_fully_assigned());
    }
}

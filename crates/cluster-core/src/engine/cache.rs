use crate::core::models::charge::{ChargeMultiset, ChargeState};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// One charge state per free site of a cluster, in ascending site order.
pub type Assignment = Vec<ChargeState>;

/// Every distinct ordering of a multiset, in lexicographic `NEG < NEU < POS` order.
pub fn multiset_permutations(multiset: &ChargeMultiset) -> Vec<Assignment> {
    let mut current: Assignment = multiset.iter().collect();
    let mut out = vec![current.clone()];
    while next_permutation(&mut current) {
        out.push(current.clone());
    }
    out
}

fn next_permutation(v: &mut [ChargeState]) -> bool {
    let Some(pivot) = v.windows(2).rposition(|w| w[0] < w[1]) else {
        return false;
    };
    let Some(swap) = v.iter().rposition(|&x| x > v[pivot]) else {
        return false;
    };
    v.swap(pivot, swap);
    v[pivot + 1..].reverse();
    true
}

/// Charge assignments per `(free-site count, multiset)`, generated on first request.
///
/// Shared by every worker for the whole search.
#[derive(Debug, Default)]
pub struct AssignmentCache {
    data: RwLock<HashMap<(usize, ChargeMultiset), Arc<Vec<Assignment>>>>,
}

impl AssignmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, free_sites: usize, multiset: ChargeMultiset) -> Arc<Vec<Assignment>> {
        debug_assert_eq!(free_sites as u64, multiset.total());
        let key = (free_sites, multiset);
        if let Some(found) = self.data.read().get(&key) {
            return Arc::clone(found);
        }
        let generated = Arc::new(multiset_permutations(&multiset));
        Arc::clone(self.data.write().entry(key).or_insert(generated))
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundKind {
    Lower,
    Upper,
}

/// Identifies a memoised potential bound of `sources` projected onto `receivers`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundKey {
    pub receivers: Arc<[usize]>,
    pub sources: Arc<[usize]>,
    pub free_sources: usize,
    pub multiset: ChargeMultiset,
    pub kind: BoundKind,
}

/// Memoised cluster potential bounds.
///
/// Valid only for a single pre-assignment of the layout; a new cache is created for
/// every search pass.
#[derive(Debug, Default)]
pub struct BoundCache {
    data: RwLock<HashMap<BoundKey, f64>>,
}

impl BoundCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &BoundKey) -> Option<f64> {
        self.data.read().get(key).copied()
    }

    pub fn insert(&self, key: BoundKey, value: f64) {
        let mut data = self.data.write();
        let stored = *data.entry(key).or_insert(value);
        debug_assert!(
            stored == value || (stored.is_nan() && value.is_nan()),
            "bound cache disagrees with recomputed value: {stored} vs {value}"
        );
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ChargeState::{Negative as N, Neutral as Z, Positive as P};

    #[test]
    fn permutations_are_distinct_and_lexicographic() {
        let perms = multiset_permutations(&ChargeMultiset::new(1, 1, 1));
        assert_eq!(
            perms,
            vec![
                vec![N, Z, P],
                vec![N, P, Z],
                vec![Z, N, P],
                vec![Z, P, N],
                vec![P, N, Z],
                vec![P, Z, N],
            ]
        );
    }

    #[test]
    fn permutations_of_repeated_states_are_deduplicated() {
        let perms = multiset_permutations(&ChargeMultiset::new(2, 2, 0));
        assert_eq!(perms.len(), 6);
        assert_eq!(perms.first().unwrap(), &vec![N, N, Z, Z]);
        assert_eq!(perms.last().unwrap(), &vec![Z, Z, N, N]);
    }

    #[test]
    fn empty_multiset_has_one_empty_assignment() {
        assert_eq!(
            multiset_permutations(&ChargeMultiset::empty()),
            vec![Vec::<ChargeState>::new()]
        );
    }

    #[test]
    fn assignment_cache_shares_generated_vectors() {
        let cache = AssignmentCache::new();
        let a = cache.get(3, ChargeMultiset::new(1, 2, 0));
        let b = cache.get(3, ChargeMultiset::new(1, 2, 0));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn bound_cache_distinguishes_bound_kinds() {
        let cache = BoundCache::new();
        let members: Arc<[usize]> = Arc::from(vec![0, 1]);
        let key = |kind| BoundKey {
            receivers: Arc::clone(&members),
            sources: Arc::clone(&members),
            free_sources: 2,
            multiset: ChargeMultiset::new(1, 1, 0),
            kind,
        };
        cache.insert(key(BoundKind::Lower), -0.5);
        cache.insert(key(BoundKind::Upper), 0.0);

        assert_eq!(cache.get(&key(BoundKind::Lower)), Some(-0.5));
        assert_eq!(cache.get(&key(BoundKind::Upper)), Some(0.0));
        assert_eq!(cache.len(), 2);
    }
}

use crate::core::models::charge::ChargeMultiset;
use crate::core::models::cluster::{Cluster, cluster_sizes};
use std::hash::{DefaultHasher, Hash, Hasher};

const NEG: usize = 0;
const NEU: usize = 1;
const POS: usize = 2;

/// One bin of the partition: a sorted run of charge states with a cursor.
#[derive(Debug, Clone)]
struct Bin {
    slots: Vec<usize>,
    counts: [u64; 3],
    lock: usize,
}

impl Bin {
    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Enumerates every way to split a charge multiset over bins of fixed capacity.
///
/// Each bin holds a sorted sequence of charge states. Distributions are produced in
/// lexicographic order over the per-bin sequences, starting from the one where every bin
/// is filled with as many negative charges as remain, and ending at the one where every
/// bin prefers positive charges. Every distribution of per-bin counts appears exactly once.
///
/// Bins of capacity zero take part in no step and always receive the empty multiset.
#[derive(Debug, Clone)]
pub struct MultisetPartition {
    bins: Vec<Bin>,
    /// Bin index per requested capacity; `None` for zero-capacity entries.
    bin_of: Vec<Option<usize>>,
    target: [u64; 3],
    locked: [u64; 3],
    unlocked: [u64; 3],
    row: usize,
    end_counts: Vec<[u64; 3]>,
    end_hash: u64,
}

impl MultisetPartition {
    /// Starts the enumeration at the first distribution.
    ///
    /// # Panics
    ///
    /// Panics if the capacities do not sum to the multiset's total.
    pub fn new(capacities: &[usize], target: ChargeMultiset) -> Self {
        let capacity_sum: u64 = capacities.iter().map(|&c| c as u64).sum();
        assert_eq!(
            capacity_sum,
            target.total(),
            "bin capacities must sum to the multiset total"
        );

        let mut bin_of = Vec::with_capacity(capacities.len());
        let mut bins = Vec::new();
        for &cap in capacities {
            if cap == 0 {
                bin_of.push(None);
                continue;
            }
            bin_of.push(Some(bins.len()));
            bins.push(Bin {
                slots: vec![NEG; cap],
                counts: [0; 3],
                lock: cap - 1,
            });
        }

        let target = target.counts();
        let mut locked = [0u64; 3];
        for bin in &mut bins {
            let mut filled = 0;
            for cs in [NEG, NEU, POS] {
                let n = (target[cs] - locked[cs]).min((bin.capacity() - filled) as u64) as usize;
                bin.slots[filled..filled + n].fill(cs);
                bin.counts[cs] = n as u64;
                locked[cs] += n as u64;
                filled += n;
            }
        }

        let mut remaining = target;
        let end_counts: Vec<[u64; 3]> = bins
            .iter()
            .map(|bin| {
                let mut counts = [0u64; 3];
                let mut filled = 0u64;
                for cs in [POS, NEU, NEG] {
                    let n = remaining[cs].min(bin.capacity() as u64 - filled);
                    remaining[cs] -= n;
                    counts[cs] = n;
                    filled += n;
                }
                counts
            })
            .collect();
        let end_hash = hash_counts(end_counts.iter());

        let row = bins.len().saturating_sub(1);
        Self {
            bins,
            bin_of,
            target,
            locked,
            unlocked: [0; 3],
            row,
            end_counts,
            end_hash,
        }
    }

    /// Partition over the free sites of `clusters`, one entry per cluster.
    ///
    /// Fully assigned clusters become zero-capacity entries.
    pub fn for_clusters(clusters: &[&Cluster], target: ChargeMultiset) -> Self {
        let capacities: Vec<usize> = cluster_sizes(clusters)
            .into_iter()
            .map(|size| if size.fully_assigned { 0 } else { size.free })
            .collect();
        Self::new(&capacities, target)
    }

    /// Whether the current distribution is the last one.
    pub fn is_end(&self) -> bool {
        hash_counts(self.bins.iter().map(|b| &b.counts)) == self.end_hash
            && self
                .bins
                .iter()
                .zip(&self.end_counts)
                .all(|(b, end)| b.counts == *end)
    }

    /// Moves to the next distribution; returns `false` once the last one has been passed.
    pub fn advance(&mut self) -> bool {
        if self.is_end() {
            return false;
        }
        while !self.make_step() {
            let bin = &mut self.bins[self.row];
            if bin.lock != 0 {
                bin.lock -= 1;
                continue;
            }
            for cs in [NEG, NEU, POS] {
                self.locked[cs] -= bin.counts[cs];
            }
            bin.lock = bin.capacity() - 1;
            if self.row == 0 {
                return false;
            }
            self.row -= 1;
        }
        true
    }

    /// Multiset assigned to entry `i` of the capacities in the current distribution.
    pub fn bin_counts(&self, i: usize) -> ChargeMultiset {
        match self.bin_of[i] {
            Some(b) => ChargeMultiset::from_counts(self.bins[b].counts),
            None => ChargeMultiset::empty(),
        }
    }

    /// The current distribution, one multiset per requested capacity.
    pub fn materialize(&self) -> Vec<ChargeMultiset> {
        (0..self.bin_of.len()).map(|i| self.bin_counts(i)).collect()
    }

    /// Consumes the partition into an iterator over all remaining distributions,
    /// starting with the current one.
    pub fn distributions(self) -> Distributions {
        Distributions {
            partition: self,
            done: false,
        }
    }

    /// Raises the state under the cursor of the current row and refills everything after it.
    fn make_step(&mut self) -> bool {
        let row = self.row;
        let lock = self.bins[row].lock;
        let moving = self.bins[row].slots[lock];
        let Some(next) = (moving + 1..3).find(|&cs| self.locked[cs] != self.target[cs]) else {
            return false;
        };

        let bin = &mut self.bins[row];
        bin.slots[lock] = next;
        bin.counts[next] += 1;
        bin.counts[moving] -= 1;
        self.locked[next] += 1;
        self.locked[moving] -= 1;

        if next != POS {
            let filled = (bin.counts[NEG] + bin.counts[NEU]) as usize;
            self.locked[POS] -= bin.counts[POS];
            bin.counts[POS] = 0;
            self.fill_column_from(row, NEU, filled);
        }
        self.fill_rows_from(row + 1);

        for cs in [NEG, NEU, POS] {
            self.locked[cs] += self.unlocked[cs];
        }
        self.unlocked = [0; 3];

        for bin in &mut self.bins[row..] {
            bin.lock = bin.capacity() - 1;
        }
        self.row = self.bins.len() - 1;
        true
    }

    fn fill_column_from(&mut self, i: usize, first: usize, mut filled: usize) {
        let bin = &mut self.bins[i];
        for cs in first..3 {
            while self.locked[cs] + self.unlocked[cs] < self.target[cs] && filled < bin.capacity()
            {
                bin.slots[filled] = cs;
                filled += 1;
                bin.counts[cs] += 1;
                self.unlocked[cs] += 1;
            }
        }
    }

    fn fill_rows_from(&mut self, i: usize) {
        for r in i..self.bins.len() {
            self.bins[r].counts = [0; 3];
            self.fill_column_from(r, NEG, 0);
        }
    }
}

/// Every two-state multiset of `free_sites` elements, from all negative to all neutral.
///
/// Enumerated as the first bin of a partition of `free_sites` negative and `free_sites`
/// neutral charges over two bins of `free_sites` slots each; the second bin absorbs the
/// charges the first does not take.
pub fn two_state_multisets(free_sites: usize) -> Vec<ChargeMultiset> {
    let f = free_sites as u64;
    MultisetPartition::new(&[free_sites, free_sites], ChargeMultiset::new(f, f, 0))
        .distributions()
        .map(|d| d[0])
        .collect()
}

fn hash_counts<'a>(counts: impl Iterator<Item = &'a [u64; 3]>) -> u64 {
    let mut hasher = DefaultHasher::new();
    for c in counts {
        c.hash(&mut hasher);
    }
    hasher.finish()
}

/// Iterator over the distributions of a [`MultisetPartition`].
#[derive(Debug, Clone)]
pub struct Distributions {
    partition: MultisetPartition,
    done: bool,
}

impl Iterator for Distributions {
    type Item = Vec<ChargeMultiset>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.partition.materialize();
        self.done = !self.partition.advance();
        Some(current)
    }
}

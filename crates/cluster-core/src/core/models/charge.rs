use std::fmt;

/// The charge state of a single dangling bond site.
///
/// States are totally ordered by their sign, so `Negative < Neutral < Positive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChargeState {
    Negative,
    Neutral,
    Positive,
}

impl ChargeState {
    /// All states in sign order.
    pub const ALL: [ChargeState; 3] = [
        ChargeState::Negative,
        ChargeState::Neutral,
        ChargeState::Positive,
    ];

    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            ChargeState::Negative => -1,
            ChargeState::Neutral => 0,
            ChargeState::Positive => 1,
        }
    }

    /// Position of the state in [`ChargeState::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ChargeState::Negative => 0,
            ChargeState::Neutral => 1,
            ChargeState::Positive => 2,
        }
    }

    pub fn from_sign(sign: i8) -> Option<Self> {
        match sign {
            -1 => Some(ChargeState::Negative),
            0 => Some(ChargeState::Neutral),
            1 => Some(ChargeState::Positive),
            _ => None,
        }
    }

    /// Next state with a strictly higher sign, if any.
    #[inline]
    pub fn next_higher(self) -> Option<Self> {
        match self {
            ChargeState::Negative => Some(ChargeState::Neutral),
            ChargeState::Neutral => Some(ChargeState::Positive),
            ChargeState::Positive => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            ChargeState::Negative => '-',
            ChargeState::Neutral => '0',
            ChargeState::Positive => '+',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '-' => Some(ChargeState::Negative),
            '0' => Some(ChargeState::Neutral),
            '+' => Some(ChargeState::Positive),
            _ => None,
        }
    }
}

impl fmt::Display for ChargeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Counts of each charge state required across the free sites of some scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChargeMultiset {
    counts: [u64; 3],
}

impl ChargeMultiset {
    pub fn new(negative: u64, neutral: u64, positive: u64) -> Self {
        Self {
            counts: [negative, neutral, positive],
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: [u64; 3]) -> Self {
        Self { counts }
    }

    pub fn from_states<I>(states: I) -> Self
    where
        I: IntoIterator<Item = ChargeState>,
    {
        let mut multiset = Self::empty();
        for cs in states {
            multiset.insert(cs);
        }
        multiset
    }

    #[inline]
    pub fn count(&self, cs: ChargeState) -> u64 {
        self.counts[cs.index()]
    }

    #[inline]
    pub fn counts(&self) -> [u64; 3] {
        self.counts
    }

    #[inline]
    pub fn contains(&self, cs: ChargeState) -> bool {
        self.count(cs) != 0
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn insert(&mut self, cs: ChargeState) {
        self.counts[cs.index()] += 1;
    }

    /// Removes one occurrence of `cs`, returning whether one was present.
    pub fn remove_one(&mut self, cs: ChargeState) -> bool {
        let slot = &mut self.counts[cs.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Returns a copy where one `from` has been converted into a `to`.
    ///
    /// Returns `None` when the multiset holds no `from`.
    pub fn with_one_converted(&self, from: ChargeState, to: ChargeState) -> Option<Self> {
        let mut converted = *self;
        if !converted.remove_one(from) {
            return None;
        }
        converted.insert(to);
        Some(converted)
    }

    /// The single state of a one-element multiset.
    pub fn single_state(&self) -> Option<ChargeState> {
        if self.total() != 1 {
            return None;
        }
        ChargeState::ALL.into_iter().find(|&cs| self.contains(cs))
    }

    /// Iterates all elements in sign order, repeating each state by its count.
    pub fn iter(&self) -> impl Iterator<Item = ChargeState> + '_ {
        ChargeState::ALL
            .into_iter()
            .flat_map(move |cs| std::iter::repeat_n(cs, self.count(cs) as usize))
    }
}

impl FromIterator<ChargeState> for ChargeMultiset {
    fn from_iter<I: IntoIterator<Item = ChargeState>>(iter: I) -> Self {
        Self::from_states(iter)
    }
}

impl fmt::Display for ChargeMultiset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{-:{}, 0:{}, +:{}}}",
            self.counts[0], self.counts[1], self.counts[2]
        )
    }
}

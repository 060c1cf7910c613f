use super::charge::ChargeState;
use std::fmt;

/// One charge state per site of a layout, indexed by site.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChargeConfiguration {
    charges: Vec<ChargeState>,
}

impl ChargeConfiguration {
    pub fn new(charges: Vec<ChargeState>) -> Self {
        Self { charges }
    }

    pub fn uniform(num_sites: usize, cs: ChargeState) -> Self {
        Self {
            charges: vec![cs; num_sites],
        }
    }

    /// Parses a `-0+` string, one symbol per site.
    pub fn parse(symbols: &str) -> Option<Self> {
        symbols
            .chars()
            .map(ChargeState::from_symbol)
            .collect::<Option<Vec<_>>>()
            .map(Self::new)
    }

    #[inline]
    pub fn charges(&self) -> &[ChargeState] {
        &self.charges
    }

    #[inline]
    pub fn charge(&self, site: usize) -> ChargeState {
        self.charges[site]
    }

    pub fn len(&self) -> usize {
        self.charges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charges.is_empty()
    }

    pub fn count(&self, cs: ChargeState) -> usize {
        self.charges.iter().filter(|&&c| c == cs).count()
    }
}

impl fmt::Display for ChargeConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cs in &self.charges {
            write!(f, "{}", cs.symbol())?;
        }
        Ok(())
    }
}

/// A configuration confirmed physically valid, with its electrostatic system energy in eV.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeDistribution {
    pub configuration: ChargeConfiguration,
    pub system_energy: f64,
}

use crate::core::physics::params::PhysicalParams;
use nalgebra::Point2;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// A dangling bond site in SiQAD lattice coordinates.
///
/// `x` counts lattice columns along a dimer row, `y` counts dimer rows and `z` selects
/// the upper (0) or lower (1) atom of a dimer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct SiteCoord {
    pub x: i64,
    pub y: i64,
    pub z: u8,
}

impl SiteCoord {
    pub fn new(x: i64, y: i64, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Position in nm on the surface plane.
    pub fn nm_position(&self, params: &PhysicalParams) -> Point2<f64> {
        Point2::new(
            self.x as f64 * params.lat_a / 10.0,
            (self.y as f64 * params.lat_b + self.z as f64 * params.lat_c) / 10.0,
        )
    }
}

impl fmt::Display for SiteCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Duplicate site at {0}")]
    DuplicateSite(SiteCoord),
    #[error("Invalid dimer index at {0}; expected z to be 0 or 1")]
    InvalidDimerIndex(SiteCoord),
}

/// The ordered set of sites to simulate. Site indices follow insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteLayout {
    sites: Vec<SiteCoord>,
}

impl SiteLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sites<I>(sites: I) -> Result<Self, LayoutError>
    where
        I: IntoIterator<Item = SiteCoord>,
    {
        let mut layout = Self::new();
        for site in sites {
            layout.add_site(site)?;
        }
        Ok(layout)
    }

    /// Appends a site and returns its index.
    pub fn add_site(&mut self, site: SiteCoord) -> Result<usize, LayoutError> {
        if site.z > 1 {
            return Err(LayoutError::InvalidDimerIndex(site));
        }
        if self.sites.contains(&site) {
            return Err(LayoutError::DuplicateSite(site));
        }
        self.sites.push(site);
        Ok(self.sites.len() - 1)
    }

    #[inline]
    pub fn sites(&self) -> &[SiteCoord] {
        &self.sites
    }

    #[inline]
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn nm_positions(&self, params: &PhysicalParams) -> Vec<Point2<f64>> {
        self.sites.iter().map(|s| s.nm_position(params)).collect()
    }

    /// Checks the invariants for a layout assembled outside [`SiteLayout::add_site`].
    pub fn validate(&self) -> Result<(), LayoutError> {
        let mut seen = HashSet::with_capacity(self.sites.len());
        for &site in &self.sites {
            if site.z > 1 {
                return Err(LayoutError::InvalidDimerIndex(site));
            }
            if !seen.insert(site) {
                return Err(LayoutError::DuplicateSite(site));
            }
        }
        Ok(())
    }
}

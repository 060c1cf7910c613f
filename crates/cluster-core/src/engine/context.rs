use super::cache::AssignmentCache;
use super::config::SearchConfig;
use super::progress::ProgressReporter;
use crate::core::hierarchy::ClusterHierarchy;
use crate::core::models::charge::ChargeState;
use crate::core::physics::surface::ChargeSurface;

/// Read-only state shared by every pass and worker of one ground-state search.
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub surface: &'a ChargeSurface,
    /// Hierarchy without pre-assignments; each pass derives its own copy.
    pub hierarchy: &'a ClusterHierarchy,
    pub assignments: &'a AssignmentCache,
    pub config: &'a SearchConfig,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        surface: &'a ChargeSurface,
        hierarchy: &'a ClusterHierarchy,
        assignments: &'a AssignmentCache,
        config: &'a SearchConfig,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            surface,
            hierarchy,
            assignments,
            config,
            reporter,
        }
    }

    pub fn num_sites(&self) -> usize {
        self.surface.num_sites()
    }

    /// Layout-wide pre-assignment map with the given sites forced to `cs`.
    pub fn fixity_with(
        &self,
        base: &[Option<ChargeState>],
        sites: &[usize],
        cs: ChargeState,
    ) -> Vec<Option<ChargeState>> {
        let mut fixity = base.to_vec();
        for &site in sites {
            fixity[site] = Some(cs);
        }
        fixity
    }
}

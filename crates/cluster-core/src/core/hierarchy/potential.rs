use super::tree::ClusterHierarchy;
use crate::core::models::cluster::Cluster;
use crate::core::models::ids::NodeId;
use crate::core::models::layout::SiteLayout;
use crate::core::physics::params::PhysicalParams;
use crate::core::physics::potentials::unit_gradient_distance;
use nalgebra::Point2;
use std::collections::BTreeSet;
use std::f64::consts::{PI, SQRT_2};
use tracing::{debug, instrument};

type SiteSet = BTreeSet<usize>;

/// Source of the cluster hierarchy a search refines.
pub trait HierarchyProvider {
    fn build(&self) -> ClusterHierarchy;
}

/// Cone-angle hierarchy.
///
/// Every site observes every other site through an ellipsoidal region opening toward it,
/// whose width is set by the cone angle and whose length scales with the distance at
/// which the screened potential flattens out. Sites that all observers see together are
/// agreed clusters; they are merged into a tree rooted at the full site set.
#[derive(Debug, Clone)]
pub struct PotentialHierarchy {
    positions: Vec<Point2<f64>>,
    params: PhysicalParams,
    cone_angle: f64,
}

impl PotentialHierarchy {
    /// # Arguments
    ///
    /// * `layout` - The sites to cluster.
    /// * `params` - Physical parameters; they fix site positions and the screening length.
    /// * `cone_angle` - Opening angle of the observation cones, in degrees.
    pub fn new(layout: &SiteLayout, params: PhysicalParams, cone_angle: f64) -> Self {
        let positions = layout
            .nm_positions(&params)
            .into_iter()
            .map(|p| Point2::new(p.x * 1e-9, p.y * 1e-9))
            .collect();
        Self {
            positions,
            params,
            cone_angle,
        }
    }

    fn num_sites(&self) -> usize {
        self.positions.len()
    }

    /// Sites of `others` that lie in the region observer `i` watches toward `j`, plus `j`.
    fn make_observation(&self, others: &SiteSet, d_0: f64, i: usize, j: usize) -> SiteSet {
        let (xi, yi) = (self.positions[i].x, self.positions[i].y);
        let (xj, yj) = (self.positions[j].x, self.positions[j].y);
        let dx = xj - xi;
        let dy = yj - yi;
        let d = dx.hypot(dy);

        let gamma = (dy / dx).atan();
        let (sin_g, cos_g) = gamma.sin_cos();
        let b = (PI / 360.0 * self.cone_angle).tan() * d;
        let a1 = b.min(b * (d / d_0).sqrt());
        let a2 = 1.0f64.max((d / d_0).sqrt()) * b * SQRT_2;

        let s = f64::from(sgn(dx));
        let near_axis = s.max(0.0) * a1 - s.min(0.0) * a2;
        let far_axis = s.max(0.0) * a2 - s.min(0.0) * a1;

        let mut observation = SiteSet::from([j]);
        for &site in others {
            let (x, y) = (self.positions[site].x, self.positions[site].y);
            let behind = ((x - xj).min(0.0) * cos_g + (y - yj) * sin_g) / near_axis;
            let ahead = ((x - xj).max(0.0) * cos_g + (y - yj) * sin_g) / far_axis;
            let across = ((x - xj) * sin_g - (y - yj) * cos_g) / b;
            if behind.powi(2) + ahead.powi(2) + across.powi(2) <= 1.0 {
                observation.insert(site);
            }
        }
        observation
    }

    /// Reduces one observer's observations to the clusters of sites always seen together.
    fn observations_to_clusters(
        others: &SiteSet,
        mut observations: BTreeSet<SiteSet>,
    ) -> BTreeSet<SiteSet> {
        while let Some(superset) = observations
            .iter()
            .find(|o_i| {
                observations
                    .iter()
                    .any(|o_j| o_j != *o_i && o_j.is_subset(o_i))
            })
            .cloned()
        {
            observations.remove(&superset);
        }

        let mut clusters = BTreeSet::new();
        let mut seen = SiteSet::new();
        for &i in others {
            if seen.contains(&i) {
                continue;
            }
            let (with_i, without_i): (Vec<&SiteSet>, Vec<&SiteSet>) =
                observations.iter().partition(|o| o.contains(&i));

            let mut cluster = SiteSet::new();
            for o in &with_i {
                for &j in o.iter() {
                    if with_i.iter().all(|c| c.contains(&j))
                        && without_i.iter().all(|c| !c.contains(&j))
                    {
                        cluster.insert(j);
                        seen.insert(j);
                    }
                }
            }
            if cluster.len() > 1 {
                clusters.insert(cluster);
            }
        }
        clusters
    }
}

impl HierarchyProvider for PotentialHierarchy {
    #[instrument(skip_all, name = "potential_hierarchy")]
    fn build(&self) -> ClusterHierarchy {
        let n = self.num_sites();
        let d_0 = unit_gradient_distance(&self.params, 1e-10, 1e-7, 100, 1e-12);
        let all: SiteSet = (0..n).collect();

        let mut agreed = BTreeSet::new();
        for i in 0..n {
            let mut without_i = all.clone();
            without_i.remove(&i);
            let observations = without_i
                .iter()
                .map(|&j| {
                    let mut others = without_i.clone();
                    others.remove(&j);
                    self.make_observation(&others, d_0, i, j)
                })
                .collect();
            agreed.extend(Self::observations_to_clusters(&without_i, observations));
        }
        debug!(
            sites = n,
            agreed_clusters = agreed.len(),
            "Collected agreed clusters."
        );

        let leaves = (0..n).map(BuildNode::leaf).collect();
        let mut root = BuildNode::with_children(all, leaves);
        for cluster in &agreed {
            root.insert_cluster(cluster);
        }
        for cluster in agreed.iter().rev() {
            root.insert_cluster(cluster);
        }

        let hierarchy = root.into_hierarchy();
        debug!(nodes = hierarchy.len(), "Built cluster hierarchy.");
        hierarchy
    }
}

fn sgn(v: f64) -> i8 {
    (0.0 < v) as i8 - (v < 0.0) as i8
}

/// Owned tree used while clusters are inserted; flattened into the arena afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BuildNode {
    members: SiteSet,
    children: Vec<BuildNode>,
}

impl BuildNode {
    fn leaf(site: usize) -> Self {
        Self {
            members: SiteSet::from([site]),
            children: Vec::new(),
        }
    }

    fn with_children(members: SiteSet, mut children: Vec<BuildNode>) -> Self {
        children.sort_by(|a, b| a.members.cmp(&b.members));
        Self { members, children }
    }

    /// Union of `parts`; a single part is returned unchanged.
    fn merged(mut parts: Vec<BuildNode>) -> Self {
        if parts.len() == 1 {
            return parts.remove(0);
        }
        let members = parts.iter().flat_map(|p| p.members.iter().copied()).collect();
        Self::with_children(members, parts)
    }

    fn push_child(&mut self, child: BuildNode) {
        let pos = self
            .children
            .partition_point(|c| c.members < child.members);
        self.children.insert(pos, child);
    }

    /// Splits `self` along `conflict` into the parts inside it and the parts outside.
    fn resolve_conflict(
        self,
        conflict: &SiteSet,
        conflicting: &mut Vec<BuildNode>,
        non_conflicting: &mut Vec<BuildNode>,
    ) {
        if conflict.is_empty() {
            non_conflicting.push(self);
            return;
        }
        if *conflict == self.members {
            conflicting.push(self);
            return;
        }
        for child in self.children {
            let cut: SiteSet = child.members.intersection(conflict).copied().collect();
            child.resolve_conflict(&cut, conflicting, non_conflicting);
        }
    }

    fn insert_cluster(&mut self, cluster: &SiteSet) {
        if cluster.is_empty() || self.members == *cluster {
            return;
        }
        if let Some(child) = self
            .children
            .iter_mut()
            .find(|h| cluster.is_subset(&h.members))
        {
            child.insert_cluster(cluster);
            return;
        }

        let overlaps: Vec<bool> = self
            .children
            .iter()
            .map(|h| !h.members.is_disjoint(cluster))
            .collect();
        let any_conflict = self
            .children
            .iter()
            .zip(&overlaps)
            .any(|(h, &o)| o && !h.members.is_subset(cluster));

        let children = std::mem::take(&mut self.children);
        let (overlapping, rest): (Vec<_>, Vec<_>) = children
            .into_iter()
            .zip(overlaps)
            .partition(|(_, o)| *o);
        self.children = rest.into_iter().map(|(h, _)| h).collect();
        let overlapping: Vec<BuildNode> = overlapping.into_iter().map(|(h, _)| h).collect();

        if !any_conflict {
            self.push_child(BuildNode::with_children(cluster.clone(), overlapping));
            return;
        }

        for h in overlapping {
            if h.members.is_subset(cluster) {
                self.push_child(h);
                continue;
            }
            let conflict: SiteSet = h.members.intersection(cluster).copied().collect();
            let mut conflicting = Vec::new();
            let mut non_conflicting = Vec::new();
            h.resolve_conflict(&conflict, &mut conflicting, &mut non_conflicting);

            let bottom = BuildNode::merged(conflicting);
            let mut top = BuildNode::merged(non_conflicting);
            let remainder: SiteSet = conflict.difference(&bottom.members).copied().collect();
            top.insert_cluster(&remainder);

            self.push_child(top);
            self.push_child(bottom);
        }
    }

    /// Moves the tree into an arena, skipping nodes that have a single child.
    fn into_hierarchy(self) -> ClusterHierarchy {
        let node = self.collapsed();
        let mut hierarchy = ClusterHierarchy::new(Cluster::new(node.members.iter().copied()));
        let root = hierarchy.root();
        for child in node.children {
            child.attach(&mut hierarchy, root);
        }
        hierarchy
    }

    fn collapsed(mut self) -> Self {
        while self.children.len() == 1 {
            self = self.children.remove(0);
        }
        self
    }

    fn attach(self, hierarchy: &mut ClusterHierarchy, parent: NodeId) {
        let node = self.collapsed();
        let id = hierarchy.add_child(parent, Cluster::new(node.members.iter().copied()));
        for child in node.children {
            child.attach(hierarchy, id);
        }
    }
}

use super::partition::MultisetPartition;
use super::stability::StabilityChecker;
use crate::core::hierarchy::ClusterHierarchy;
use crate::core::models::charge::{ChargeMultiset, ChargeState};
use crate::core::models::cluster::Cluster;
use crate::core::models::configuration::ChargeConfiguration;
use crate::core::models::ids::NodeId;
use tracing::trace;

/// Branch-and-bound descent through the cluster hierarchy.
///
/// A state is a clustering (a list of hierarchy nodes partitioning the layout) together
/// with one charge multiset per node. States that fail the stability check are pruned;
/// otherwise the largest node with children is replaced by its children and every
/// distribution of its multiset over them is explored.
pub struct Refiner<'a> {
    hierarchy: &'a ClusterHierarchy,
    checker: &'a StabilityChecker<'a>,
    num_sites: usize,
}

impl<'a> Refiner<'a> {
    pub fn new(
        hierarchy: &'a ClusterHierarchy,
        checker: &'a StabilityChecker<'a>,
        num_sites: usize,
    ) -> Self {
        Self {
            hierarchy,
            checker,
            num_sites,
        }
    }

    /// Collects every configuration reachable from the state into `out`.
    pub fn refine(
        &self,
        nodes: &[NodeId],
        sigma: &[ChargeMultiset],
        out: &mut Vec<ChargeConfiguration>,
    ) {
        let clustering: Vec<&Cluster> = nodes.iter().map(|&n| self.hierarchy.cluster(n)).collect();
        if !self.checker.is_population_stable(&clustering, sigma) {
            trace!(clusters = nodes.len(), "Pruned clustering.");
            return;
        }

        let split = nodes
            .iter()
            .enumerate()
            .filter(|&(_, &n)| !self.hierarchy.is_leaf(n))
            .fold(None, |best: Option<(usize, usize)>, (pos, &n)| {
                let size = self.hierarchy.cluster(n).size();
                match best {
                    Some((_, best_size)) if best_size >= size => best,
                    _ => Some((pos, size)),
                }
            });

        let Some((pos, _)) = split else {
            if let Some(configuration) = self.emit(&clustering, sigma) {
                out.push(configuration);
            }
            return;
        };

        let children = self.hierarchy.children(nodes[pos]);
        let child_clusters: Vec<&Cluster> =
            children.iter().map(|&c| self.hierarchy.cluster(c)).collect();

        let mut next_nodes = Vec::with_capacity(nodes.len() + children.len() - 1);
        next_nodes.extend_from_slice(&nodes[..pos]);
        next_nodes.extend_from_slice(children);
        next_nodes.extend_from_slice(&nodes[pos + 1..]);

        let mut next_sigma = Vec::with_capacity(next_nodes.len());
        for distribution in MultisetPartition::for_clusters(&child_clusters, sigma[pos]).distributions()
        {
            next_sigma.clear();
            next_sigma.extend_from_slice(&sigma[..pos]);
            next_sigma.extend(distribution);
            next_sigma.extend_from_slice(&sigma[pos + 1..]);
            self.refine(&next_nodes, &next_sigma, out);
        }
    }

    /// Realises a clustering of leaves as a full configuration.
    fn emit(&self, leaves: &[&Cluster], sigma: &[ChargeMultiset]) -> Option<ChargeConfiguration> {
        let mut charges = vec![ChargeState::Neutral; self.num_sites];
        for (cluster, multiset) in leaves.iter().zip(sigma) {
            for &site in cluster.members() {
                let cs = match cluster.fixed_charge(site) {
                    Some(fixed) => fixed,
                    None => multiset.single_state()?,
                };
                charges[site] = cs;
            }
        }
        Some(ChargeConfiguration::new(charges))
    }
}

use crate::core::models::charge::ChargeState;
use crate::core::models::cluster::Cluster;
use crate::core::models::ids::NodeId;
use slotmap::SlotMap;

/// A node of the cluster hierarchy.
#[derive(Debug, Clone)]
pub struct HierarchyNode {
    pub cluster: Cluster,
    /// Child nodes, whose clusters partition this node's cluster. Empty for leaves.
    pub children: Vec<NodeId>,
}

impl HierarchyNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Tree of site clusters rooted at the full site set.
///
/// Nodes live in a slot map arena and refer to their children by [`NodeId`]. The
/// hierarchy is built once per search and then only read; the search takes a copy with
/// pre-assignment flags through [`ClusterHierarchy::with_fixed_charges`].
#[derive(Debug, Clone)]
pub struct ClusterHierarchy {
    nodes: SlotMap<NodeId, HierarchyNode>,
    root: NodeId,
}

impl ClusterHierarchy {
    /// Creates a hierarchy holding only its root.
    pub fn new(root: Cluster) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(HierarchyNode {
            cluster: root,
            children: Vec::new(),
        });
        Self { nodes, root }
    }

    /// A two-level hierarchy: the root over `num_sites` singleton leaves.
    pub fn flat(num_sites: usize) -> Self {
        let mut hierarchy = Self::new(Cluster::new(0..num_sites));
        if num_sites > 1 {
            let root = hierarchy.root;
            for site in 0..num_sites {
                hierarchy.add_child(root, Cluster::singleton(site));
            }
        }
        hierarchy
    }

    /// Appends a child to `parent` and returns its handle.
    ///
    /// # Arguments
    ///
    /// * `parent` - The node to extend; must belong to this hierarchy.
    /// * `cluster` - The child's cluster, expected to be a subset of the parent's.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not a node of this hierarchy.
    pub fn add_child(&mut self, parent: NodeId, cluster: Cluster) -> NodeId {
        debug_assert!(
            cluster
                .members()
                .iter()
                .all(|&s| self.nodes[parent].cluster.contains(s))
        );
        let child = self.nodes.insert(HierarchyNode {
            cluster,
            children: Vec::new(),
        });
        self.nodes[parent].children.push(child);
        child
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&HierarchyNode> {
        self.nodes.get(id)
    }

    /// Cluster of a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a node of this hierarchy.
    #[inline]
    pub fn cluster(&self, id: NodeId) -> &Cluster {
        &self.nodes[id].cluster
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    #[inline]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].is_leaf()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Leaf nodes in depth-first order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.is_leaf() {
                leaves.push(id);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }

    /// Copy of the hierarchy whose clusters carry the pre-assigned charges of `fixity`.
    ///
    /// Node handles remain valid in the copy.
    pub fn with_fixed_charges(&self, fixity: &[Option<ChargeState>]) -> Self {
        let mut nodes = self.nodes.clone();
        for node in nodes.values_mut() {
            node.cluster = node.cluster.with_fixed_charges(fixity);
        }
        Self {
            nodes,
            root: self.root,
        }
    }
}

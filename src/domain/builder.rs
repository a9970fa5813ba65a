//! Tree builder: WBS node list + linkage matrix -> aggregated forest.

use std::collections::{BTreeMap, HashSet};

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::{TreeNode, WbsTree};
use crate::domain::entities::{LinkageRow, Proposal, ValueRecord, WbsNode};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::matrix::{build_matrix, Matrix};

/// Constructs the comparison forest in three passes: node creation, linking
/// and post-order aggregation.
pub struct TreeBuilder<'a> {
    proposals: &'a [Proposal],
}

impl<'a> TreeBuilder<'a> {
    pub fn new(proposals: &'a [Proposal]) -> Self {
        Self { proposals }
    }

    /// Build and aggregate the forest.
    ///
    /// Nodes whose parent id is absent from `nodes` become roots. Duplicate ids
    /// and parent cycles are rejected before any totals are rolled up.
    #[instrument(level = "debug", skip_all, fields(nodes = nodes.len(), proposals = self.proposals.len()))]
    pub fn build(&self, nodes: &[WbsNode], matrix: &Matrix) -> DomainResult<WbsTree> {
        let mut tree = WbsTree::new(self.proposals.iter().map(|p| p.id.clone()).collect());

        // Pass 1: nodes with direct values
        let mut created = Vec::with_capacity(nodes.len());
        for wbs in nodes {
            let values = self.direct_values(wbs, matrix);
            let idx = tree
                .insert_node(TreeNode::from_wbs(wbs, values))
                .ok_or_else(|| DomainError::DuplicateNode(wbs.id.clone()))?;
            created.push(idx);
        }

        // Pass 2: parent/child links, input order preserved
        for (wbs, &idx) in nodes.iter().zip(&created) {
            let parent = wbs.parent_id.as_deref().and_then(|p| tree.index_of(p));
            tree.attach(idx, parent);
        }
        Self::ensure_acyclic(&tree, nodes)?;
        debug!("linked {} roots", tree.roots().len());

        // Pass 3: roll totals up
        self.aggregate(&mut tree);
        Ok(tree)
    }

    fn direct_values(&self, wbs: &WbsNode, matrix: &Matrix) -> BTreeMap<String, ValueRecord> {
        self.proposals
            .iter()
            .map(|p| {
                let items = matrix.cell(&wbs.id, &p.id).to_vec();
                (p.id.clone(), ValueRecord::from_items(items))
            })
            .collect()
    }

    /// Every node must be reachable from a root; an unreachable node sits on a
    /// parent cycle.
    fn ensure_acyclic(tree: &WbsTree, nodes: &[WbsNode]) -> DomainResult<()> {
        let reached: HashSet<Index> = tree.iter().map(|(idx, _)| idx).collect();
        if reached.len() == tree.len() {
            return Ok(());
        }
        let stuck = nodes
            .iter()
            .find(|n| tree.index_of(&n.id).is_some_and(|idx| !reached.contains(&idx)))
            .map(|n| n.id.clone())
            .unwrap_or_default();
        Err(DomainError::CycleDetected(stuck))
    }

    /// Add each child's aggregated total into its parent, per proposal.
    ///
    /// Post-order guarantees children are final before their parent is
    /// updated. Item lists are never merged.
    fn aggregate(&self, tree: &mut WbsTree) {
        let order: Vec<Index> = tree.iter_postorder().map(|(idx, _)| idx).collect();

        for idx in order {
            let child_totals: Vec<(String, f64)> = tree
                .children(idx)
                .flat_map(|(_, child)| {
                    self.proposals
                        .iter()
                        .map(move |p| (p.id.clone(), child.total(&p.id)))
                })
                .filter(|(_, total)| *total > 0.0)
                .collect();

            if let Some(node) = tree.get_node_mut(idx) {
                for (proposal_id, total) in child_totals {
                    if let Some(record) = node.values.get_mut(&proposal_id) {
                        record.total += total;
                    }
                }
            }
        }
    }
}

/// Index, build and filter in one go: the tree a comparison view renders.
pub fn build_comparison_tree(
    nodes: &[WbsNode],
    linkages: &[LinkageRow],
    proposals: &[Proposal],
) -> DomainResult<WbsTree> {
    let matrix = build_matrix(linkages);
    let tree = TreeBuilder::new(proposals).build(nodes, &matrix)?;
    Ok(tree.filter_relevant())
}

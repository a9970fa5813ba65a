//! Comparison service
//!
//! Loads a snapshot and turns it into the aggregated, filtered WBS tree and
//! per-node detail views.

use std::sync::Arc;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{
    DomainError, Matrix, NodeDetail, Proposal, RowComparison, TreeBuilder, WbsTree,
};
use crate::infrastructure::traits::SnapshotSource;

/// Proposals plus the tree aggregated over them.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Untouched proposal list, for column headers and summary totals
    pub proposals: Vec<Proposal>,
    pub tree: WbsTree,
}

impl Comparison {
    /// Lowest/highest ranking of one tree row.
    pub fn row(&self, idx: Index) -> Option<RowComparison> {
        self.tree
            .get_node(idx)
            .map(|node| RowComparison::for_node(node, self.tree.proposals()))
    }
}

/// Service for building proposal comparisons.
pub struct ComparisonService {
    source: Arc<dyn SnapshotSource>,
}

impl ComparisonService {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self { source }
    }

    /// Aggregated tree with every branch that carries no value pruned.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self) -> ApplicationResult<Comparison> {
        let full = self.load_unfiltered()?;
        let tree = full.tree.filter_relevant();
        Ok(Comparison {
            proposals: full.proposals,
            tree,
        })
    }

    /// Aggregated tree including zero-value branches.
    pub fn load_unfiltered(&self) -> ApplicationResult<Comparison> {
        let snapshot = self.source.load_snapshot().with_context("load snapshot")?;
        debug!(
            "snapshot: {} nodes, {} proposals, {} linkages",
            snapshot.wbs_nodes.len(),
            snapshot.proposals.len(),
            snapshot.linkages.len()
        );

        let matrix = Matrix::build(&snapshot.linkages);
        let tree = TreeBuilder::new(&snapshot.proposals).build(&snapshot.wbs_nodes, &matrix)?;

        Ok(Comparison {
            proposals: snapshot.proposals,
            tree,
        })
    }

    /// Items linked directly to one WBS node, grouped per proposal.
    #[instrument(level = "debug", skip(self))]
    pub fn detail(&self, wbs_id: &str) -> ApplicationResult<NodeDetail> {
        let snapshot = self.source.load_snapshot().with_context("load snapshot")?;
        let node = snapshot
            .wbs_nodes
            .iter()
            .find(|n| n.id == wbs_id)
            .ok_or_else(|| DomainError::NodeNotFound(wbs_id.to_string()))?;

        Ok(NodeDetail::build(node, &snapshot.linkages, &snapshot.proposals))
    }
}

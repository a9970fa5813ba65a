//! Linkage matrix: `(wbs node, proposal) -> linked items`.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::entities::{LinkageRow, ProposalId, ProposalItem, WbsId};

/// Two-level lookup from WBS node id to proposal id to the items linked there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    cells: HashMap<WbsId, HashMap<ProposalId, Vec<ProposalItem>>>,
}

impl Matrix {
    /// Index linkage rows.
    ///
    /// Rows without a resolved item and rows whose item is hidden from the
    /// comparison are dropped. Items keep the relative order of their rows.
    #[instrument(level = "debug", skip_all, fields(rows = rows.len()))]
    pub fn build(rows: &[LinkageRow]) -> Self {
        let mut cells: HashMap<WbsId, HashMap<ProposalId, Vec<ProposalItem>>> = HashMap::new();
        let mut skipped = 0usize;

        for row in rows {
            let Some(item) = row.comparable_item() else {
                skipped += 1;
                continue;
            };
            cells
                .entry(row.wbs_id.clone())
                .or_default()
                .entry(item.proposal_id.clone())
                .or_default()
                .push(item.clone());
        }

        debug!("indexed {} nodes, skipped {} rows", cells.len(), skipped);
        Self { cells }
    }

    /// Items linked to `(wbs_id, proposal_id)`, empty when there are none.
    pub fn cell(&self, wbs_id: &str, proposal_id: &str) -> &[ProposalItem] {
        self.cells
            .get(wbs_id)
            .and_then(|by_proposal| by_proposal.get(proposal_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether any item is linked to the node for any proposal.
    pub fn contains_node(&self, wbs_id: &str) -> bool {
        self.cells.contains_key(wbs_id)
    }

    pub fn node_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Shorthand for [`Matrix::build`].
pub fn build_matrix(rows: &[LinkageRow]) -> Matrix {
    Matrix::build(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, proposal: &str, subtotal: f64) -> ProposalItem {
        ProposalItem::new(id, proposal, id, Some(subtotal))
    }

    #[test]
    fn given_rows_when_indexing_then_groups_by_node_and_proposal_in_input_order() {
        let rows = vec![
            LinkageRow::new("n1", Some(item("a", "p1", 1.0))),
            LinkageRow::new("n1", Some(item("b", "p2", 2.0))),
            LinkageRow::new("n1", Some(item("c", "p1", 3.0))),
            LinkageRow::new("n2", Some(item("d", "p1", 4.0))),
        ];

        let matrix = Matrix::build(&rows);

        let ids: Vec<_> = matrix.cell("n1", "p1").iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(matrix.cell("n1", "p2").len(), 1);
        assert_eq!(matrix.cell("n2", "p1").len(), 1);
        assert_eq!(matrix.node_count(), 2);
    }

    #[test]
    fn given_orphan_row_when_indexing_then_dropped_silently() {
        let rows = vec![
            LinkageRow::new("n1", None),
            LinkageRow::new("n1", Some(item("a", "p1", 1.0))),
        ];

        let matrix = Matrix::build(&rows);

        assert_eq!(matrix.cell("n1", "p1").len(), 1);
    }

    #[test]
    fn given_hidden_item_when_indexing_then_node_absent() {
        let mut hidden = item("a", "p1", 1000.0);
        hidden.hidden_from_equalization = true;

        let matrix = Matrix::build(&[LinkageRow::new("n1", Some(hidden))]);

        assert!(!matrix.contains_node("n1"));
        assert!(matrix.is_empty());
    }

    #[test]
    fn given_missing_cell_when_looking_up_then_empty_slice() {
        let matrix = Matrix::default();
        assert!(matrix.cell("nope", "p1").is_empty());
    }
}

//! Per-node comparison across proposals: detail grouping and highlighting.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::arena::TreeNode;
use crate::domain::entities::{sum_subtotals, LinkageRow, Proposal, ProposalId, ProposalItem, WbsNode};

/// How a proposal's total ranks against the others at the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    /// No value for this proposal
    Empty,
    Lowest,
    Highest,
    Intermediate,
}

/// Min/max over the positive totals of one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowComparison {
    min: f64,
    max: f64,
    positive: usize,
}

impl RowComparison {
    pub fn from_totals<I>(totals: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut min = f64::INFINITY;
        let mut max = 0.0;
        let mut positive = 0;
        for total in totals.into_iter().filter(|t| *t > 0.0) {
            positive += 1;
            if total < min {
                min = total;
            }
            if total > max {
                max = total;
            }
        }
        Self { min, max, positive }
    }

    /// Aggregated totals of a tree row, in proposal order.
    pub fn for_node(node: &TreeNode, proposals: &[ProposalId]) -> Self {
        Self::from_totals(proposals.iter().map(|p| node.total(p)))
    }

    /// A single positive total is marked lowest, never highest.
    pub fn highlight(&self, total: f64) -> Highlight {
        if total == 0.0 {
            Highlight::Empty
        } else if total == self.min && total > 0.0 {
            Highlight::Lowest
        } else if total == self.max && self.positive > 1 {
            Highlight::Highest
        } else {
            Highlight::Intermediate
        }
    }

    /// Bar length in percent of the row maximum.
    pub fn share_of_max(&self, total: f64) -> f64 {
        if self.max > 0.0 {
            total / self.max * 100.0
        } else {
            0.0
        }
    }

    /// `None` when no proposal carries value.
    pub fn min(&self) -> Option<f64> {
        (self.positive > 0).then_some(self.min)
    }
}

/// One proposal's column in the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalColumn {
    pub proposal_id: ProposalId,
    pub contractor_name: String,
    pub items: Vec<ProposalItem>,
    pub total: f64,
    pub highlight: Highlight,
    pub share_of_max: f64,
}

/// Items linked directly to one WBS node, side by side for every proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDetail {
    pub node: WbsNode,
    pub columns: Vec<ProposalColumn>,
}

impl NodeDetail {
    /// Group the node's linkage rows by proposal.
    ///
    /// Rows for other nodes, orphaned rows and hidden items are ignored.
    pub fn build(node: &WbsNode, linkages: &[LinkageRow], proposals: &[Proposal]) -> Self {
        let mut by_proposal: HashMap<&str, Vec<ProposalItem>> = HashMap::new();
        for item in linkages
            .iter()
            .filter(|row| row.wbs_id == node.id)
            .filter_map(LinkageRow::comparable_item)
        {
            by_proposal
                .entry(item.proposal_id.as_str())
                .or_default()
                .push(item.clone());
        }

        let grouped: Vec<(&Proposal, Vec<ProposalItem>)> = proposals
            .iter()
            .map(|p| (p, by_proposal.remove(p.id.as_str()).unwrap_or_default()))
            .collect();
        let row = RowComparison::from_totals(grouped.iter().map(|(_, items)| sum_subtotals(items)));

        let columns = grouped
            .into_iter()
            .map(|(proposal, items)| {
                let total = sum_subtotals(&items);
                ProposalColumn {
                    proposal_id: proposal.id.clone(),
                    contractor_name: proposal.contractor_name.clone(),
                    total,
                    highlight: row.highlight(total),
                    share_of_max: row.share_of_max(total),
                    items,
                }
            })
            .collect();

        Self {
            node: node.clone(),
            columns,
        }
    }

    pub fn column(&self, proposal_id: &str) -> Option<&ProposalColumn> {
        self.columns.iter().find(|c| c.proposal_id == proposal_id)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(&[100.0, 200.0, 300.0], 100.0, Highlight::Lowest)]
    #[case(&[100.0, 200.0, 300.0], 300.0, Highlight::Highest)]
    #[case(&[100.0, 200.0, 300.0], 200.0, Highlight::Intermediate)]
    #[case(&[100.0, 0.0], 0.0, Highlight::Empty)]
    #[case(&[100.0], 100.0, Highlight::Lowest)]
    #[case(&[50.0, 50.0, 80.0], 50.0, Highlight::Lowest)]
    fn given_row_totals_when_highlighting_then_ranks(
        #[case] totals: &[f64],
        #[case] total: f64,
        #[case] expected: Highlight,
    ) {
        let row = RowComparison::from_totals(totals.iter().copied());
        assert_eq!(row.highlight(total), expected);
    }

    #[test]
    fn given_all_equal_totals_when_highlighting_then_lowest_wins_over_highest() {
        let row = RowComparison::from_totals([70.0, 70.0]);
        assert_eq!(row.highlight(70.0), Highlight::Lowest);
    }

    #[test]
    fn given_no_positive_totals_when_comparing_then_no_min_and_zero_share() {
        let row = RowComparison::from_totals([0.0, 0.0]);
        assert_eq!(row.min(), None);
        assert_eq!(row.share_of_max(0.0), 0.0);
    }

    #[test]
    fn given_max_when_computing_share_then_percent_of_max() {
        let row = RowComparison::from_totals([50.0, 200.0]);
        assert_eq!(row.share_of_max(50.0), 25.0);
        assert_eq!(row.share_of_max(200.0), 100.0);
    }

    #[test]
    fn given_linkages_when_building_detail_then_groups_per_proposal_in_proposal_order() {
        let node = WbsNode::new("N", "1.1", "Foundations", 2, Some("R"));
        let proposals = vec![Proposal::new("P1", "Alfa", 0.0), Proposal::new("P2", "Beta", 0.0)];
        let mut hidden = ProposalItem::new("h", "P1", "hidden", Some(999.0));
        hidden.hidden_from_equalization = true;
        let linkages = vec![
            LinkageRow::new("N", Some(ProposalItem::new("b1", "P2", "piles", Some(300.0)))),
            LinkageRow::new("N", Some(ProposalItem::new("a1", "P1", "piles", Some(100.0)))),
            LinkageRow::new("N", Some(ProposalItem::new("a2", "P1", "caps", None))),
            LinkageRow::new("N", Some(hidden)),
            LinkageRow::new("N", None),
            LinkageRow::new("OTHER", Some(ProposalItem::new("x", "P1", "x", Some(5.0)))),
        ];

        let detail = NodeDetail::build(&node, &linkages, &proposals);

        assert_eq!(detail.columns[0].proposal_id, "P1");
        assert_eq!(detail.columns[0].items.len(), 2);
        assert_eq!(detail.columns[0].total, 100.0);
        assert_eq!(detail.columns[0].highlight, Highlight::Lowest);
        assert_eq!(detail.columns[1].total, 300.0);
        assert_eq!(detail.columns[1].highlight, Highlight::Highest);
        assert_eq!(detail.column("P2").map(|c| c.share_of_max), Some(100.0));
    }
}

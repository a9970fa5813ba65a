//! termtree rendering of the comparison tree
use std::collections::HashMap;

use generational_arena::Index;
use colored::Colorize;
use itertools::Itertools;
use termtree::Tree;
use tracing::instrument;

use crate::cli::output::{format_currency, paint};
use crate::domain::{Proposal, RowComparison, TreeNode, WbsTree};

/// Formatting knobs for one rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Deepest tree level shown; roots are depth 1, 0 shows everything
    pub depth: usize,
    pub currency_symbol: String,
    pub decimals: usize,
}

pub trait TreeNodeConvert {
    fn to_tree_string(&self, proposals: &[Proposal], opts: &RenderOptions) -> Tree<String>;
}

impl TreeNodeConvert for WbsTree {
    #[instrument(level = "debug", skip_all)]
    fn to_tree_string(&self, proposals: &[Proposal], opts: &RenderOptions) -> Tree<String> {
        let names: HashMap<&str, &str> = proposals
            .iter()
            .map(|p| (p.id.as_str(), p.contractor_name.as_str()))
            .collect();
        let columns: Vec<(&str, &str)> = self
            .proposals()
            .iter()
            .map(|pid| (pid.as_str(), names.get(pid.as_str()).copied().unwrap_or(pid.as_str())))
            .collect();

        let header = columns
            .iter()
            .map(|(_, name)| *name)
            .join(" | ");
        let mut root = Tree::new(format!("WBS | {header}"));

        if self.is_empty() {
            root.push(Tree::new("(no values)".to_string()));
            return root;
        }

        fn build_tree(
            tree: &WbsTree,
            idx: Index,
            depth: usize,
            columns: &[(&str, &str)],
            opts: &RenderOptions,
        ) -> Option<Tree<String>> {
            let node = tree.get_node(idx)?;
            let mut out = Tree::new(row_label(tree, node, columns, opts));
            if opts.depth == 0 || depth < opts.depth {
                for (child_idx, _) in tree.children(idx) {
                    if let Some(child) = build_tree(tree, child_idx, depth + 1, columns, opts) {
                        out.push(child);
                    }
                }
            }
            Some(out)
        }

        for &root_idx in self.roots() {
            if let Some(sub) = build_tree(self, root_idx, 1, &columns, opts) {
                root.push(sub);
            }
        }
        root
    }
}

fn row_label(
    tree: &WbsTree,
    node: &TreeNode,
    columns: &[(&str, &str)],
    opts: &RenderOptions,
) -> String {
    let row = RowComparison::for_node(node, tree.proposals());
    let cells = columns
        .iter()
        .map(|(pid, _)| {
            let total = node.total(pid);
            let text = format_currency(total, &opts.currency_symbol, opts.decimals);
            paint(&text, row.highlight(total)).to_string()
        })
        .join(" | ");
    let mut label = format!("{} {} | {}", node.code, node.label, cells);
    if node.has_direct_items() {
        label.push_str(&format!(" {}", format!("[detail: {}]", node.id).dimmed()));
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{build_comparison_tree, LinkageRow, ProposalItem, WbsNode};

    fn opts(depth: usize) -> RenderOptions {
        RenderOptions {
            depth,
            currency_symbol: "R$".into(),
            decimals: 0,
        }
    }

    fn fixture() -> (WbsTree, Vec<Proposal>) {
        colored::control::set_override(false);
        let nodes = vec![
            WbsNode::new("A", "1", "Estrutura", 1, None),
            WbsNode::new("A1", "1.1", "Fundação", 2, Some("A")),
            WbsNode::new("A11", "1.1.1", "Estacas", 3, Some("A1")),
        ];
        let proposals = vec![
            Proposal::new("P1", "Alfa", 1000.0),
            Proposal::new("P2", "Beta", 1200.0),
        ];
        let linkages = vec![
            LinkageRow::new("A11", Some(ProposalItem::new("i1", "P1", "estaca", Some(1000.0)))),
            LinkageRow::new("A11", Some(ProposalItem::new("i2", "P2", "estaca", Some(1200.0)))),
        ];
        let tree = build_comparison_tree(&nodes, &linkages, &proposals).unwrap();
        (tree, proposals)
    }

    #[test]
    fn given_depth_two_when_rendering_then_grandchildren_collapsed() {
        let (tree, proposals) = fixture();

        let text = tree.to_tree_string(&proposals, &opts(2)).to_string();

        assert!(text.starts_with("WBS | Alfa | Beta"));
        assert!(text.contains("1.1 Fundação | R$ 1.000 | R$ 1.200"));
        assert!(!text.contains("Estacas"));
    }

    #[test]
    fn given_depth_zero_when_rendering_then_all_levels_shown() {
        let (tree, proposals) = fixture();

        let text = tree.to_tree_string(&proposals, &opts(0)).to_string();

        assert!(text.contains("1.1.1 Estacas"));
    }

    #[test]
    fn given_linked_leaf_when_rendering_then_only_leaf_offers_detail() {
        let (tree, proposals) = fixture();

        let text = tree.to_tree_string(&proposals, &opts(0)).to_string();
        let line = |code: &str| {
            text.lines()
                .find(|l| l.contains(code))
                .expect("row rendered")
                .to_string()
        };

        assert!(line("1.1.1 Estacas").ends_with("[detail: A11]"));
        assert!(!line("1.1 Fundação").contains("[detail:"));
        assert!(!line("1 Estrutura").contains("[detail:"));
    }

    #[test]
    fn given_empty_tree_when_rendering_then_placeholder() {
        let tree = WbsTree::new(vec!["P1".into()]);
        let proposals = vec![Proposal::new("P1", "Alfa", 0.0)];

        let text = tree.to_tree_string(&proposals, &opts(2)).to_string();

        assert!(text.contains("(no values)"));
    }
}

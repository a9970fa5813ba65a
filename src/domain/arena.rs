//! Arena-backed WBS comparison forest.

use std::collections::{BTreeMap, HashMap};

use generational_arena::{Arena, Index};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::entities::{ProposalId, ValueRecord, WbsId, WbsNode};

/// Node of the comparison forest.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: WbsId,
    pub code: String,
    pub label: String,
    pub level: u32,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes, in input order
    pub children: Vec<Index>,
    /// One record per proposal of the comparison
    pub values: BTreeMap<ProposalId, ValueRecord>,
}

impl TreeNode {
    pub fn from_wbs(node: &WbsNode, values: BTreeMap<ProposalId, ValueRecord>) -> Self {
        Self {
            id: node.id.clone(),
            code: node.code.clone(),
            label: node.label.clone(),
            level: node.level,
            parent: None,
            children: Vec::new(),
            values,
        }
    }

    /// Total for one proposal, 0 when the proposal is unknown.
    pub fn total(&self, proposal_id: &str) -> f64 {
        self.values.get(proposal_id).map_or(0.0, |v| v.total)
    }

    /// Some proposal carries value at this node.
    pub fn has_value(&self) -> bool {
        self.values.values().any(ValueRecord::has_value)
    }

    /// Some proposal links items directly to this node.
    pub fn has_direct_items(&self) -> bool {
        self.values.values().any(|v| !v.items.is_empty())
    }
}

/// Forest of WBS nodes with per-proposal values.
///
/// Nodes live in a generational arena; children and parents refer to each
/// other by index only.
#[derive(Debug, Clone, Default)]
pub struct WbsTree {
    arena: Arena<TreeNode>,
    roots: Vec<Index>,
    by_id: HashMap<WbsId, Index>,
    proposals: Vec<ProposalId>,
}

impl WbsTree {
    pub fn new(proposals: Vec<ProposalId>) -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
            by_id: HashMap::new(),
            proposals,
        }
    }

    /// Insert a detached node. Call [`WbsTree::attach`] to place it.
    ///
    /// Returns `None` if a node with the same id already exists.
    pub fn insert_node(&mut self, node: TreeNode) -> Option<Index> {
        if self.by_id.contains_key(&node.id) {
            return None;
        }
        let id = node.id.clone();
        let idx = self.arena.insert(node);
        self.by_id.insert(id, idx);
        Some(idx)
    }

    /// Append `idx` to `parent`'s children, or to the roots when `parent` is None.
    pub fn attach(&mut self, idx: Index, parent: Option<Index>) {
        match parent.filter(|p| self.arena.contains(*p)) {
            Some(parent_idx) => {
                if let Some(node) = self.arena.get_mut(idx) {
                    node.parent = Some(parent_idx);
                }
                if let Some(parent) = self.arena.get_mut(parent_idx) {
                    parent.children.push(idx);
                }
            }
            None => self.roots.push(idx),
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.by_id.get(id).copied()
    }

    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        self.index_of(id).and_then(|idx| self.get_node(idx))
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn root_nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.roots.iter().filter_map(|&idx| self.arena.get(idx))
    }

    pub fn children(&self, idx: Index) -> impl Iterator<Item = (Index, &TreeNode)> {
        self.arena
            .get(idx)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|&c| self.arena.get(c).map(|node| (c, node)))
    }

    pub fn proposals(&self) -> &[ProposalId] {
        &self.proposals
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order, roots in order, children left to right.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Post-order: every node is yielded after all of its descendants.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Number of levels in the deepest branch.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(Index, usize)> = self.roots.iter().map(|&r| (r, 1)).collect();
        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.arena.get(idx) {
                stack.extend(node.children.iter().map(|&c| (c, depth + 1)));
            }
        }
        max_depth
    }

    /// Copy of the forest keeping only nodes that carry value, directly or
    /// through a kept descendant. The receiver is left untouched.
    #[instrument(level = "debug", skip(self), fields(nodes = self.len()))]
    pub fn filter_relevant(&self) -> WbsTree {
        // children come out of the post-order walk before their parent
        let mut relevant: HashMap<Index, bool> = HashMap::with_capacity(self.len());
        for (idx, node) in self.iter_postorder() {
            let via_child = node
                .children
                .iter()
                .any(|c| relevant.get(c).copied().unwrap_or(false));
            relevant.insert(idx, node.has_value() || via_child);
        }

        let mut filtered = WbsTree::new(self.proposals.clone());
        let mut stack: Vec<(Index, Option<Index>)> =
            self.roots.iter().rev().map(|&r| (r, None)).collect();

        while let Some((idx, new_parent)) = stack.pop() {
            if !relevant.get(&idx).copied().unwrap_or(false) {
                continue;
            }
            let Some(node) = self.arena.get(idx) else {
                continue;
            };
            let mut copy = node.clone();
            copy.parent = None;
            copy.children.clear();
            let Some(new_idx) = filtered.insert_node(copy) else {
                continue;
            };
            filtered.attach(new_idx, new_parent);
            for &child in node.children.iter().rev() {
                stack.push((child, Some(new_idx)));
            }
        }

        debug!("kept {} of {} nodes", filtered.len(), self.len());
        filtered
    }

    /// Nested, owned view of the forest for serialization.
    pub fn to_nested(&self) -> Vec<NestedNode> {
        self.roots
            .iter()
            .filter_map(|&r| self.nested_at(r))
            .collect()
    }

    fn nested_at(&self, idx: Index) -> Option<NestedNode> {
        let node = self.arena.get(idx)?;
        Some(NestedNode {
            id: node.id.clone(),
            code: node.code.clone(),
            label: node.label.clone(),
            level: node.level,
            children: node
                .children
                .iter()
                .filter_map(|&c| self.nested_at(c))
                .collect(),
            values: node.values.clone(),
        })
    }
}

/// Serializable tree node, roots own their children by value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedNode {
    pub id: WbsId,
    #[serde(rename = "caminho")]
    pub code: String,
    #[serde(rename = "item")]
    pub label: String,
    #[serde(rename = "nivel")]
    pub level: u32,
    pub children: Vec<NestedNode>,
    pub values: BTreeMap<ProposalId, ValueRecord>,
}

pub struct TreeIterator<'a> {
    tree: &'a WbsTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a WbsTree) -> Self {
        let stack = tree.roots.iter().rev().copied().collect();
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a WbsTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a WbsTree) -> Self {
        let stack = tree.roots.iter().rev().map(|&r| (r, false)).collect();
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

//! Domain layer: entities and the comparison core
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod comparison;
pub mod entities;
pub mod error;
pub mod matrix;
pub mod sheet;

pub use arena::{NestedNode, TreeNode, WbsTree};
pub use builder::{build_comparison_tree, TreeBuilder};
pub use comparison::{Highlight, NodeDetail, ProposalColumn, RowComparison};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use matrix::{build_matrix, Matrix};
pub use sheet::{ProposalSheet, Section};

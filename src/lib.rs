//! wbs-compare: side by side comparison of construction bids
//!
//! Proposal items are linked to nodes of a standard WBS. Linked subtotals are
//! indexed per node and proposal, rolled up from the leaves to the roots, and
//! branches without any value are pruned.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (SnapshotSource, ItemStore)
//! but are themselves concrete structs, not traits.

mod comparison;
mod editor;
mod proposals;

pub use comparison::{Comparison, ComparisonService};
pub use editor::{ItemEdit, ItemEditor};
pub use proposals::ProposalService;

//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::WbsId;

/// Domain errors represent malformed snapshots the core refuses to aggregate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate WBS node id: {0}")]
    DuplicateNode(WbsId),

    #[error("cycle detected in WBS hierarchy at node: {0}")]
    CycleDetected(WbsId),

    #[error("WBS node not found: {0}")]
    NodeNotFound(WbsId),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

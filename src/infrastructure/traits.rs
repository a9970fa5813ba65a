//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with in-memory implementations.

use std::io;
use std::path::Path;

use crate::domain::{ItemTag, LinkageRow, Proposal, ProposalItem, WbsNode};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// A complete, consistent copy of the comparison inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Reference WBS in display order
    pub wbs_nodes: Vec<WbsNode>,
    pub proposals: Vec<Proposal>,
    /// Linkages with their proposal item resolved, `None` when dangling
    pub linkages: Vec<LinkageRow>,
}

/// Read access to stored WBS nodes, proposals, items and linkages.
pub trait SnapshotSource: Send + Sync {
    /// Fetch everything the comparison tree needs in one consistent read.
    fn load_snapshot(&self) -> io::Result<Snapshot>;

    /// All items of one proposal, hidden ones included, in sheet order.
    fn proposal_items(&self, proposal_id: &str) -> io::Result<Vec<ProposalItem>>;

    /// Look up a single proposal item.
    fn find_item(&self, item_id: &str) -> io::Result<Option<ProposalItem>>;
}

/// Write access for reviewer edits on proposal items.
pub trait ItemStore: Send + Sync {
    fn update_tag(&self, item_id: &str, tag: Option<ItemTag>) -> io::Result<()>;

    fn update_hidden(&self, item_id: &str, hidden: bool) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

//! JSON snapshot store
//!
//! A single JSON document holding the reference WBS, proposals, proposal items
//! and the linkage table. Linkages reference items by id and are resolved on
//! read; a reference that no longer resolves yields a dangling linkage.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{ItemId, ItemTag, LinkageRow, Proposal, ProposalItem, WbsId, WbsNode};
use crate::infrastructure::traits::{FileSystem, ItemStore, Snapshot, SnapshotSource};
use crate::infrastructure::{InfraError, InfraResult};

/// One row of the linkage table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkageRecord {
    #[serde(rename = "eap_padrao_id")]
    pub wbs_id: WbsId,
    #[serde(rename = "eap_proposta_id")]
    pub item_id: ItemId,
}

/// On-disk layout of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub wbs_nodes: Vec<WbsNode>,
    #[serde(default)]
    pub proposals: Vec<Proposal>,
    #[serde(default)]
    pub proposal_items: Vec<ProposalItem>,
    #[serde(default)]
    pub linkages: Vec<LinkageRecord>,
}

impl SnapshotFile {
    pub fn parse(content: &str) -> io::Result<Self> {
        serde_json::from_str(content).map_err(io::Error::from)
    }

    pub fn to_json(&self) -> io::Result<String> {
        serde_json::to_string_pretty(self).map_err(io::Error::from)
    }

    /// WBS nodes in display order: keyed nodes by sort key, unkeyed ones last
    /// in input order.
    fn ordered_nodes(&self) -> Vec<WbsNode> {
        let mut nodes = self.wbs_nodes.clone();
        nodes.sort_by(|a, b| match (&a.sort_key, &b.sort_key) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        nodes
    }

    fn resolved_linkages(&self) -> Vec<LinkageRow> {
        let items: HashMap<&str, &ProposalItem> = self
            .proposal_items
            .iter()
            .map(|item| (item.id.as_str(), item))
            .collect();

        self.linkages
            .iter()
            .map(|link| LinkageRow {
                wbs_id: link.wbs_id.clone(),
                item: items.get(link.item_id.as_str()).map(|item| (*item).clone()),
            })
            .collect()
    }

    fn item_mut(&mut self, item_id: &str) -> io::Result<&mut ProposalItem> {
        self.proposal_items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("proposal item not found: {item_id}"),
                )
            })
    }
}

/// Snapshot source and item store backed by one JSON file.
pub struct JsonSnapshotStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: PathBuf) -> Self {
        Self { fs, path }
    }

    /// Open an existing snapshot file.
    pub fn open(fs: Arc<dyn FileSystem>, path: &Path) -> InfraResult<Self> {
        if !fs.exists(path) {
            return Err(InfraError::Snapshot {
                path: path.to_path_buf(),
                message: "file does not exist".to_string(),
            });
        }
        Ok(Self::new(fs, path.to_path_buf()))
    }

    pub fn read(&self) -> io::Result<SnapshotFile> {
        let content = self.fs.read_to_string(&self.path)?;
        SnapshotFile::parse(&content)
    }

    pub fn write(&self, snapshot: &SnapshotFile) -> io::Result<()> {
        self.fs.ensure_parent(&self.path)?;
        self.fs.write(&self.path, &snapshot.to_json()?)
    }

    fn update_item(&self, item_id: &str, edit: impl FnOnce(&mut ProposalItem)) -> io::Result<()> {
        let mut snapshot = self.read()?;
        edit(snapshot.item_mut(item_id)?);
        self.write(&snapshot)
    }
}

impl SnapshotSource for JsonSnapshotStore {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load_snapshot(&self) -> io::Result<Snapshot> {
        let file = self.read()?;
        let snapshot = Snapshot {
            wbs_nodes: file.ordered_nodes(),
            proposals: file.proposals.clone(),
            linkages: file.resolved_linkages(),
        };
        debug!(
            "dangling linkages: {}",
            snapshot.linkages.iter().filter(|l| l.item.is_none()).count()
        );
        Ok(snapshot)
    }

    fn proposal_items(&self, proposal_id: &str) -> io::Result<Vec<ProposalItem>> {
        let mut items: Vec<ProposalItem> = self
            .read()?
            .proposal_items
            .into_iter()
            .filter(|item| item.proposal_id == proposal_id)
            .collect();
        items.sort_by_key(|item| (item.section_id, item.item_order));
        Ok(items)
    }

    fn find_item(&self, item_id: &str) -> io::Result<Option<ProposalItem>> {
        Ok(self
            .read()?
            .proposal_items
            .into_iter()
            .find(|item| item.id == item_id))
    }
}

impl ItemStore for JsonSnapshotStore {
    fn update_tag(&self, item_id: &str, tag: Option<ItemTag>) -> io::Result<()> {
        debug!("update_tag: item={} tag={:?}", item_id, tag);
        self.update_item(item_id, |item| item.tag = tag)
    }

    fn update_hidden(&self, item_id: &str, hidden: bool) -> io::Result<()> {
        debug!("update_hidden: item={} hidden={}", item_id, hidden);
        self.update_item(item_id, |item| item.hidden_from_equalization = hidden)
    }
}

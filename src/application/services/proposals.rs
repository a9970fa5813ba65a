//! Proposal service
//!
//! Proposal listing, item sheets and reviewer edits on items.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::services::editor::{ItemEdit, ItemEditor};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Proposal, ProposalItem, ProposalSheet};
use crate::infrastructure::traits::{ItemStore, SnapshotSource};

pub struct ProposalService {
    source: Arc<dyn SnapshotSource>,
    store: Arc<dyn ItemStore>,
}

impl ProposalService {
    pub fn new(source: Arc<dyn SnapshotSource>, store: Arc<dyn ItemStore>) -> Self {
        Self { source, store }
    }

    /// Newest first by creation time; undated proposals last in stored order.
    pub fn list(&self) -> ApplicationResult<Vec<Proposal>> {
        let mut proposals = self.source.load_snapshot().with_context("load snapshot")?.proposals;
        proposals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(proposals)
    }

    pub fn get(&self, proposal_id: &str) -> ApplicationResult<Proposal> {
        self.list()?
            .into_iter()
            .find(|p| p.id == proposal_id)
            .ok_or_else(|| ApplicationError::ProposalNotFound(proposal_id.to_string()))
    }

    /// A proposal's items grouped by section.
    #[instrument(level = "debug", skip(self))]
    pub fn sheet(&self, proposal_id: &str) -> ApplicationResult<(Proposal, ProposalSheet)> {
        let proposal = self.get(proposal_id)?;
        let items = self
            .source
            .proposal_items(proposal_id)
            .with_context(&format!("load items of proposal {proposal_id}"))?;
        debug!("sheet: {} items", items.len());
        Ok((proposal, ProposalSheet::from_items(&items)))
    }

    /// Working copy of a proposal's items for optimistic edits.
    pub fn editor(&self, proposal_id: &str) -> ApplicationResult<ItemEditor> {
        let items = self
            .source
            .proposal_items(proposal_id)
            .with_context(&format!("load items of proposal {proposal_id}"))?;
        Ok(ItemEditor::new(Arc::clone(&self.store), items))
    }

    /// Apply a single edit to whichever proposal owns the item.
    #[instrument(level = "debug", skip(self))]
    pub fn edit_item(&self, edit: &ItemEdit) -> ApplicationResult<ProposalItem> {
        let item = self
            .source
            .find_item(edit.item_id())
            .with_context(&format!("look up item {}", edit.item_id()))?
            .ok_or_else(|| ApplicationError::ItemNotFound(edit.item_id().to_string()))?;

        let mut editor = self.editor(&item.proposal_id)?;
        let updated = editor.apply(edit)?.clone();
        Ok(updated)
    }
}

//! Optimistic edits on proposal items
//!
//! An edit is applied to a local copy first and then persisted. A failed
//! write rolls the local copy back to the last confirmed state.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{ItemId, ItemTag, ProposalItem};
use crate::infrastructure::traits::ItemStore;

/// A pending change to one proposal item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemEdit {
    SetTag { item_id: ItemId, tag: Option<ItemTag> },
    SetHidden { item_id: ItemId, hidden: bool },
}

impl ItemEdit {
    pub fn item_id(&self) -> &str {
        match self {
            ItemEdit::SetTag { item_id, .. } | ItemEdit::SetHidden { item_id, .. } => item_id,
        }
    }

    fn apply_to(&self, item: &mut ProposalItem) {
        match self {
            ItemEdit::SetTag { tag, .. } => item.tag = *tag,
            ItemEdit::SetHidden { hidden, .. } => item.hidden_from_equalization = *hidden,
        }
    }

    fn persist(&self, store: &dyn ItemStore) -> std::io::Result<()> {
        match self {
            ItemEdit::SetTag { item_id, tag } => store.update_tag(item_id, *tag),
            ItemEdit::SetHidden { item_id, hidden } => store.update_hidden(item_id, *hidden),
        }
    }
}

/// Local working copy of a proposal's items.
pub struct ItemEditor {
    store: Arc<dyn ItemStore>,
    confirmed: Vec<ProposalItem>,
    local: Vec<ProposalItem>,
}

impl ItemEditor {
    pub fn new(store: Arc<dyn ItemStore>, items: Vec<ProposalItem>) -> Self {
        Self {
            store,
            local: items.clone(),
            confirmed: items,
        }
    }

    /// Items as currently shown, pending edits included.
    pub fn items(&self) -> &[ProposalItem] {
        &self.local
    }

    /// Items as last acknowledged by the store.
    pub fn confirmed(&self) -> &[ProposalItem] {
        &self.confirmed
    }

    pub fn item(&self, item_id: &str) -> Option<&ProposalItem> {
        self.local.iter().find(|item| item.id == item_id)
    }

    /// Apply `edit` locally, then persist it.
    ///
    /// On a store failure every local change since the last confirmed state
    /// is discarded.
    pub fn apply(&mut self, edit: &ItemEdit) -> ApplicationResult<&ProposalItem> {
        let pos = self
            .local
            .iter()
            .position(|item| item.id == edit.item_id())
            .ok_or_else(|| ApplicationError::ItemNotFound(edit.item_id().to_string()))?;

        edit.apply_to(&mut self.local[pos]);
        debug!("apply: {:?}", edit);

        match edit
            .persist(self.store.as_ref())
            .with_context(&format!("update item {}", edit.item_id()))
        {
            Ok(()) => {
                self.confirmed = self.local.clone();
                Ok(&self.local[pos])
            }
            Err(e) => {
                warn!("reverting item {}: {}", edit.item_id(), e);
                self.local = self.confirmed.clone();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingStore {
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl ItemStore for RecordingStore {
        fn update_tag(&self, item_id: &str, tag: Option<ItemTag>) -> io::Result<()> {
            self.calls.lock().unwrap().push(format!("tag {item_id} {tag:?}"));
            if self.fail {
                return Err(io::Error::other("offline"));
            }
            Ok(())
        }

        fn update_hidden(&self, item_id: &str, hidden: bool) -> io::Result<()> {
            self.calls.lock().unwrap().push(format!("hidden {item_id} {hidden}"));
            if self.fail {
                return Err(io::Error::other("offline"));
            }
            Ok(())
        }
    }

    fn items() -> Vec<ProposalItem> {
        vec![
            ProposalItem::new("a", "P1", "concreto", Some(10.0)),
            ProposalItem::new("b", "P1", "aço", Some(20.0)),
        ]
    }

    #[test]
    fn given_working_store_when_tagging_then_confirmed_copy_updated() {
        let store = Arc::new(RecordingStore::default());
        let mut editor = ItemEditor::new(store.clone(), items());

        let edit = ItemEdit::SetTag {
            item_id: "b".into(),
            tag: Some(ItemTag::Estimate),
        };
        let updated = editor.apply(&edit).unwrap();

        assert_eq!(updated.tag, Some(ItemTag::Estimate));
        assert_eq!(editor.confirmed()[1].tag, Some(ItemTag::Estimate));
        assert_eq!(store.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn given_failing_store_when_hiding_then_rolls_back_to_confirmed() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let mut editor = ItemEditor::new(store, items());

        let edit = ItemEdit::SetHidden {
            item_id: "a".into(),
            hidden: true,
        };
        let result = editor.apply(&edit);

        assert!(matches!(result, Err(ApplicationError::OperationFailed { .. })));
        assert!(!editor.item("a").unwrap().hidden_from_equalization);
        assert_eq!(editor.items(), editor.confirmed());
    }

    #[test]
    fn given_unknown_item_when_editing_then_not_found_and_store_untouched() {
        let store = Arc::new(RecordingStore::default());
        let mut editor = ItemEditor::new(store.clone(), items());

        let edit = ItemEdit::SetHidden {
            item_id: "zzz".into(),
            hidden: true,
        };

        assert!(matches!(editor.apply(&edit), Err(ApplicationError::ItemNotFound(id)) if id == "zzz"));
        assert!(store.calls.lock().unwrap().is_empty());
    }
}

//! A single proposal's item sheet, grouped by section.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::entities::ProposalItem;

/// Section key for items that carry none.
const NO_SECTION: i64 = 0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub section_id: i64,
    pub section_name: String,
    pub section_total: Option<f64>,
    pub items: Vec<ProposalItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProposalSheet {
    pub sections: Vec<Section>,
}

impl ProposalSheet {
    /// Group items by section id, ascending.
    ///
    /// Name and total of a section come from its first item. Items without a
    /// description are left out of the listing; their section still shows.
    pub fn from_items(items: &[ProposalItem]) -> Self {
        let mut sections: BTreeMap<i64, Section> = BTreeMap::new();
        for item in items {
            let key = item.section_id.unwrap_or(NO_SECTION);
            let section = sections.entry(key).or_insert_with(|| Section {
                section_id: key,
                section_name: item.section_name.clone().unwrap_or_default(),
                section_total: item.section_total,
                items: Vec::new(),
            });
            if item.description.as_deref().is_some_and(|d| !d.is_empty()) {
                section.items.push(item.clone());
            }
        }
        Self {
            sections: sections.into_values().collect(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    pub fn find_item(&self, item_id: &str) -> Option<&ProposalItem> {
        self.sections
            .iter()
            .flat_map(|s| s.items.iter())
            .find(|item| item.id == item_id)
    }
}

//! Domain entities: reference WBS, proposals and their line items

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type WbsId = String;
pub type ProposalId = String;
pub type ItemId = String;

/// Contractor name shown when a proposal has none.
pub const UNNAMED_CONTRACTOR: &str = "Sem nome";

/// One node of the standard work breakdown structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WbsNode {
    pub id: WbsId,
    /// Display code, e.g. "1.2.3"
    #[serde(rename = "caminho")]
    pub code: String,
    #[serde(rename = "item")]
    pub label: String,
    /// Depth level, 1 = root level
    #[serde(rename = "nivel")]
    pub level: u32,
    #[serde(default)]
    pub parent_id: Option<WbsId>,
    /// Externally supplied display order
    #[serde(rename = "caminho_sort", default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
}

impl WbsNode {
    pub fn new(id: &str, code: &str, label: &str, level: u32, parent_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            code: code.to_string(),
            label: label.to_string(),
            level,
            parent_id: parent_id.map(str::to_string),
            sort_key: None,
        }
    }
}

/// A contractor's priced bid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    #[serde(
        rename = "construtora_nome",
        default = "unnamed_contractor",
        deserialize_with = "contractor_or_default"
    )]
    pub contractor_name: String,
    #[serde(rename = "valor_total", default)]
    pub declared_total: f64,
    /// Review state as stored, e.g. "pendente", "aprovada"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "data_referencia", default, skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<NaiveDate>,
    #[serde(rename = "obra_nome", default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Proposal {
    pub fn new(id: &str, contractor_name: &str, declared_total: f64) -> Self {
        Self {
            id: id.to_string(),
            contractor_name: contractor_name.to_string(),
            declared_total,
            status: None,
            reference_date: None,
            site_name: None,
            created_at: None,
        }
    }
}

fn unnamed_contractor() -> String {
    UNNAMED_CONTRACTOR.to_string()
}

fn contractor_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let name: Option<String> = Option::deserialize(deserializer)?;
    Ok(name.unwrap_or_else(unnamed_contractor))
}

/// Classification tag a reviewer can put on a proposal item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemTag {
    #[serde(rename = "cortesia")]
    Courtesy,
    #[serde(rename = "estimativa")]
    Estimate,
    #[serde(rename = "estimativa + pendência")]
    EstimatePending,
    #[serde(rename = "não cotado + sob demanda")]
    NotQuotedOnDemand,
    #[serde(rename = "não cotado + pendência")]
    NotQuotedPending,
    #[serde(rename = "opcional")]
    Optional,
    #[serde(rename = "opcional + revisar escopo")]
    OptionalReviewScope,
    #[serde(rename = "revisar escopo")]
    ReviewScope,
    #[serde(rename = "condicional")]
    Conditional,
}

impl ItemTag {
    pub const ALL: [ItemTag; 9] = [
        ItemTag::Courtesy,
        ItemTag::Estimate,
        ItemTag::EstimatePending,
        ItemTag::NotQuotedOnDemand,
        ItemTag::NotQuotedPending,
        ItemTag::Optional,
        ItemTag::OptionalReviewScope,
        ItemTag::ReviewScope,
        ItemTag::Conditional,
    ];

    /// Stored value.
    pub fn as_str(self) -> &'static str {
        match self {
            ItemTag::Courtesy => "cortesia",
            ItemTag::Estimate => "estimativa",
            ItemTag::EstimatePending => "estimativa + pendência",
            ItemTag::NotQuotedOnDemand => "não cotado + sob demanda",
            ItemTag::NotQuotedPending => "não cotado + pendência",
            ItemTag::Optional => "opcional",
            ItemTag::OptionalReviewScope => "opcional + revisar escopo",
            ItemTag::ReviewScope => "revisar escopo",
            ItemTag::Conditional => "condicional",
        }
    }

    /// Shell friendly spelling, accepted by `FromStr`.
    pub fn slug(self) -> &'static str {
        match self {
            ItemTag::Courtesy => "cortesia",
            ItemTag::Estimate => "estimativa",
            ItemTag::EstimatePending => "estimativa-pendencia",
            ItemTag::NotQuotedOnDemand => "nao-cotado-sob-demanda",
            ItemTag::NotQuotedPending => "nao-cotado-pendencia",
            ItemTag::Optional => "opcional",
            ItemTag::OptionalReviewScope => "opcional-revisar-escopo",
            ItemTag::ReviewScope => "revisar-escopo",
            ItemTag::Conditional => "condicional",
        }
    }
}

impl fmt::Display for ItemTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown item tag: {}", self.0)
    }
}

impl std::error::Error for UnknownTag {}

impl FromStr for ItemTag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ItemTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == needle || tag.slug() == needle)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

/// One line item of a proposal.
///
/// Only `id`, `proposal_id`, the subtotal and the two review fields take part
/// in aggregation; the remaining fields are carried for the detail and sheet
/// views.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProposalItem {
    pub id: ItemId,
    #[serde(rename = "proposta_id")]
    pub proposal_id: ProposalId,
    #[serde(rename = "item_description", default)]
    pub description: Option<String>,
    #[serde(rename = "item_total_price_subtotal", default)]
    pub total_price_subtotal: Option<f64>,
    #[serde(default)]
    pub tag: Option<ItemTag>,
    #[serde(default)]
    pub hidden_from_equalization: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_code: Option<String>,
    #[serde(rename = "item_quantity", default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(rename = "item_unit", default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "item_unit_price_material", default, skip_serializing_if = "Option::is_none")]
    pub unit_price_material: Option<f64>,
    #[serde(rename = "item_unit_price_labor", default, skip_serializing_if = "Option::is_none")]
    pub unit_price_labor: Option<f64>,
    #[serde(rename = "item_total_price_material", default, skip_serializing_if = "Option::is_none")]
    pub total_price_material: Option<f64>,
    #[serde(rename = "item_total_price_labor", default, skip_serializing_if = "Option::is_none")]
    pub total_price_labor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_order: Option<i64>,
}

impl ProposalItem {
    pub fn new(id: &str, proposal_id: &str, description: &str, subtotal: Option<f64>) -> Self {
        Self {
            id: id.to_string(),
            proposal_id: proposal_id.to_string(),
            description: Some(description.to_string()),
            total_price_subtotal: subtotal,
            ..Default::default()
        }
    }

    /// Subtotal with a missing value counted as zero.
    pub fn subtotal(&self) -> f64 {
        self.total_price_subtotal.unwrap_or(0.0)
    }
}

/// Sum of item subtotals, null subtotals count as zero.
pub fn sum_subtotals<'a, I>(items: I) -> f64
where
    I: IntoIterator<Item = &'a ProposalItem>,
{
    items.into_iter().map(ProposalItem::subtotal).sum()
}

/// Link between a WBS node and a proposal item.
///
/// `item` is `None` when the referenced proposal item no longer resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkageRow {
    pub wbs_id: WbsId,
    pub item: Option<ProposalItem>,
}

impl LinkageRow {
    pub fn new(wbs_id: &str, item: Option<ProposalItem>) -> Self {
        Self {
            wbs_id: wbs_id.to_string(),
            item,
        }
    }

    /// The linked item, unless it is unresolved or excluded from comparison.
    pub fn comparable_item(&self) -> Option<&ProposalItem> {
        self.item
            .as_ref()
            .filter(|item| !item.hidden_from_equalization)
    }
}

/// Items one proposal links directly to one node, with their total.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValueRecord {
    pub items: Vec<ProposalItem>,
    pub total: f64,
}

impl ValueRecord {
    pub fn from_items(items: Vec<ProposalItem>) -> Self {
        let total = sum_subtotals(&items);
        Self { items, total }
    }

    pub fn has_value(&self) -> bool {
        self.total > 0.0
    }
}

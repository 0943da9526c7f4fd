//! # Estimate Model
//!
//! Line items, their measurements, and the estimate that owns them.
//!
//! Every line item carries a cached `totalAmount`. The cache is private:
//! the only way to change a priced field is [`LineItem::apply`], which
//! re-prices the item before returning it. Estimates follow the same rule
//! for their grand total. A value of either type read from JSON is
//! re-priced on the way in, so a stale stored total never leaks through.

pub mod lenient;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EstimateError, Result};
use crate::pricing;
use crate::sections::{self, CellFormat, ExportEstimate};
use crate::totals::Totals;

/// Tolerance for comparing a stored total against a recomputed one.
const TOTAL_TOLERANCE: f64 = 0.005;

/// One rectangular patch of an area item, in centimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(
        default,
        deserialize_with = "lenient::option_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub length: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::option_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub breadth: Option<f64>,
}

impl Measurement {
    pub fn new(length: f64, breadth: f64) -> Self {
        Self {
            length: Some(length),
            breadth: Some(breadth),
        }
    }
}

/// One linear segment of a running item, in centimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningMeasurement {
    #[serde(
        default,
        deserialize_with = "lenient::option_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub length: Option<f64>,
}

impl RunningMeasurement {
    pub fn new(length: f64) -> Self {
        Self {
            length: Some(length),
        }
    }
}

/// The unit a line item is measured and priced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Square feet, from length x breadth patches.
    Area,
    /// A plain count.
    Pieces,
    /// Running feet, from linear segments.
    Running,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Area => "area",
            ItemType::Pieces => "pieces",
            ItemType::Running => "running",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "area" => Ok(ItemType::Area),
            "pieces" => Ok(ItemType::Pieces),
            "running" => Ok(ItemType::Running),
            _ => Err(EstimateError::UnsupportedItemType(s.to_string())),
        }
    }
}

/// Type-specific quantity fields of a line item.
#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    Area {
        length: Option<f64>,
        breadth: Option<f64>,
        measurements: Vec<Measurement>,
    },
    Pieces {
        pieces: u32,
    },
    Running {
        running_length: Option<f64>,
        running_measurements: Vec<RunningMeasurement>,
    },
}

impl Quantity {
    /// A quantity of the given type with nothing entered yet.
    pub fn empty(item_type: ItemType) -> Self {
        match item_type {
            ItemType::Area => Quantity::Area {
                length: None,
                breadth: None,
                measurements: Vec::new(),
            },
            ItemType::Pieces => Quantity::Pieces { pieces: 0 },
            ItemType::Running => Quantity::Running {
                running_length: None,
                running_measurements: Vec::new(),
            },
        }
    }

    pub fn area(length: f64, breadth: f64) -> Self {
        Quantity::Area {
            length: Some(length),
            breadth: Some(breadth),
            measurements: Vec::new(),
        }
    }

    pub fn pieces(pieces: u32) -> Self {
        Quantity::Pieces { pieces }
    }

    pub fn running(length: f64) -> Self {
        Quantity::Running {
            running_length: Some(length),
            running_measurements: Vec::new(),
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            Quantity::Area { .. } => ItemType::Area,
            Quantity::Pieces { .. } => ItemType::Pieces,
            Quantity::Running { .. } => ItemType::Running,
        }
    }
}

/// A single change to a line item, as produced by one form interaction.
///
/// Edits that don't match the item's type (say, a breadth on a running
/// item) are ignored rather than rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEdit {
    SetAmountPerUnit(Option<f64>),
    SetMaterial(String),
    SetDescription(String),
    /// Switch unit. Clears the quantity unless the type is unchanged.
    ChangeType(ItemType),
    SetLength(Option<f64>),
    SetBreadth(Option<f64>),
    AddMeasurement(Measurement),
    UpdateMeasurement {
        index: usize,
        measurement: Measurement,
    },
    RemoveMeasurement(usize),
    SetPieces(u32),
    SetRunningLength(Option<f64>),
    AddRunningMeasurement(RunningMeasurement),
    UpdateRunningMeasurement {
        index: usize,
        measurement: RunningMeasurement,
    },
    RemoveRunningMeasurement(usize),
}

/// A priced line of an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LineItemRecord", into = "LineItemRecord")]
pub struct LineItem {
    pub id: String,
    pub category_name: String,
    pub subcategory_name: String,
    pub material_name: String,
    pub description: String,
    amount_per_unit: Option<f64>,
    quantity: Quantity,
    total_amount: f64,
}

impl LineItem {
    pub fn new(id: impl Into<String>, quantity: Quantity, amount_per_unit: f64) -> Self {
        let mut item = Self {
            id: id.into(),
            category_name: String::new(),
            subcategory_name: String::new(),
            material_name: String::new(),
            description: String::new(),
            amount_per_unit: Some(amount_per_unit),
            quantity,
            total_amount: 0.0,
        };
        item.reprice();
        item
    }

    /// Seed an unmeasured item from a catalog section.
    pub fn from_catalog(id: impl Into<String>, entry: &CatalogEntry) -> Self {
        let mut item = Self {
            id: id.into(),
            category_name: entry.category.clone(),
            subcategory_name: entry.subcategory.clone(),
            material_name: entry.section.material.clone(),
            description: entry.section.description.clone(),
            amount_per_unit: entry.section.unit_price,
            quantity: Quantity::empty(entry.section.item_type),
            total_amount: 0.0,
        };
        item.reprice();
        item
    }

    pub fn with_category(
        mut self,
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Self {
        self.category_name = category.into();
        self.subcategory_name = subcategory.into();
        self
    }

    pub fn with_material(mut self, material: impl Into<String>, description: impl Into<String>) -> Self {
        self.material_name = material.into();
        self.description = description.into();
        self
    }

    pub fn amount_per_unit(&self) -> Option<f64> {
        self.amount_per_unit
    }

    pub fn quantity(&self) -> &Quantity {
        &self.quantity
    }

    pub fn item_type(&self) -> ItemType {
        self.quantity.item_type()
    }

    /// The cached price of this line.
    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    /// Apply one edit and return the re-priced item.
    pub fn apply(mut self, edit: ItemEdit) -> Self {
        match (edit, &mut self.quantity) {
            (ItemEdit::SetAmountPerUnit(rate), _) => self.amount_per_unit = rate,
            (ItemEdit::SetMaterial(material), _) => self.material_name = material,
            (ItemEdit::SetDescription(description), _) => self.description = description,
            (ItemEdit::ChangeType(item_type), quantity) => {
                if quantity.item_type() != item_type {
                    *quantity = Quantity::empty(item_type);
                }
            }
            (ItemEdit::SetLength(v), Quantity::Area { length, .. }) => *length = v,
            (ItemEdit::SetBreadth(v), Quantity::Area { breadth, .. }) => *breadth = v,
            (ItemEdit::AddMeasurement(m), Quantity::Area { measurements, .. }) => {
                measurements.push(m)
            }
            (
                ItemEdit::UpdateMeasurement { index, measurement },
                Quantity::Area { measurements, .. },
            ) => {
                if let Some(slot) = measurements.get_mut(index) {
                    *slot = measurement;
                }
            }
            (ItemEdit::RemoveMeasurement(index), Quantity::Area { measurements, .. }) => {
                if index < measurements.len() {
                    measurements.remove(index);
                }
            }
            (ItemEdit::SetPieces(n), Quantity::Pieces { pieces }) => *pieces = n,
            (ItemEdit::SetRunningLength(v), Quantity::Running { running_length, .. }) => {
                *running_length = v
            }
            (
                ItemEdit::AddRunningMeasurement(m),
                Quantity::Running {
                    running_measurements,
                    ..
                },
            ) => running_measurements.push(m),
            (
                ItemEdit::UpdateRunningMeasurement { index, measurement },
                Quantity::Running {
                    running_measurements,
                    ..
                },
            ) => {
                if let Some(slot) = running_measurements.get_mut(index) {
                    *slot = measurement;
                }
            }
            (
                ItemEdit::RemoveRunningMeasurement(index),
                Quantity::Running {
                    running_measurements,
                    ..
                },
            ) => {
                if index < running_measurements.len() {
                    running_measurements.remove(index);
                }
            }
            (edit, quantity) => {
                tracing::debug!(
                    item = %self.id,
                    item_type = %quantity.item_type(),
                    ?edit,
                    "edit does not apply to this item type, ignored"
                );
            }
        }
        self.reprice();
        self
    }

    /// The single writer of `total_amount`.
    fn reprice(&mut self) {
        self.total_amount = pricing::price_quantity(&self.quantity, self.amount_per_unit);
    }
}

/// The persisted shape of a line item.
///
/// Type-specific fields sit side by side, keyed by the lowercase `type`
/// tag. Only the fields belonging to the item's type are written back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub subcategory_name: String,
    #[serde(default)]
    pub material_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(
        default,
        deserialize_with = "lenient::option_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount_per_unit: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::option_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub length: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::option_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub breadth: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub measurements: Vec<Measurement>,
    #[serde(
        default,
        deserialize_with = "lenient::option_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub pieces: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient::option_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub running_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub running_measurements: Vec<RunningMeasurement>,
    #[serde(default, deserialize_with = "lenient::option_f64")]
    pub total_amount: Option<f64>,
}

impl TryFrom<LineItemRecord> for LineItem {
    type Error = EstimateError;

    fn try_from(record: LineItemRecord) -> Result<Self> {
        let quantity = match record.item_type.parse::<ItemType>()? {
            ItemType::Area => Quantity::Area {
                length: record.length,
                breadth: record.breadth,
                measurements: record.measurements,
            },
            ItemType::Pieces => Quantity::Pieces {
                pieces: record.pieces.unwrap_or(0),
            },
            ItemType::Running => Quantity::Running {
                running_length: record.running_length,
                running_measurements: record.running_measurements,
            },
        };

        let mut item = LineItem {
            id: record.id,
            category_name: record.category_name,
            subcategory_name: record.subcategory_name,
            material_name: record.material_name,
            description: record.description,
            amount_per_unit: record.amount_per_unit,
            quantity,
            total_amount: 0.0,
        };
        item.reprice();

        if let Some(stored) = record.total_amount {
            if (stored - item.total_amount).abs() > TOTAL_TOLERANCE {
                warn!(
                    item = %item.id,
                    stored,
                    recomputed = item.total_amount,
                    "stored line total is stale, using recomputed value"
                );
            }
        }

        Ok(item)
    }
}

impl From<LineItem> for LineItemRecord {
    fn from(item: LineItem) -> Self {
        let mut record = LineItemRecord {
            id: item.id,
            category_name: item.category_name,
            subcategory_name: item.subcategory_name,
            material_name: item.material_name,
            description: item.description,
            item_type: item.quantity.item_type().as_str().to_string(),
            amount_per_unit: item.amount_per_unit,
            total_amount: Some(item.total_amount),
            ..Default::default()
        };
        match item.quantity {
            Quantity::Area {
                length,
                breadth,
                measurements,
            } => {
                record.length = length;
                record.breadth = breadth;
                record.measurements = measurements;
            }
            Quantity::Pieces { pieces } => record.pieces = Some(pieces),
            Quantity::Running {
                running_length,
                running_measurements,
            } => {
                record.running_length = running_length;
                record.running_measurements = running_measurements;
            }
        }
        record
    }
}

/// One priced section of the contractor's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub category: String,
    pub subcategory: String,
    pub section: CatalogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSection {
    pub material: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient::option_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit_price: Option<f64>,
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

/// How an estimate's `discount` is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount` is a percentage of the subtotal.
    #[default]
    Percentage,
    /// `discount` is an absolute amount.
    Fixed,
}

/// A priced estimate: ordered items plus a discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EstimateRecord", into = "EstimateRecord")]
pub struct Estimate {
    pub id: String,
    pub client_name: String,
    pub client_address: String,
    pub client_phone: String,
    pub date: String,
    pub notes: String,
    items: Vec<LineItem>,
    discount: f64,
    discount_type: DiscountType,
    total_amount: f64,
}

impl Estimate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client_name: String::new(),
            client_address: String::new(),
            client_phone: String::new(),
            date: String::new(),
            notes: String::new(),
            items: Vec::new(),
            discount: 0.0,
            discount_type: DiscountType::default(),
            total_amount: 0.0,
        }
    }

    /// Parse a persisted estimate record.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn discount_type(&self) -> DiscountType {
        self.discount_type
    }

    /// The cached grand total.
    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    /// Subtotal, discount amount and grand total for the current items.
    pub fn totals(&self) -> Totals {
        Totals::for_items(&self.items, self.discount, self.discount_type)
    }

    pub fn push_item(&mut self, item: LineItem) {
        self.items.push(item);
        self.recalculate();
    }

    /// Apply an edit to the item with the given id. Returns false when no
    /// such item exists.
    pub fn update_item(&mut self, id: &str, edit: ItemEdit) -> bool {
        let Some(pos) = self.items.iter().position(|item| item.id == id) else {
            return false;
        };
        let item = self.items.remove(pos);
        self.items.insert(pos, item.apply(edit));
        self.recalculate();
        true
    }

    pub fn remove_item(&mut self, id: &str) -> Option<LineItem> {
        let pos = self.items.iter().position(|item| item.id == id)?;
        let removed = self.items.remove(pos);
        self.recalculate();
        Some(removed)
    }

    /// Set the discount. Values are stored as given: a percentage above 100
    /// or a fixed amount above the subtotal drives the total negative.
    pub fn set_discount(&mut self, discount: f64, discount_type: DiscountType) {
        self.discount = pricing::units::finite_or_zero(discount);
        self.discount_type = discount_type;
        self.recalculate();
    }

    /// The single writer of the cached grand total.
    fn recalculate(&mut self) {
        self.total_amount = self.totals().grand_total;
    }

    /// Check the estimate for export and organize it into document sections.
    ///
    /// This is the boundary between tolerant editing and strict rendering:
    /// every structural failure an export can hit is raised here.
    pub fn prepare_export(&self, format: &CellFormat) -> Result<ExportEstimate<'_>> {
        if self.items.is_empty() {
            return Err(EstimateError::NoItems);
        }
        if let Some(bad) = self.items.iter().find(|item| !item.total_amount.is_finite()) {
            return Err(EstimateError::InvalidTotal(format!("item {}", bad.id)));
        }

        let totals = self.totals();
        if !(totals.subtotal.is_finite()
            && totals.discount_amount.is_finite()
            && totals.grand_total.is_finite())
        {
            return Err(EstimateError::InvalidTotal(format!("estimate {}", self.id)));
        }

        let categories = sections::organize(&self.items)
            .into_iter()
            .map(|category| category.into_block(format))
            .collect::<Result<Vec<_>>>()?;

        Ok(ExportEstimate {
            estimate: self,
            totals,
            categories,
        })
    }
}

/// The persisted shape of an estimate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_address: String,
    #[serde(default)]
    pub client_phone: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub discount: f64,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default, deserialize_with = "lenient::option_f64")]
    pub total_amount: Option<f64>,
}

impl From<EstimateRecord> for Estimate {
    fn from(record: EstimateRecord) -> Self {
        let mut estimate = Estimate {
            id: record.id,
            client_name: record.client_name,
            client_address: record.client_address,
            client_phone: record.client_phone,
            date: record.date,
            notes: record.notes,
            items: record.items,
            discount: record.discount,
            discount_type: record.discount_type,
            total_amount: 0.0,
        };
        estimate.recalculate();

        if let Some(stored) = record.total_amount {
            if (stored - estimate.total_amount).abs() > TOTAL_TOLERANCE {
                warn!(
                    estimate = %estimate.id,
                    stored,
                    recomputed = estimate.total_amount,
                    "stored estimate total is stale, using recomputed value"
                );
            }
        }
        estimate
    }
}

impl From<Estimate> for EstimateRecord {
    fn from(estimate: Estimate) -> Self {
        EstimateRecord {
            id: estimate.id,
            client_name: estimate.client_name,
            client_address: estimate.client_address,
            client_phone: estimate.client_phone,
            date: estimate.date,
            notes: estimate.notes,
            items: estimate.items,
            discount: estimate.discount,
            discount_type: estimate.discount_type,
            total_amount: Some(estimate.total_amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn wardrobe() -> LineItem {
        LineItem::new("w1", Quantity::area(300.0, 200.0), 50.0)
            .with_category("Bedroom", "Wardrobe")
            .with_material("Plywood", "18mm BWP")
    }

    #[test]
    fn new_item_is_priced() {
        assert_eq!(wardrobe().total_amount(), 3250.0);
    }

    #[test]
    fn edits_reprice() {
        let item = wardrobe().apply(ItemEdit::SetAmountPerUnit(Some(100.0)));
        assert_eq!(item.total_amount(), 6500.0);

        let item = item.apply(ItemEdit::AddMeasurement(Measurement::new(100.0, 92.903)));
        // 64.58 + 10.0 = 74.58 -> 75
        assert_eq!(item.total_amount(), 7500.0);

        let item = item.apply(ItemEdit::RemoveMeasurement(0));
        assert_eq!(item.total_amount(), 6500.0);
    }

    #[test]
    fn cleared_field_prices_to_zero() {
        let item = wardrobe().apply(ItemEdit::SetBreadth(None));
        assert_eq!(item.total_amount(), 0.0);
        let item = wardrobe().apply(ItemEdit::SetAmountPerUnit(None));
        assert_eq!(item.total_amount(), 0.0);
    }

    #[test]
    fn mismatched_edit_is_ignored() {
        let item = wardrobe();
        let edited = item.clone().apply(ItemEdit::SetPieces(9));
        assert_eq!(edited, item);
    }

    #[test]
    fn change_type_resets_quantity() {
        let item = wardrobe().apply(ItemEdit::ChangeType(ItemType::Pieces));
        assert_eq!(item.quantity(), &Quantity::Pieces { pieces: 0 });
        assert_eq!(item.total_amount(), 0.0);
        let item = item.apply(ItemEdit::SetPieces(4));
        assert_eq!(item.total_amount(), 200.0);
    }

    #[test]
    fn item_type_parsing() {
        assert_eq!("Area".parse::<ItemType>().unwrap(), ItemType::Area);
        assert_eq!(" running ".parse::<ItemType>().unwrap(), ItemType::Running);
        assert!(matches!(
            "volume".parse::<ItemType>(),
            Err(EstimateError::UnsupportedItemType(t)) if t == "volume"
        ));
    }

    #[test]
    fn record_with_unknown_type_is_rejected() {
        let err = serde_json::from_value::<LineItem>(json!({
            "id": "x", "type": "volume", "amountPerUnit": 10
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unsupported item type"));
    }

    #[test]
    fn record_recomputes_stale_total() {
        let item: LineItem = serde_json::from_value(json!({
            "id": "p1",
            "type": "pieces",
            "pieces": "4",
            "amountPerUnit": 250,
            "totalAmount": 1
        }))
        .unwrap();
        assert_eq!(item.total_amount(), 1000.0);
    }

    #[test]
    fn record_only_writes_own_type_fields() {
        let value = serde_json::to_value(LineItem::new("r1", Quantity::running(1000.0), 100.0)).unwrap();
        assert_eq!(value["type"], "running");
        assert_eq!(value["runningLength"], 1000.0);
        assert!(value.get("breadth").is_none());
        assert!(value.get("pieces").is_none());
    }

    #[test]
    fn estimate_tracks_grand_total() {
        let mut estimate = Estimate::new("e1");
        estimate.push_item(wardrobe());
        estimate.push_item(LineItem::new("p1", Quantity::pieces(4), 250.0));
        assert_eq!(estimate.total_amount(), 4250.0);

        estimate.set_discount(10.0, DiscountType::Percentage);
        assert_eq!(estimate.total_amount(), 3825.0);

        assert!(estimate.update_item("p1", ItemEdit::SetPieces(8)));
        assert_eq!(estimate.total_amount(), 4725.0);

        assert!(!estimate.update_item("missing", ItemEdit::SetPieces(1)));
        assert!(estimate.remove_item("w1").is_some());
        assert_eq!(estimate.total_amount(), 1800.0);
    }

    #[test]
    fn catalog_seeds_empty_item() {
        let entry: CatalogEntry = serde_json::from_value(json!({
            "category": "Kitchen",
            "subcategory": "Shutters",
            "section": { "material": "Acrylic", "unitPrice": "850", "type": "area" }
        }))
        .unwrap();
        let item = LineItem::from_catalog("k1", &entry);
        assert_eq!(item.item_type(), ItemType::Area);
        assert_eq!(item.amount_per_unit(), Some(850.0));
        assert_eq!(item.total_amount(), 0.0);
        assert_eq!(item.category_name, "Kitchen");
    }

    #[test]
    fn export_rejects_empty_estimate() {
        let estimate = Estimate::new("empty");
        assert!(matches!(
            estimate.prepare_export(&CellFormat::default()),
            Err(EstimateError::NoItems)
        ));
    }
}

//! # Document Sections
//!
//! Groups line items into category → subcategory sections and turns each
//! subcategory into a table of display strings.
//!
//! Grouping is a single pass that keeps first-seen order for both levels.
//! Each subcategory becomes exactly one table whose columns are the union
//! of what its members need, so a subcategory mixing area and piece items
//! still gets every column either of them uses.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::DocumentConfig;
use crate::error::{EstimateError, Result};
use crate::model::{Estimate, ItemType, LineItem, Quantity};
use crate::pricing::aggregate::{area_entries, running_entries};
use crate::pricing::{aggregate_quantity, AreaRounding};
use crate::style::TextAlign;
use crate::totals::Totals;

/// Which printable document is being produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Estimate,
    Invoice,
    Receipt,
}

impl DocumentKind {
    pub fn title(self) -> &'static str {
        match self {
            DocumentKind::Estimate => "ESTIMATE",
            DocumentKind::Invoice => "INVOICE",
            DocumentKind::Receipt => "RECEIPT",
        }
    }

    /// Decimal places used for money on this kind of document.
    pub fn money_decimals(self) -> usize {
        match self {
            DocumentKind::Estimate | DocumentKind::Invoice => 2,
            DocumentKind::Receipt => 1,
        }
    }
}

impl FromStr for DocumentKind {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "estimate" => Ok(DocumentKind::Estimate),
            "invoice" => Ok(DocumentKind::Invoice),
            "receipt" => Ok(DocumentKind::Receipt),
            other => Err(EstimateError::Config(format!(
                "unknown document kind '{}'",
                other
            ))),
        }
    }
}

/// How numbers are turned into cell text.
#[derive(Debug, Clone, PartialEq)]
pub struct CellFormat {
    pub currency_symbol: String,
    pub money_decimals: usize,
    pub area_rounding: AreaRounding,
}

impl Default for CellFormat {
    fn default() -> Self {
        Self {
            currency_symbol: "Rs. ".to_string(),
            money_decimals: 2,
            area_rounding: AreaRounding::Whole,
        }
    }
}

impl CellFormat {
    pub fn for_document(config: &DocumentConfig, kind: DocumentKind) -> Self {
        Self {
            currency_symbol: config.currency_symbol.clone(),
            money_decimals: kind.money_decimals(),
            area_rounding: config.area_display_rounding,
        }
    }

    pub fn money(&self, value: f64) -> String {
        let prec = self.money_decimals;
        if value < 0.0 {
            format!("-{}{:.prec$}", self.currency_symbol, -value)
        } else {
            format!("{}{:.prec$}", self.currency_symbol, value)
        }
    }
}

/// A measurement in cm: whole numbers print bare, others to two places.
pub fn format_measure(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            if (v - v.round()).abs() < 1e-9 {
                format!("{:.0}", v)
            } else {
                let s = format!("{:.2}", v);
                s.trim_end_matches('0').trim_end_matches('.').to_string()
            }
        }
        _ => "-".to_string(),
    }
}

/// Feet truncated (not rounded) to two places. The nudge keeps values that
/// are exact hundredths from landing one below after unit conversion.
pub fn format_feet(value: f64) -> String {
    format!("{:.2}", (value * 100.0 + 1e-9).trunc() / 100.0)
}

const EMPTY_CELL: &str = "-";

/// A column an item table may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Serial,
    Material,
    Description,
    Length,
    Breadth,
    SqFeet,
    Pieces,
    RunningFeet,
    Rate,
    Amount,
}

impl Column {
    pub fn title(self) -> &'static str {
        match self {
            Column::Serial => "#",
            Column::Material => "Material",
            Column::Description => "Description",
            Column::Length => "Length (cm)",
            Column::Breadth => "Breadth (cm)",
            Column::SqFeet => "Sq. Ft",
            Column::Pieces => "Pieces",
            Column::RunningFeet => "Rn. Ft",
            Column::Rate => "Rate",
            Column::Amount => "Amount",
        }
    }

    /// Relative width before normalization.
    fn weight(self) -> f64 {
        match self {
            Column::Serial => 0.4,
            Column::Material => 1.5,
            Column::Description => 2.4,
            Column::Length | Column::Breadth => 1.0,
            Column::SqFeet | Column::Pieces | Column::RunningFeet => 0.8,
            Column::Rate => 1.1,
            Column::Amount => 1.3,
        }
    }

    pub fn align(self) -> TextAlign {
        match self {
            Column::Material | Column::Description => TextAlign::Left,
            Column::Serial => TextAlign::Center,
            _ => TextAlign::Right,
        }
    }
}

/// The optional column groups a table needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnSet {
    pub area: bool,
    pub pieces: bool,
    pub running: bool,
}

impl ColumnSet {
    /// Union of the columns every member needs.
    pub fn for_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a LineItem>,
    {
        items.into_iter().fold(ColumnSet::default(), |mut set, item| {
            match item.item_type() {
                ItemType::Area => set.area = true,
                ItemType::Pieces => set.pieces = true,
                ItemType::Running => set.running = true,
            }
            set
        })
    }

    pub fn columns(&self) -> Vec<Column> {
        let mut columns = vec![Column::Serial, Column::Material, Column::Description];
        if self.area || self.running {
            columns.push(Column::Length);
        }
        if self.area {
            columns.push(Column::Breadth);
            columns.push(Column::SqFeet);
        }
        if self.pieces {
            columns.push(Column::Pieces);
        }
        if self.running {
            columns.push(Column::RunningFeet);
        }
        columns.push(Column::Rate);
        columns.push(Column::Amount);
        columns
    }
}

/// A table ready for layout: columns plus rows of cell text. Cells may
/// contain `\n` to stack several measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl ItemTable {
    /// Column widths as fractions of the table width, summing to one.
    pub fn fractions(&self) -> Vec<f64> {
        let total: f64 = self.columns.iter().map(|c| c.weight()).sum();
        self.columns.iter().map(|c| c.weight() / total).collect()
    }

    pub fn header(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.title().to_string()).collect()
    }
}

/// Items of one subcategory, in encounter order.
#[derive(Debug, Clone)]
pub struct SubcategorySection<'a> {
    pub name: &'a str,
    pub items: Vec<&'a LineItem>,
}

/// Subcategories of one category, in encounter order.
#[derive(Debug, Clone)]
pub struct CategorySection<'a> {
    pub name: &'a str,
    pub subcategories: Vec<SubcategorySection<'a>>,
}

/// Group items by category, then subcategory, keeping first-seen order.
pub fn organize(items: &[LineItem]) -> Vec<CategorySection<'_>> {
    let mut categories: Vec<CategorySection<'_>> = Vec::new();

    for item in items {
        let ci = match categories
            .iter()
            .position(|c| c.name == item.category_name)
        {
            Some(i) => i,
            None => {
                categories.push(CategorySection {
                    name: &item.category_name,
                    subcategories: Vec::new(),
                });
                categories.len() - 1
            }
        };

        let subcategories = &mut categories[ci].subcategories;
        match subcategories
            .iter_mut()
            .find(|s| s.name == item.subcategory_name)
        {
            Some(sub) => sub.items.push(item),
            None => subcategories.push(SubcategorySection {
                name: &item.subcategory_name,
                items: vec![item],
            }),
        }
    }

    categories
}

/// Build the table for one subcategory. An empty group is a bug upstream
/// and fails loudly instead of producing a blank table.
pub fn build_table(
    category: &str,
    section: &SubcategorySection<'_>,
    format: &CellFormat,
) -> Result<ItemTable> {
    if section.items.is_empty() {
        return Err(EstimateError::EmptyGroup {
            category: category.to_string(),
            subcategory: section.name.to_string(),
        });
    }

    let columns = ColumnSet::for_items(section.items.iter().copied()).columns();
    let rows = section
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            columns
                .iter()
                .map(|&column| cell_text(i + 1, item, column, format))
                .collect()
        })
        .collect();

    Ok(ItemTable { columns, rows })
}

fn cell_text(serial: usize, item: &LineItem, column: Column, format: &CellFormat) -> String {
    let quantity = item.quantity();
    match (column, quantity) {
        (Column::Serial, _) => serial.to_string(),
        (Column::Material, _) => item.material_name.clone(),
        (Column::Description, _) => item.description.clone(),
        (Column::Rate, _) => format.money(item.amount_per_unit().unwrap_or(0.0)),
        (Column::Amount, _) => format.money(item.total_amount()),

        (
            Column::Length,
            Quantity::Area {
                length,
                breadth,
                measurements,
            },
        ) => stacked(
            area_entries(*length, *breadth, measurements)
                .iter()
                .map(|e| format_measure(e.length)),
        ),
        (
            Column::Breadth,
            Quantity::Area {
                length,
                breadth,
                measurements,
            },
        ) => stacked(
            area_entries(*length, *breadth, measurements)
                .iter()
                .map(|e| format_measure(e.breadth)),
        ),
        (Column::SqFeet, Quantity::Area { .. }) => {
            format_measure(Some(format.area_rounding.apply(aggregate_quantity(quantity))))
        }

        (Column::Pieces, Quantity::Pieces { pieces }) => pieces.to_string(),

        (
            Column::Length,
            Quantity::Running {
                running_length,
                running_measurements,
            },
        ) => stacked(
            running_entries(*running_length, running_measurements)
                .into_iter()
                .map(format_measure),
        ),
        (Column::RunningFeet, Quantity::Running { .. }) => {
            format_feet(aggregate_quantity(quantity))
        }

        _ => EMPTY_CELL.to_string(),
    }
}

fn stacked<I: Iterator<Item = String>>(values: I) -> String {
    let joined = values.collect::<Vec<_>>().join("\n");
    if joined.is_empty() {
        EMPTY_CELL.to_string()
    } else {
        joined
    }
}

/// One subcategory with its finished table.
#[derive(Debug, Clone)]
pub struct SubcategoryBlock<'a> {
    pub name: &'a str,
    pub table: ItemTable,
}

/// One category with its finished subcategory tables.
#[derive(Debug, Clone)]
pub struct CategoryBlock<'a> {
    pub name: &'a str,
    pub subcategories: Vec<SubcategoryBlock<'a>>,
}

impl<'a> CategorySection<'a> {
    pub fn into_block(self, format: &CellFormat) -> Result<CategoryBlock<'a>> {
        let name = self.name;
        let subcategories = self
            .subcategories
            .into_iter()
            .map(|section| {
                Ok(SubcategoryBlock {
                    name: section.name,
                    table: build_table(name, &section, format)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CategoryBlock {
            name,
            subcategories,
        })
    }
}

/// A validated estimate, organized and tabulated, ready for layout.
#[derive(Debug, Clone)]
pub struct ExportEstimate<'a> {
    pub estimate: &'a Estimate,
    pub totals: Totals,
    pub categories: Vec<CategoryBlock<'a>>,
}

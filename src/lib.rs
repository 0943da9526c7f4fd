//! # Estimo
//!
//! A measurement-to-cost estimation engine for interior work, with
//! page-native PDF output for estimates, invoices and receipts.
//!
//! Items are measured in one of three units (area in cm², countable
//! pieces, linear run in cm) and priced per square foot, per piece or per
//! running foot. An estimate sums its items, applies a discount and is laid
//! out page by page: a category header never strands at the foot of a page,
//! long tables repeat their header, and every page is framed and numbered.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON / editing session)
//!       ↓
//!   [pricing]   — Unit conversion, aggregation, rounding, line prices
//!       ↓
//!   [model]     — Line items and estimates with cached totals
//!       ↓
//!   [sections]  — Category → subcategory tables of cell text
//!       ↓
//!   [layout]    — Page-aware placement
//!       ↓
//!   [pdf]       — Serialize to PDF bytes
//! ```

pub mod config;
pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod pricing;
pub mod sections;
pub mod session;
pub mod style;
pub mod text;
pub mod totals;

#[cfg(feature = "wasm")]
pub mod wasm;

use tracing::error;

pub use config::DocumentConfig;
pub use error::{EstimateError, Result};
pub use layout::{LayoutEngine, LayoutPage, RenderOptions};
pub use model::{DiscountType, Estimate, ItemEdit, ItemType, LineItem, Quantity};
pub use sections::DocumentKind;
pub use session::{EditAction, EditSession};

use pdf::{Metadata, PdfWriter};

/// Validate an estimate and lay it out into pages.
pub fn layout_estimate(
    estimate: &Estimate,
    config: &DocumentConfig,
    options: RenderOptions,
) -> Result<Vec<LayoutPage>> {
    config.validate()?;
    let engine = LayoutEngine::new(config, options);
    let export = estimate.prepare_export(engine.format()).inspect_err(|e| {
        error!(estimate = %estimate.id, error = %e, "document export failed");
    })?;
    Ok(engine.layout(&export))
}

/// Render an estimate to PDF bytes.
///
/// This is the primary entry point. Structural problems (no items, an
/// empty section, a non-finite total) fail the whole render; nothing is
/// partially written.
pub fn render_estimate(
    estimate: &Estimate,
    config: &DocumentConfig,
    options: RenderOptions,
) -> Result<Vec<u8>> {
    let pages = layout_estimate(estimate, config, options)?;
    let metadata = Metadata {
        title: Some(format!("{} {}", options.kind.title(), estimate.id).trim().to_string()),
        author: Some(config.company.name.clone()).filter(|n| !n.trim().is_empty()),
        subject: Some(estimate.client_name.clone()).filter(|n| !n.trim().is_empty()),
    };
    Ok(PdfWriter::new().write(&pages, &metadata))
}

/// Render an estimate described as JSON to PDF bytes. Without a config
/// the defaults are used.
pub fn render_json(
    estimate_json: &str,
    config_json: Option<&str>,
    options: RenderOptions,
) -> Result<Vec<u8>> {
    let estimate = Estimate::from_json(estimate_json)?;
    let config = match config_json {
        Some(json) => DocumentConfig::from_json(json)?,
        None => DocumentConfig::default(),
    };
    render_estimate(&estimate, &config, options)
}

//! Document configuration: company identity, currency, page geometry and
//! the terms printed at the foot of every document.
//!
//! Every field has a default, so an empty JSON object (or no config file at
//! all) renders a usable document.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, Result};
use crate::pricing::AreaRounding;
use crate::style::Color;

/// Smallest usable content height, in points, a page config may leave.
const MIN_CONTENT_HEIGHT: f64 = 200.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentConfig {
    pub company: CompanyInfo,
    /// Literal prefix for every money value, e.g. `"Rs. "`.
    pub currency_symbol: String,
    pub page: PageConfig,
    /// Terms and conditions, one per line.
    pub terms: Vec<String>,
    /// Rounding used for the Sq. Ft column. Pricing always rounds to whole
    /// square feet regardless of this setting.
    pub area_display_rounding: AreaRounding,
    /// Header and table-header fill, as `#rrggbb`.
    pub accent_color: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            company: CompanyInfo::default(),
            currency_symbol: "Rs. ".to_string(),
            page: PageConfig::default(),
            terms: vec![
                "50% advance along with the order, balance before installation.".to_string(),
                "Prices are valid for 30 days from the date of this document.".to_string(),
                "Measurements are subject to verification on site.".to_string(),
            ],
            area_display_rounding: AreaRounding::Whole,
            accent_color: "#2f3e46".to_string(),
        }
    }
}

impl DocumentConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DocumentConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Reject page geometry that leaves no room for content.
    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.page.size.dimensions();
        let margin = &self.page.margin;
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return Err(EstimateError::Config(format!(
                "page size {w}x{h} is not usable"
            )));
        }
        if w - margin.horizontal() <= 0.0 || h - margin.vertical() < MIN_CONTENT_HEIGHT {
            return Err(EstimateError::Config(
                "page margins leave no room for content".to_string(),
            ));
        }
        Ok(())
    }

    pub fn accent(&self) -> Color {
        Color::hex(&self.accent_color)
    }
}

/// Fixed identity block printed at the top of the first page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyInfo {
    pub name: String,
    pub tagline: String,
    pub address_lines: Vec<String>,
    pub phone: String,
    pub email: String,
}

impl Default for CompanyInfo {
    fn default() -> Self {
        Self {
            name: "Interior Studio".to_string(),
            tagline: "Design & Turnkey Interiors".to_string(),
            address_lines: Vec::new(),
            phone: String::new(),
            email: String::new(),
        }
    }
}

/// Page size and margins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub size: PageSize,
    /// Page margins in points (1/72 inch). The frame is drawn on the margin.
    pub margin: Edges,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: Edges::uniform(28.0),
        }
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

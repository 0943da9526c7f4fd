//! # Fonts
//!
//! Documents use the two standard PDF Helvetica faces. They need no
//! embedding, so a font here is just a PDF base-font name plus a width
//! table for measuring text during layout.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The standard faces this engine draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    pub fn for_weight(bold: bool) -> Self {
        if bold {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        }
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            StandardFont::Helvetica => StandardFontMetrics::HELVETICA,
            StandardFont::HelveticaBold => StandardFontMetrics::HELVETICA_BOLD,
        }
    }

    /// Measure the width of a string in points.
    pub fn measure(&self, text: &str, font_size: f64) -> f64 {
        self.metrics().measure_string(text, font_size)
    }
}

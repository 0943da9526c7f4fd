//! # Layout Engine
//!
//! Turns an organized estimate into positioned pages. This is the heart of
//! document output: every element gets an absolute position on a fixed-size
//! page, and content that doesn't fit moves to the next page.
//!
//! Coordinates are in points with the origin at the top-left of the page
//! and y growing downward. The PDF writer flips them.
//!
//! ## Page anatomy
//!
//! ```text
//! +---------------- frame (on the margin) ----------------+
//! | company header (first page only)                      |
//! | CATEGORY                                              |
//! |   Subcategory                                         |
//! |   [# | Material | ... | Amount]   <- header repeats   |
//! |   ...rows...                          on new pages    |
//! | totals, terms, signatures                             |
//! |-------------------------------------------------------|
//! |                 Page i of N                           |
//! +-------------------------------------------------------+
//! ```
//!
//! Blocks are placed using an *estimated* height (see [`page_break`]); the
//! cursor then advances by what was actually drawn, so wrapped text never
//! overlaps the next block.

pub mod page_break;

use tracing::debug;

use crate::config::{DocumentConfig, PageConfig};
use crate::font::StandardFont;
use crate::model::DiscountType;
use crate::sections::{format_measure, CellFormat, DocumentKind, ExportEstimate, ItemTable};
use crate::style::{Color, TextAlign};
use crate::text::{break_into_lines, BrokenLine};

use page_break::{decide_block, decide_reserved, BlockFit, BreakDecision};

/// Estimated height of one body row.
pub const ROW_HEIGHT: f64 = 19.0;
/// Subcategory title plus a column-header row of up to two lines.
pub const SUBCATEGORY_HEADER_HEIGHT: f64 = 48.0;
/// Band drawn above the first subcategory of a category.
pub const CATEGORY_HEADER_HEIGHT: f64 = 24.0;
/// A category may only open with at least this much room left.
pub const MIN_CATEGORY_SPACE: f64 = 120.0;
/// Space after every table.
pub const TABLE_GAP: f64 = 14.0;
/// Room the totals block needs on the current page.
pub const TOTALS_MIN_SPACE: f64 = 110.0;
/// Band at the bottom of the frame reserved for the page number.
pub const FOOTER_HEIGHT: f64 = 22.0;

const FRAME_PADDING: f64 = 12.0;
const FRAME_WIDTH: f64 = 1.0;
const CELL_PADDING: f64 = 4.0;
const CELL_BORDER: f64 = 0.5;
const LINE_HEIGHT: f64 = 1.25;
const BODY_SIZE: f64 = 8.5;
const TOTALS_ROW_HEIGHT: f64 = 18.0;
const TOTALS_WIDTH: f64 = 230.0;
const SIGNATURE_GAP: f64 = 36.0;
const SIGNATURE_WIDTH: f64 = 150.0;

/// A fully laid-out page ready for PDF serialization.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
}

impl LayoutPage {
    /// Every text line on the page, in drawing order.
    pub fn text_lines(&self) -> Vec<&str> {
        fn collect<'a>(elements: &'a [LayoutElement], out: &mut Vec<&'a str>) {
            for element in elements {
                if let DrawCommand::Text { lines, .. } = &element.draw {
                    out.extend(lines.iter().map(|l| l.text.as_str()));
                }
                collect(&element.children, out);
            }
        }
        let mut out = Vec::new();
        collect(&self.elements, &mut out);
        out
    }

    /// Top-level elements of one logical type.
    pub fn elements_of(&self, node_type: &str) -> Vec<&LayoutElement> {
        self.elements
            .iter()
            .filter(|e| e.node_type.as_deref() == Some(node_type))
            .collect()
    }
}

/// A positioned element on a page.
#[derive(Debug, Clone)]
pub struct LayoutElement {
    /// Absolute position on the page (top-left corner).
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// The visual properties to draw.
    pub draw: DrawCommand,
    /// Child elements (positioned relative to page, not parent).
    pub children: Vec<LayoutElement>,
    /// Logical type, e.g. "Frame", "TableRow", "Footer".
    pub node_type: Option<String>,
}

impl LayoutElement {
    fn new(x: f64, y: f64, width: f64, height: f64, draw: DrawCommand) -> Self {
        Self {
            x,
            y,
            width,
            height,
            draw,
            children: Vec::new(),
            node_type: None,
        }
    }

    fn typed(mut self, node_type: &str) -> Self {
        self.node_type = Some(node_type.to_string());
        self
    }

    fn offset_y(&mut self, dy: f64) {
        self.y += dy;
        if let DrawCommand::Text { lines, .. } = &mut self.draw {
            for line in lines {
                line.y += dy;
            }
        }
        for child in &mut self.children {
            child.offset_y(dy);
        }
    }
}

/// What to actually draw for this element.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Nothing to draw (just a container).
    None,
    /// A filled and/or stroked rectangle.
    Rect {
        background: Option<Color>,
        border_width: f64,
        border_color: Color,
    },
    /// Text lines in one color.
    Text { lines: Vec<TextLine>, color: Color },
}

impl DrawCommand {
    fn fill(color: Color) -> Self {
        DrawCommand::Rect {
            background: Some(color),
            border_width: 0.0,
            border_color: color,
        }
    }

    fn stroke(width: f64, color: Color) -> Self {
        DrawCommand::Rect {
            background: None,
            border_width: width,
            border_color: color,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f64,
    /// Baseline, from the top of the page.
    pub y: f64,
    pub text: String,
    pub font: StandardFont,
    pub font_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TextStyle {
    font: StandardFont,
    size: f64,
    align: TextAlign,
    color: Color,
}

impl TextStyle {
    fn body() -> Self {
        Self {
            font: StandardFont::Helvetica,
            size: BODY_SIZE,
            align: TextAlign::Left,
            color: Color::BLACK,
        }
    }

    fn bold(self) -> Self {
        Self {
            font: StandardFont::for_weight(true),
            ..self
        }
    }

    fn sized(self, size: f64) -> Self {
        Self { size, ..self }
    }

    fn aligned(self, align: TextAlign) -> Self {
        Self { align, ..self }
    }

    fn colored(self, color: Color) -> Self {
        Self { color, ..self }
    }

    fn line_height(&self) -> f64 {
        self.size * LINE_HEIGHT
    }
}

/// Wrap `text` into `width` and position it with its top at `y`.
fn text_block(x: f64, y: f64, width: f64, text: &str, style: TextStyle) -> LayoutElement {
    let lines = break_into_lines(text, width, style.font, style.size);
    lines_block(x, y, width, lines, style)
}

/// Position already-broken lines with the first line's top at `y`.
fn lines_block(x: f64, y: f64, width: f64, lines: Vec<BrokenLine>, style: TextStyle) -> LayoutElement {
    let line_height = style.line_height();
    let lines: Vec<TextLine> = lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let offset = match style.align {
                TextAlign::Left => 0.0,
                TextAlign::Right => (width - line.width).max(0.0),
                TextAlign::Center => ((width - line.width) / 2.0).max(0.0),
            };
            TextLine {
                x: x + offset,
                y: y + i as f64 * line_height + style.size,
                text: line.text,
                font: style.font,
                font_size: style.size,
            }
        })
        .collect();
    let height = lines.len() as f64 * line_height;
    LayoutElement::new(
        x,
        y,
        width,
        height,
        DrawCommand::Text {
            lines,
            color: style.color,
        },
    )
}

/// Where content may go on every page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub frame_x: f64,
    pub frame_y: f64,
    pub frame_width: f64,
    pub frame_height: f64,
    pub content_x: f64,
    pub content_width: f64,
    /// First y a block may start at.
    pub page_start_y: f64,
    /// Content must end above this y; the footer band sits below it.
    pub page_end_y: f64,
}

impl PageGeometry {
    pub fn from_config(config: &PageConfig) -> Self {
        let (width, height) = config.size.dimensions();
        let margin = &config.margin;
        let frame_width = width - margin.horizontal();
        let frame_height = height - margin.vertical();
        Self {
            width,
            height,
            frame_x: margin.left,
            frame_y: margin.top,
            frame_width,
            frame_height,
            content_x: margin.left + FRAME_PADDING,
            content_width: (frame_width - 2.0 * FRAME_PADDING).max(0.0),
            page_start_y: margin.top + FRAME_PADDING,
            page_end_y: height - margin.bottom - FOOTER_HEIGHT,
        }
    }

    /// Height a block can use on an empty page.
    pub fn usable_height(&self) -> f64 {
        (self.page_end_y - self.page_start_y).max(0.0)
    }
}

/// Tracks where we are on the current page during layout.
#[derive(Debug, Clone)]
struct PageCursor {
    geometry: PageGeometry,
    frame_color: Color,
    y: f64,
    elements: Vec<LayoutElement>,
}

impl PageCursor {
    fn new(geometry: PageGeometry, frame_color: Color) -> Self {
        let frame = LayoutElement::new(
            geometry.frame_x,
            geometry.frame_y,
            geometry.frame_width,
            geometry.frame_height,
            DrawCommand::stroke(FRAME_WIDTH, frame_color),
        )
        .typed("Frame");
        Self {
            geometry,
            frame_color,
            y: geometry.page_start_y,
            elements: vec![frame],
        }
    }

    fn remaining_height(&self) -> f64 {
        (self.geometry.page_end_y - self.y).max(0.0)
    }

    /// Nothing but the frame has been placed.
    fn is_fresh(&self) -> bool {
        self.elements.len() <= 1
    }

    fn push(&mut self, element: LayoutElement) {
        self.elements.push(element);
    }

    fn finalize(&self) -> LayoutPage {
        LayoutPage {
            width: self.geometry.width,
            height: self.geometry.height,
            elements: self.elements.clone(),
        }
    }

    fn new_page(&self) -> Self {
        PageCursor::new(self.geometry, self.frame_color)
    }
}

/// Per-render choices that are not part of the estimate itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderOptions {
    pub kind: DocumentKind,
    /// Printed with the balance due on invoices and receipts.
    pub amount_paid: Option<f64>,
}

/// One line of the totals block.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsRow {
    pub label: String,
    pub value: String,
    pub emphasized: bool,
}

pub struct LayoutEngine<'a> {
    config: &'a DocumentConfig,
    options: RenderOptions,
    format: CellFormat,
    geometry: PageGeometry,
    accent: Color,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a DocumentConfig, options: RenderOptions) -> Self {
        Self {
            config,
            options,
            format: CellFormat::for_document(config, options.kind),
            geometry: PageGeometry::from_config(&config.page),
            accent: config.accent(),
        }
    }

    /// The cell format tables must be built with for this render.
    pub fn format(&self) -> &CellFormat {
        &self.format
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    /// Main entry point: lay out an organized estimate into pages.
    pub fn layout(&self, export: &ExportEstimate<'_>) -> Vec<LayoutPage> {
        let mut pages: Vec<LayoutPage> = Vec::new();
        let mut cursor = PageCursor::new(self.geometry, Color::BLACK);

        self.layout_company_header(&mut cursor, export);

        for category in &export.categories {
            for (index, sub) in category.subcategories.iter().enumerate() {
                let opens_category = index == 0;
                let mut estimated = block_estimate(&sub.table);
                if opens_category {
                    estimated += CATEGORY_HEADER_HEIGHT;
                }
                let fit = BlockFit {
                    estimated_height: estimated,
                    remaining_height: cursor.remaining_height(),
                    opens_category,
                    page_is_fresh: cursor.is_fresh(),
                };

                if decide_block(&fit, MIN_CATEGORY_SPACE) == BreakDecision::MoveToNextPage {
                    debug!(
                        category = category.name,
                        subcategory = sub.name,
                        estimated,
                        remaining = fit.remaining_height,
                        page = pages.len() + 2,
                        "moving block to next page"
                    );
                    pages.push(cursor.finalize());
                    cursor = cursor.new_page();
                }

                // Headers only go down together with the first row under them.
                let lead = self.lead_height(opens_category, sub.name, &sub.table);
                if decide_reserved(cursor.remaining_height(), lead, cursor.is_fresh())
                    == BreakDecision::MoveToNextPage
                {
                    debug!(
                        subcategory = sub.name,
                        lead,
                        remaining = cursor.remaining_height(),
                        "headers moved to next page with their first row"
                    );
                    pages.push(cursor.finalize());
                    cursor = cursor.new_page();
                }

                if opens_category {
                    self.layout_category_header(&mut cursor, category.name);
                }
                self.layout_subcategory_header(&mut cursor, sub.name);
                self.layout_table(&sub.table, &mut cursor, &mut pages);
                cursor.y += TABLE_GAP;
            }
        }

        self.layout_totals(&mut cursor, &mut pages, export);
        self.layout_closing(&mut cursor, &mut pages, export);
        pages.push(cursor.finalize());

        self.number_pages(&mut pages);
        debug!(pages = pages.len(), "layout complete");
        pages
    }

    fn layout_company_header(&self, cursor: &mut PageCursor, export: &ExportEstimate<'_>) {
        let g = self.geometry;
        let company = &self.config.company;
        let estimate = export.estimate;
        let left_width = g.content_width * 0.6;
        let right_x = g.content_x + left_width;
        let right_width = g.content_width - left_width;
        let top = cursor.y;

        let mut block = Vec::new();
        let mut left_y = top;
        let mut push_left = |text: &str, style: TextStyle, block: &mut Vec<LayoutElement>| {
            if text.trim().is_empty() {
                return;
            }
            let element = text_block(g.content_x, left_y, left_width, text, style);
            left_y += element.height;
            block.push(element);
        };

        let muted = Color::gray(0.35);
        push_left(
            &company.name,
            TextStyle::body().bold().sized(16.0).colored(self.accent),
            &mut block,
        );
        push_left(&company.tagline, TextStyle::body().sized(9.0).colored(muted), &mut block);
        for line in &company.address_lines {
            push_left(line, TextStyle::body().colored(muted), &mut block);
        }
        let contact = [company.phone.as_str(), company.email.as_str()]
            .iter()
            .filter(|s| !s.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("  |  ");
        push_left(&contact, TextStyle::body().colored(muted), &mut block);

        let right = TextStyle::body().aligned(TextAlign::Right);
        let mut right_y = top;
        let mut right_lines = vec![(
            self.options.kind.title().to_string(),
            right.bold().sized(18.0).colored(self.accent),
        )];
        if !estimate.id.trim().is_empty() {
            right_lines.push((format!("No. {}", estimate.id), right));
        }
        if !estimate.date.trim().is_empty() {
            right_lines.push((format!("Date: {}", estimate.date), right));
        }
        for (text, style) in right_lines {
            let element = text_block(right_x, right_y, right_width, &text, style);
            right_y += element.height;
            block.push(element);
        }

        let bottom = left_y.max(right_y) + 6.0;
        block.push(LayoutElement::new(
            g.content_x,
            bottom,
            g.content_width,
            1.2,
            DrawCommand::fill(self.accent),
        ));
        let mut y = bottom + 8.0;

        let client_lines = [
            ("To,".to_string(), TextStyle::body().bold().sized(9.0)),
            (estimate.client_name.clone(), TextStyle::body().bold().sized(10.0)),
            (estimate.client_address.clone(), TextStyle::body()),
            (
                if estimate.client_phone.trim().is_empty() {
                    String::new()
                } else {
                    format!("Ph: {}", estimate.client_phone)
                },
                TextStyle::body(),
            ),
        ];
        for (text, style) in client_lines {
            if text.trim().is_empty() {
                continue;
            }
            let element = text_block(g.content_x, y, left_width, &text, style);
            y += element.height;
            block.push(element);
        }
        y += 10.0;

        let mut header = LayoutElement::new(g.content_x, top, g.content_width, y - top, DrawCommand::None)
            .typed("CompanyHeader");
        header.children = block;
        cursor.push(header);
        cursor.y = y;
    }

    fn layout_category_header(&self, cursor: &mut PageCursor, name: &str) {
        let g = self.geometry;
        let band_height = CATEGORY_HEADER_HEIGHT - 6.0;
        let style = TextStyle::body().bold().sized(11.0);
        let mut band = LayoutElement::new(
            g.content_x,
            cursor.y,
            g.content_width,
            band_height,
            DrawCommand::fill(Color::gray(0.9)),
        )
        .typed("CategoryHeader");
        let text_y = cursor.y + (band_height - style.line_height()) / 2.0;
        band.children.push(text_block(
            g.content_x + 6.0,
            text_y,
            g.content_width - 12.0,
            &display_name(name, "General").to_uppercase(),
            style,
        ));
        cursor.push(band);
        cursor.y += CATEGORY_HEADER_HEIGHT;
    }

    fn subcategory_header(&self, name: &str, y: f64) -> LayoutElement {
        let g = self.geometry;
        text_block(
            g.content_x,
            y + 3.0,
            g.content_width,
            display_name(name, "Items"),
            TextStyle::body().bold().sized(9.5).colored(self.accent),
        )
        .typed("SubcategoryHeader")
    }

    fn layout_subcategory_header(&self, cursor: &mut PageCursor, name: &str) {
        let element = self.subcategory_header(name, cursor.y);
        cursor.y += element.height + 5.0;
        cursor.push(element);
    }

    /// Height from the top of a block's headers to the bottom of its first
    /// body row. A first row too tall for any page only needs its first
    /// line, since it is split.
    fn lead_height(&self, opens_category: bool, name: &str, table: &ItemTable) -> f64 {
        let mut height = self.subcategory_header(name, 0.0).height + 5.0;
        if opens_category {
            height += CATEGORY_HEADER_HEIGHT;
        }
        let widths = self.column_widths(table);
        let body_style = TextStyle::body();
        let header_height = wrapped_height(
            &self.wrap_cells(&table.header(), &widths, header_style()),
            header_style(),
        );
        height += header_height;
        if let Some(first) = table.rows.first() {
            let first_height = wrapped_height(&self.wrap_cells(first, &widths, body_style), body_style);
            height += if first_height + header_height <= self.geometry.usable_height() {
                first_height
            } else {
                body_style.line_height() + 2.0 * CELL_PADDING
            };
        }
        height
    }

    fn column_widths(&self, table: &ItemTable) -> Vec<f64> {
        table
            .fractions()
            .iter()
            .map(|f| f * self.geometry.content_width)
            .collect()
    }

    /// Break every cell's text into lines at its column width.
    fn wrap_cells(&self, cells: &[String], widths: &[f64], style: TextStyle) -> Vec<Vec<BrokenLine>> {
        widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let text = cells.get(i).map(String::as_str).unwrap_or("");
                let inner = (width - 2.0 * CELL_PADDING).max(1.0);
                break_into_lines(text, inner, style.font, style.size)
            })
            .collect()
    }

    /// Draw a table, repeating its header row on every page it spans. A
    /// row taller than a whole page is split between lines.
    fn layout_table(&self, table: &ItemTable, cursor: &mut PageCursor, pages: &mut Vec<LayoutPage>) {
        let g = self.geometry;
        let widths = self.column_widths(table);
        let header = self.wrap_cells(&table.header(), &widths, header_style());
        let header_aligns = vec![TextAlign::Center; widths.len()];
        let body_aligns: Vec<TextAlign> = table.columns.iter().map(|c| c.align()).collect();
        let body_style = TextStyle::body();
        let line_height = body_style.line_height();

        let header_height = wrapped_height(&header, header_style());
        self.place_row(cursor, header.clone(), &widths, &header_aligns, header_style(), Some(self.accent));

        for row in &table.rows {
            let mut cells = self.wrap_cells(row, &widths, body_style);
            let mut moved_whole = false;
            loop {
                let row_height = wrapped_height(&cells, body_style);
                let remaining = cursor.remaining_height();
                if row_height <= remaining {
                    self.place_row(cursor, cells, &widths, &body_aligns, body_style, None);
                    break;
                }

                let fits_on_empty_page = row_height + header_height <= g.usable_height();
                let lines_here = ((remaining - 2.0 * CELL_PADDING) / line_height).floor().max(0.0) as usize;

                if !fits_on_empty_page && lines_here > 0 {
                    debug!(row_height, lines_here, "splitting table row across pages");
                    let rest: Vec<Vec<BrokenLine>> = cells
                        .iter_mut()
                        .map(|lines| lines.split_off(lines_here.min(lines.len())))
                        .collect();
                    self.place_row(cursor, cells, &widths, &body_aligns, body_style, None);
                    cells = rest;
                } else if moved_whole {
                    // Not even one line fits below the header on an empty page.
                    self.place_row(cursor, cells, &widths, &body_aligns, body_style, None);
                    break;
                } else {
                    debug!(row_height, remaining, "table row continues on next page");
                }

                pages.push(cursor.finalize());
                *cursor = cursor.new_page();
                self.place_row(cursor, header.clone(), &widths, &header_aligns, header_style(), Some(self.accent));
                moved_whole = lines_here == 0;
            }
        }
    }

    fn place_row(
        &self,
        cursor: &mut PageCursor,
        cells: Vec<Vec<BrokenLine>>,
        widths: &[f64],
        aligns: &[TextAlign],
        style: TextStyle,
        background: Option<Color>,
    ) {
        let row = self.build_row(cells, widths, aligns, style, background, cursor.y);
        cursor.y += row.height;
        cursor.push(row);
    }

    /// Lay out one table row with its top at `y`. The row is as tall as its
    /// tallest cell.
    fn build_row(
        &self,
        cells: Vec<Vec<BrokenLine>>,
        widths: &[f64],
        aligns: &[TextAlign],
        style: TextStyle,
        background: Option<Color>,
        y: f64,
    ) -> LayoutElement {
        let x0 = self.geometry.content_x;
        let total_width: f64 = widths.iter().sum();
        let row_height = wrapped_height(&cells, style);

        let mut row = LayoutElement::new(
            x0,
            y,
            total_width,
            row_height,
            match background {
                Some(color) => DrawCommand::fill(color),
                None => DrawCommand::None,
            },
        )
        .typed("TableRow");

        let mut x = x0;
        for (i, (width, lines)) in widths.iter().zip(cells).enumerate() {
            let align = aligns.get(i).copied().unwrap_or_default();
            let inner = (width - 2.0 * CELL_PADDING).max(1.0);
            let mut cell = LayoutElement::new(
                x,
                y,
                *width,
                row_height,
                DrawCommand::stroke(CELL_BORDER, Color::gray(0.6)),
            )
            .typed("TableCell");
            cell.children.push(lines_block(
                x + CELL_PADDING,
                y + CELL_PADDING,
                inner,
                lines,
                style.aligned(align),
            ));
            row.children.push(cell);
            x += width;
        }
        row
    }

    /// The lines of the totals block, in order.
    pub fn totals_rows(&self, export: &ExportEstimate<'_>) -> Vec<TotalsRow> {
        let totals = &export.totals;
        let estimate = export.estimate;
        let row = |label: String, value: f64, emphasized: bool| TotalsRow {
            label,
            value: self.format.money(value),
            emphasized,
        };

        let mut rows = vec![row("Subtotal".to_string(), totals.subtotal, false)];
        if totals.discount_amount != 0.0 {
            let label = match estimate.discount_type() {
                DiscountType::Percentage => {
                    format!("Discount ({}%)", format_measure(Some(estimate.discount())))
                }
                DiscountType::Fixed => "Discount".to_string(),
            };
            rows.push(row(label, -totals.discount_amount, false));
        }
        rows.push(row("Grand Total".to_string(), totals.grand_total, true));

        if self.options.kind != DocumentKind::Estimate {
            if let Some(paid) = self.options.amount_paid.filter(|p| p.is_finite()) {
                rows.push(row("Amount Paid".to_string(), paid, false));
                rows.push(row("Balance Due".to_string(), totals.grand_total - paid, true));
            }
        }
        rows
    }

    fn layout_totals(
        &self,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
        export: &ExportEstimate<'_>,
    ) {
        if decide_reserved(cursor.remaining_height(), TOTALS_MIN_SPACE, cursor.is_fresh())
            == BreakDecision::MoveToNextPage
        {
            debug!(remaining = cursor.remaining_height(), "totals moved to next page");
            pages.push(cursor.finalize());
            *cursor = cursor.new_page();
        }

        let g = self.geometry;
        let width = TOTALS_WIDTH.min(g.content_width);
        let x = g.content_x + g.content_width - width;
        let label_width = width * 0.55;
        let top = cursor.y;

        let mut block = LayoutElement::new(x, top, width, 0.0, DrawCommand::None).typed("Totals");
        let mut y = top;
        for line in self.totals_rows(export) {
            let (fill, style) = if line.emphasized {
                (
                    DrawCommand::Rect {
                        background: Some(self.accent),
                        border_width: CELL_BORDER,
                        border_color: Color::gray(0.6),
                    },
                    TextStyle::body().bold().sized(9.5).colored(Color::WHITE),
                )
            } else {
                (DrawCommand::stroke(CELL_BORDER, Color::gray(0.6)), TextStyle::body())
            };
            let text_y = y + (TOTALS_ROW_HEIGHT - style.line_height()) / 2.0;
            let mut cell = LayoutElement::new(x, y, width, TOTALS_ROW_HEIGHT, fill);
            cell.children.push(text_block(x + 6.0, text_y, label_width - 6.0, &line.label, style));
            cell.children.push(text_block(
                x + label_width,
                text_y,
                width - label_width - 6.0,
                &line.value,
                style.aligned(TextAlign::Right),
            ));
            block.children.push(cell);
            y += TOTALS_ROW_HEIGHT;
        }
        block.height = y - top;
        cursor.push(block);
        cursor.y = y + TABLE_GAP;
    }

    /// Notes, terms and signature lines. Kept together on one page when
    /// they fit on one; otherwise they flow line by line, with the
    /// signatures kept whole.
    fn layout_closing(
        &self,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
        export: &ExportEstimate<'_>,
    ) {
        let units = self.closing_units(export);
        let needed: f64 = units.iter().map(|(_, advance)| advance).sum();

        if needed <= self.geometry.usable_height()
            && decide_reserved(cursor.remaining_height(), needed, cursor.is_fresh())
                == BreakDecision::MoveToNextPage
        {
            debug!(needed, remaining = cursor.remaining_height(), "terms moved to next page");
            pages.push(cursor.finalize());
            *cursor = cursor.new_page();
        }

        let g = self.geometry;
        let new_block = |y: f64| {
            LayoutElement::new(g.content_x, y, g.content_width, 0.0, DrawCommand::None).typed("Terms")
        };
        let mut block = new_block(cursor.y);
        for (mut unit, advance) in units {
            let page_has_content = !block.children.is_empty() || !cursor.is_fresh();
            if unit.height > cursor.remaining_height() && page_has_content {
                debug!(remaining = cursor.remaining_height(), "terms continue on next page");
                if !block.children.is_empty() {
                    cursor.push(block);
                }
                pages.push(cursor.finalize());
                *cursor = cursor.new_page();
                block = new_block(cursor.y);
            }
            unit.offset_y(cursor.y);
            block.height = cursor.y + unit.height - block.y;
            cursor.y += advance;
            block.children.push(unit);
        }
        if !block.children.is_empty() {
            cursor.push(block);
        }
    }

    /// The closing block as units that may not be split, each laid out from
    /// y = 0 and paired with how far it advances the cursor.
    fn closing_units(&self, export: &ExportEstimate<'_>) -> Vec<(LayoutElement, f64)> {
        let g = self.geometry;
        let heading = TextStyle::body().bold().sized(9.0);
        let mut units: Vec<(LayoutElement, f64)> = Vec::new();

        let paragraph = |text: &str, style: TextStyle, units: &mut Vec<(LayoutElement, f64)>| {
            for line in break_into_lines(text, g.content_width, style.font, style.size) {
                let element = lines_block(g.content_x, 0.0, g.content_width, vec![line], style);
                let advance = element.height;
                units.push((element, advance));
            }
        };
        let gap_after = |units: &mut Vec<(LayoutElement, f64)>, gap: f64| {
            if let Some((_, advance)) = units.last_mut() {
                *advance += gap;
            }
        };

        let notes = export.estimate.notes.trim();
        if !notes.is_empty() {
            paragraph("Notes", heading, &mut units);
            paragraph(notes, TextStyle::body(), &mut units);
            gap_after(&mut units, 6.0);
        }

        let terms: Vec<&str> = self
            .config
            .terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !terms.is_empty() {
            paragraph("Terms & Conditions", heading, &mut units);
            for (i, term) in terms.iter().enumerate() {
                paragraph(&format!("{}. {}", i + 1, term), TextStyle::body(), &mut units);
            }
            gap_after(&mut units, 6.0);
        }

        let company = display_name(&self.config.company.name, "the company");
        let right_x = g.content_x + g.content_width - SIGNATURE_WIDTH;
        let mut signatures = LayoutElement::new(g.content_x, 0.0, g.content_width, 0.0, DrawCommand::None);
        let for_company = text_block(
            right_x,
            0.0,
            SIGNATURE_WIDTH,
            &format!("For {}", company),
            heading.aligned(TextAlign::Right),
        );
        let mut y = for_company.height + SIGNATURE_GAP;
        signatures.children.push(for_company);

        for (x, caption) in [(g.content_x, "Client Signature"), (right_x, "Authorised Signatory")] {
            signatures.children.push(LayoutElement::new(
                x,
                y,
                SIGNATURE_WIDTH,
                0.6,
                DrawCommand::fill(Color::BLACK),
            ));
            signatures.children.push(text_block(
                x,
                y + 3.0,
                SIGNATURE_WIDTH,
                caption,
                TextStyle::body().aligned(TextAlign::Center),
            ));
        }
        y += 3.0 + TextStyle::body().line_height();
        signatures.height = y;
        units.push((signatures, y));
        units
    }

    /// Stamp "Page i of N" on every page once the page count is known.
    fn number_pages(&self, pages: &mut [LayoutPage]) {
        let g = self.geometry;
        let total = pages.len();
        let style = TextStyle::body()
            .sized(8.0)
            .aligned(TextAlign::Center)
            .colored(Color::gray(0.35));

        for (i, page) in pages.iter_mut().enumerate() {
            let band_y = g.page_end_y;
            let band_height = FOOTER_HEIGHT - FRAME_WIDTH;
            let mut footer = LayoutElement::new(
                g.content_x,
                band_y,
                g.content_width,
                band_height,
                DrawCommand::fill(Color::WHITE),
            )
            .typed("Footer");
            footer.children.push(text_block(
                g.content_x,
                band_y + (band_height - style.line_height()) / 2.0,
                g.content_width,
                &format!("Page {} of {}", i + 1, total),
                style,
            ));
            page.elements.push(footer);
        }
    }
}

fn header_style() -> TextStyle {
    TextStyle::body().bold().colored(Color::WHITE)
}

/// Height of a row whose cells hold these lines.
fn wrapped_height(cells: &[Vec<BrokenLine>], style: TextStyle) -> f64 {
    let lines = cells.iter().map(Vec::len).max().unwrap_or(0);
    lines as f64 * style.line_height() + 2.0 * CELL_PADDING
}

/// Estimated height of a subcategory block: title, header row and one
/// fixed-height line per item.
pub fn block_estimate(table: &ItemTable) -> f64 {
    table.rows.len() as f64 * ROW_HEIGHT + SUBCATEGORY_HEADER_HEIGHT
}

fn display_name<'s>(name: &'s str, fallback: &'s str) -> &'s str {
    if name.trim().is_empty() {
        fallback
    } else {
        name
    }
}

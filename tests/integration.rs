//! Integration tests for the estimate pipeline.
//!
//! These tests exercise the full path from JSON input to PDF output.
//! They verify:
//! - Persisted estimates load, re-price and round-trip
//! - Line prices and totals for each unit
//! - The layout engine paginates long estimates with framed, numbered pages
//! - PDF output is structurally valid
//! - Structural problems fail the export instead of producing a document

use estimo::layout::{LayoutPage, MIN_CATEGORY_SPACE};
use estimo::model::{EstimateRecord, Measurement};
use estimo::sections::{build_table, CellFormat, SubcategorySection};
use estimo::*;
use pretty_assertions::assert_eq;

// ─── Helpers ────────────────────────────────────────────────────

fn pieces_item(id: &str, category: &str, subcategory: &str, pieces: u32, rate: f64) -> LineItem {
    LineItem::new(id, Quantity::pieces(pieces), rate)
        .with_category(category, subcategory)
        .with_material("Hinge", "Soft close")
}

fn estimate_of(items: Vec<LineItem>) -> Estimate {
    let mut estimate = Estimate::new("EST-1");
    estimate.client_name = "Ananya Rao".to_string();
    estimate.date = "14 Feb 2026".to_string();
    for item in items {
        estimate.push_item(item);
    }
    estimate
}

/// An estimate with `blocks` subcategories of `rows` items each, spread
/// over a handful of categories.
fn long_estimate(blocks: usize, rows: usize) -> Estimate {
    let mut items = Vec::new();
    for b in 0..blocks {
        let category = format!("Room {}", b / 3 + 1);
        let subcategory = format!("Section {}", b + 1);
        for r in 0..rows {
            items.push(pieces_item(&format!("{}-{}", b, r), &category, &subcategory, 2, 150.0));
        }
    }
    estimate_of(items)
}

fn layout(estimate: &Estimate) -> Vec<LayoutPage> {
    layout_estimate(estimate, &DocumentConfig::default(), RenderOptions::default()).unwrap()
}

fn render_to_pdf(estimate: &Estimate) -> Vec<u8> {
    render_estimate(estimate, &DocumentConfig::default(), RenderOptions::default()).unwrap()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "Missing %%EOF marker");
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

fn count_pdf_pages(bytes: &[u8]) -> usize {
    let needle = b"/Type /Page /Parent";
    bytes.windows(needle.len()).filter(|w| w == needle).count()
}

// ─── Pricing Scenarios ──────────────────────────────────────────

#[test]
fn test_area_item_scenario() {
    let item = LineItem::new("1", Quantity::area(300.0, 200.0), 50.0);
    // 64.58 sq ft rounds to 65
    assert_eq!(item.total_amount(), 3250.0);
}

#[test]
fn test_pieces_item_scenario() {
    let item = LineItem::new("1", Quantity::pieces(4), 250.0);
    assert_eq!(item.total_amount(), 1000.0);
}

#[test]
fn test_running_item_scenario() {
    let item = LineItem::new("1", Quantity::running(1000.0), 100.0);
    assert!((item.total_amount() - 3280.84).abs() < 0.01);
}

#[test]
fn test_percentage_discount_scenario() {
    let mut estimate = estimate_of(vec![
        pieces_item("1", "A", "a", 10, 600.0),
        pieces_item("2", "A", "a", 4, 1000.0),
    ]);
    estimate.set_discount(10.0, DiscountType::Percentage);

    let totals = estimate.totals();
    assert_eq!(totals.subtotal, 10_000.0);
    assert_eq!(totals.discount_amount, 1000.0);
    assert_eq!(totals.grand_total, 9000.0);
    assert_eq!(estimate.total_amount(), 9000.0);
}

#[test]
fn test_fixed_discount_may_go_negative() {
    let mut estimate = estimate_of(vec![pieces_item("1", "A", "a", 1, 100.0)]);
    estimate.set_discount(250.0, DiscountType::Fixed);
    assert_eq!(estimate.total_amount(), -150.0);
}

// ─── Persistence ────────────────────────────────────────────────

const PERSISTED: &str = r#"{
  "id": "EST-7",
  "clientName": "R. Mehta",
  "discount": "10",
  "discountType": "percentage",
  "totalAmount": 1,
  "items": [
    {
      "id": "a",
      "categoryName": "Kitchen",
      "subcategoryName": "Shutters",
      "materialName": "Laminate",
      "type": "area",
      "amountPerUnit": "50",
      "length": 300,
      "breadth": "200",
      "measurements": [{ "length": "", "breadth": 40 }],
      "totalAmount": 999
    },
    {
      "id": "b",
      "categoryName": "Kitchen",
      "subcategoryName": "Hardware",
      "type": "pieces",
      "amountPerUnit": 250,
      "pieces": "4"
    },
    {
      "id": "c",
      "categoryName": "Living",
      "subcategoryName": "Lighting",
      "type": "running",
      "amountPerUnit": null,
      "runningLength": 1000
    }
  ]
}"#;

#[test]
fn test_load_reprices_stale_totals() {
    let estimate = Estimate::from_json(PERSISTED).unwrap();
    let totals: Vec<f64> = estimate.items().iter().map(|i| i.total_amount()).collect();
    // The blank extra side counts as zero; the missing rate prices at zero.
    assert_eq!(totals, vec![3250.0, 1000.0, 0.0]);
    assert_eq!(estimate.total_amount(), 3825.0);
}

#[test]
fn test_round_trip_preserves_estimate() {
    let estimate = Estimate::from_json(PERSISTED).unwrap();
    let json = estimate.to_json().unwrap();
    let reloaded = Estimate::from_json(&json).unwrap();

    assert_eq!(reloaded.items(), estimate.items());
    assert_eq!(reloaded.discount(), estimate.discount());
    assert_eq!(reloaded.discount_type(), estimate.discount_type());
    assert_eq!(reloaded.total_amount(), estimate.total_amount());

    let record: EstimateRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(record.total_amount, Some(estimate.total_amount()));
}

#[test]
fn test_unknown_item_type_fails_to_load() {
    let json = r#"{ "items": [ { "id": "x", "type": "volume", "amountPerUnit": 5 } ] }"#;
    let err = Estimate::from_json(json).unwrap_err();
    assert!(matches!(err, EstimateError::Parse { .. }));
    assert!(err.to_string().contains("unsupported item type 'volume'"), "got: {err}");
}

// ─── Editing ────────────────────────────────────────────────────

#[test]
fn test_session_edits_flow_into_document() {
    let session = EditSession::new(Estimate::new("EST-9")).apply_all([
        EditAction::AddCustom {
            category: "Bedroom".to_string(),
            subcategory: "Wardrobe".to_string(),
            item_type: ItemType::Area,
        },
        EditAction::EditItem {
            id: "item-1".to_string(),
            edit: ItemEdit::SetAmountPerUnit(Some(50.0)),
        },
        EditAction::EditItem {
            id: "item-1".to_string(),
            edit: ItemEdit::SetLength(Some(300.0)),
        },
        EditAction::EditItem {
            id: "item-1".to_string(),
            edit: ItemEdit::SetBreadth(Some(200.0)),
        },
        EditAction::EditItem {
            id: "item-1".to_string(),
            edit: ItemEdit::AddMeasurement(Measurement::new(0.0, 90.0)),
        },
    ]);
    assert_eq!(session.estimate().total_amount(), 3250.0);

    let pages = layout(session.estimate());
    let text = pages[0].text_lines();
    assert!(text.contains(&"Rs. 3250.00"));
    assert!(text.contains(&"300"));
    assert!(text.contains(&"0"));
}

// ─── Layout & Pagination ────────────────────────────────────────

#[test]
fn test_small_estimate_fits_one_page() {
    let pages = layout(&estimate_of(vec![pieces_item("1", "Kitchen", "Hardware", 4, 250.0)]));
    assert_eq!(pages.len(), 1);
    assert!(pages[0].text_lines().contains(&"Page 1 of 1"));
}

#[test]
fn test_long_estimate_paginates_with_frame_and_numbers() {
    let pages = layout(&long_estimate(12, 8));
    let total = pages.len();
    assert!(total > 1, "expected several pages, got {total}");

    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.elements_of("Frame").len(), 1, "page {} has no frame", i + 1);
        let expected = format!("Page {} of {}", i + 1, total);
        let footers: Vec<&str> = page
            .text_lines()
            .into_iter()
            .filter(|t| t.starts_with("Page "))
            .collect();
        assert_eq!(footers, vec![expected.as_str()]);
    }
}

#[test]
fn test_categories_open_with_room_to_spare() {
    let config = DocumentConfig::default();
    let engine = LayoutEngine::new(&config, RenderOptions::default());
    let geometry = engine.geometry();

    for page in layout(&long_estimate(15, 5)) {
        for header in page.elements_of("CategoryHeader") {
            assert!(
                geometry.page_end_y - header.y >= MIN_CATEGORY_SPACE,
                "category header at y={} is orphaned",
                header.y
            );
        }
    }
}

#[test]
fn test_every_subcategory_and_item_is_drawn_once() {
    let estimate = long_estimate(9, 6);
    let pages = layout(&estimate);

    let subheaders: usize = pages.iter().map(|p| p.elements_of("SubcategoryHeader").len()).sum();
    assert_eq!(subheaders, 9);

    // Body rows plus one header row per table per page it touches.
    let rows: usize = pages.iter().map(|p| p.elements_of("TableRow").len()).sum();
    assert!(rows >= 9 * 6 + 9);
    assert!(rows <= 9 * 6 + 9 + pages.len());
}

#[test]
fn test_totals_and_terms_close_the_document() {
    let pages = layout(&long_estimate(10, 6));
    let totals: Vec<usize> = pages
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.elements_of("Totals").is_empty())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(totals.len(), 1);
    assert!(totals[0] + 2 >= pages.len());

    let last = pages.last().unwrap();
    assert_eq!(last.elements_of("Terms").len(), 1);
    assert!(pages[totals[0]].text_lines().contains(&"Grand Total"));
}

#[test]
fn test_receipt_uses_one_decimal() {
    let estimate = estimate_of(vec![LineItem::new("1", Quantity::running(1000.0), 100.0)
        .with_category("Living", "Lighting")]);
    let options = RenderOptions {
        kind: DocumentKind::Receipt,
        amount_paid: Some(3000.0),
    };
    let pages = layout_estimate(&estimate, &DocumentConfig::default(), options).unwrap();
    let text = pages[0].text_lines();
    assert!(text.contains(&"RECEIPT"));
    assert!(text.contains(&"Rs. 3280.8"));
    assert!(text.contains(&"Balance Due"));
    assert!(text.contains(&"Rs. 280.8"));
}

// ─── PDF Output ─────────────────────────────────────────────────

#[test]
fn test_pdf_is_valid_and_page_count_matches_layout() {
    let estimate = long_estimate(12, 8);
    let pages = layout(&estimate);
    let bytes = render_to_pdf(&estimate);

    assert_valid_pdf(&bytes);
    assert_eq!(count_pdf_pages(&bytes), pages.len());
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains(&format!("/Count {}", pages.len())));
    assert!(text.contains("/Title (ESTIMATE EST-1)"));
    assert!(text.contains("/BaseFont /Helvetica-Bold"));
}

#[test]
fn test_render_json_with_config() {
    let config = r#"{ "company": { "name": "Studio Nine" }, "currencySymbol": "INR " }"#;
    let bytes = render_json(PERSISTED, Some(config), RenderOptions::default()).unwrap();
    assert_valid_pdf(&bytes);
    assert!(String::from_utf8_lossy(&bytes).contains("/Author (Studio Nine)"));
}

// ─── Failures ───────────────────────────────────────────────────

#[test]
fn test_empty_estimate_is_rejected() {
    let err = render_estimate(&Estimate::new("E"), &DocumentConfig::default(), RenderOptions::default())
        .unwrap_err();
    assert!(matches!(err, EstimateError::NoItems));
}

#[test]
fn test_empty_group_fails_fast() {
    let section = SubcategorySection {
        name: "Shutters",
        items: vec![],
    };
    let err = build_table("Kitchen", &section, &CellFormat::default()).unwrap_err();
    assert_eq!(err.to_string(), "no rows for Kitchen / Shutters");
}

#[test]
fn test_bad_config_is_rejected() {
    let config = r#"{ "page": { "size": { "Custom": { "width": 0, "height": 0 } } } }"#;
    let estimate = estimate_of(vec![pieces_item("1", "A", "a", 1, 1.0)]);
    let err = render_json(&estimate.to_json().unwrap(), Some(config), RenderOptions::default())
        .unwrap_err();
    assert!(matches!(err, EstimateError::Config(_)));
}

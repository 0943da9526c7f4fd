use wasm_bindgen::prelude::*;

use crate::model::LineItem;
use crate::{DocumentKind, RenderOptions};

/// Render an estimate to PDF bytes. `config_json` may be empty for the
/// default document config.
#[wasm_bindgen]
pub fn render_estimate_pdf(
    estimate_json: &str,
    config_json: &str,
    kind: &str,
    amount_paid: Option<f64>,
) -> Result<Vec<u8>, JsValue> {
    let kind: DocumentKind = kind.parse().map_err(|e| to_js(&e))?;
    let config = Some(config_json).filter(|c| !c.trim().is_empty());
    crate::render_json(estimate_json, config, RenderOptions { kind, amount_paid })
        .map_err(|e| to_js(&e))
}

/// Re-price a line item object and hand it back with its `totalAmount`.
#[wasm_bindgen]
pub fn price_item(item: JsValue) -> Result<JsValue, JsValue> {
    let item: LineItem = serde_wasm_bindgen::from_value(item)?;
    Ok(serde_wasm_bindgen::to_value(&item)?)
}

fn to_js(e: &crate::EstimateError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

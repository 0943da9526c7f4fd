//! Tolerant number parsing for values coming out of half-filled forms.
//!
//! Persisted records are written by an interactive editor, so a dimension
//! may arrive as a number, a numeric string, an empty string, or `null`.
//! Anything that doesn't read as a finite number is treated as absent.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a JSON value as a finite number, if it is one.
pub fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite())
}

pub fn option_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

/// Like [`option_f64`] but absent values become zero.
pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(option_f64(deserializer)?.unwrap_or(0.0))
}

/// Piece counts: negative or fractional input is truncated toward zero.
pub fn option_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(option_f64(deserializer)?.map(count_from_f64))
}

pub fn count_from_f64(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.trunc().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

//! Summing the measurements of one line item into a single quantity.

use super::units::{cm_to_feet, cm_to_sq_feet};
use crate::model::{Measurement, RunningMeasurement};

/// Total square feet of an area item: the primary patch (only when both
/// sides are present) plus every extra patch. Missing sides count as zero.
pub fn aggregate_area(primary: Option<(f64, f64)>, extras: &[Measurement]) -> f64 {
    let primary = primary.map_or(0.0, |(l, b)| cm_to_sq_feet(l, b));
    extras.iter().fold(primary, |acc, m| {
        acc + cm_to_sq_feet(m.length.unwrap_or(0.0), m.breadth.unwrap_or(0.0))
    })
}

/// Total feet of a running item.
pub fn aggregate_running(primary: Option<f64>, extras: &[RunningMeasurement]) -> f64 {
    let primary = primary.map_or(0.0, cm_to_feet);
    extras
        .iter()
        .fold(primary, |acc, m| acc + cm_to_feet(m.length.unwrap_or(0.0)))
}

/// One displayed entry of an area item, in render order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaEntry {
    pub length: Option<f64>,
    pub breadth: Option<f64>,
}

/// Area entries primary-first, then extras in insertion order. The primary
/// pair appears when either side is filled in.
pub fn area_entries(
    length: Option<f64>,
    breadth: Option<f64>,
    extras: &[Measurement],
) -> Vec<AreaEntry> {
    let mut entries = Vec::with_capacity(extras.len() + 1);
    if length.is_some() || breadth.is_some() {
        entries.push(AreaEntry { length, breadth });
    }
    entries.extend(extras.iter().map(|m| AreaEntry {
        length: m.length,
        breadth: m.breadth,
    }));
    entries
}

/// Running lengths primary-first, then extras.
pub fn running_entries(primary: Option<f64>, extras: &[RunningMeasurement]) -> Vec<Option<f64>> {
    primary
        .into_iter()
        .map(Some)
        .chain(extras.iter().map(|m| m.length))
        .collect()
}

//! # Line-Item Pricing
//!
//! Turns raw centimetre measurements into a line total:
//!
//! ```text
//! measurements (cm)
//!       ↓
//!   [units]      — cm → sq ft / ft
//!       ↓
//!   [aggregate]  — sum primary + extra entries
//!       ↓
//!   [rounding]   — whole sq ft, area items only
//!       ↓
//!   quantity × amountPerUnit
//! ```
//!
//! Every function here is total: malformed or partial input produces a
//! zero, never NaN or infinity, so a half-typed form can't poison the
//! estimate's running total.

pub mod aggregate;
pub mod rounding;
pub mod units;

use crate::model::{Measurement, Quantity, RunningMeasurement};

pub use aggregate::{aggregate_area, aggregate_running};
pub use rounding::{round_sq_feet, AreaRounding};
pub use units::{cm_to_feet, cm_to_sq_feet};

use units::finite_or_zero;

/// The primary pair only counts when both sides are filled in.
pub fn primary_pair(length: Option<f64>, breadth: Option<f64>) -> Option<(f64, f64)> {
    length.zip(breadth)
}

/// Rounded square feet times the rate.
pub fn price_area(
    length: Option<f64>,
    breadth: Option<f64>,
    extras: &[Measurement],
    amount_per_unit: f64,
) -> f64 {
    let sq_feet = round_sq_feet(aggregate_area(primary_pair(length, breadth), extras));
    finite_or_zero(sq_feet * amount_per_unit)
}

pub fn price_pieces(pieces: u32, amount_per_unit: f64) -> f64 {
    finite_or_zero(f64::from(pieces) * amount_per_unit)
}

/// Running feet times the rate. Feet are not rounded.
pub fn price_running(
    running_length: Option<f64>,
    extras: &[RunningMeasurement],
    amount_per_unit: f64,
) -> f64 {
    finite_or_zero(aggregate_running(running_length, extras) * amount_per_unit)
}

/// Price a quantity. A missing rate prices to zero.
pub fn price_quantity(quantity: &Quantity, amount_per_unit: Option<f64>) -> f64 {
    let rate = amount_per_unit.map_or(0.0, finite_or_zero);
    match quantity {
        Quantity::Area {
            length,
            breadth,
            measurements,
        } => price_area(*length, *breadth, measurements, rate),
        Quantity::Pieces { pieces } => price_pieces(*pieces, rate),
        Quantity::Running {
            running_length,
            running_measurements,
        } => price_running(*running_length, running_measurements, rate),
    }
}

/// The unrounded aggregate quantity in the item's native unit.
pub fn aggregate_quantity(quantity: &Quantity) -> f64 {
    match quantity {
        Quantity::Area {
            length,
            breadth,
            measurements,
        } => aggregate_area(primary_pair(*length, *breadth), measurements),
        Quantity::Pieces { pieces } => f64::from(*pieces),
        Quantity::Running {
            running_length,
            running_measurements,
        } => aggregate_running(*running_length, running_measurements),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_scenario() {
        // 300 x 200 cm = 64.58 sq ft -> 65 -> 3250
        let total = price_quantity(&Quantity::area(300.0, 200.0), Some(50.0));
        assert_eq!(total, 3250.0);
    }

    #[test]
    fn pieces_scenario() {
        assert_eq!(price_quantity(&Quantity::pieces(4), Some(250.0)), 1000.0);
    }

    #[test]
    fn running_scenario_is_unrounded() {
        let total = price_quantity(&Quantity::running(1000.0), Some(100.0));
        assert!((total - 3280.839_895).abs() < 1e-3, "got {total}");
        assert!((total - 3280.8).abs() < 0.05);
    }

    #[test]
    fn pricing_is_idempotent() {
        let q = Quantity::Area {
            length: Some(123.0),
            breadth: Some(77.0),
            measurements: vec![Measurement::new(50.0, 60.0)],
        };
        let a = price_quantity(&q, Some(42.5));
        let b = price_quantity(&q, Some(42.5));
        assert_eq!(a, b);
    }

    #[test]
    fn missing_rate_or_dimension_is_zero() {
        assert_eq!(price_quantity(&Quantity::area(300.0, 200.0), None), 0.0);
        let half = Quantity::Area {
            length: Some(300.0),
            breadth: None,
            measurements: vec![],
        };
        assert_eq!(price_quantity(&half, Some(50.0)), 0.0);
        assert_eq!(price_quantity(&Quantity::empty(crate::model::ItemType::Running), Some(10.0)), 0.0);
    }

    #[test]
    fn non_finite_rate_is_zero() {
        assert_eq!(price_quantity(&Quantity::pieces(3), Some(f64::NAN)), 0.0);
        assert_eq!(price_quantity(&Quantity::pieces(3), Some(f64::INFINITY)), 0.0);
    }

    #[test]
    fn aggregate_quantity_is_native_unit() {
        let q = Quantity::area(300.0, 200.0);
        assert!((aggregate_quantity(&q) - 64.58).abs() < 0.01);
        assert_eq!(aggregate_quantity(&Quantity::pieces(7)), 7.0);
    }
}

//! Rounding applied to aggregated square footage.
//!
//! Only area quantities are rounded. Piece counts are integral already and
//! running feet are priced unrounded.

use serde::{Deserialize, Serialize};

use super::units::finite_or_zero;

/// Which rounding rule to apply to an aggregated area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AreaRounding {
    /// Half-up to the nearest whole square foot. Used for all pricing.
    #[default]
    Whole,
    /// Up to the next half square foot (2.3 -> 2.5, 2.6 -> 3). Display only,
    /// and only when a document config asks for it.
    HalfStep,
}

impl AreaRounding {
    pub fn apply(self, sq_feet: f64) -> f64 {
        match self {
            AreaRounding::Whole => round_sq_feet(sq_feet),
            AreaRounding::HalfStep => round_sq_feet_half_step(sq_feet),
        }
    }
}

/// Floor, then add one if the remainder is at least one half.
///
/// This is plain half-up, not banker's rounding: 2.5 becomes 3.
pub fn round_sq_feet(value: f64) -> f64 {
    let value = finite_or_zero(value);
    let floored = value.floor();
    if value - floored >= 0.5 {
        floored + 1.0
    } else {
        floored
    }
}

/// Raise any fractional part to the next half step.
pub fn round_sq_feet_half_step(value: f64) -> f64 {
    let value = finite_or_zero(value);
    let floored = value.floor();
    let fraction = value - floored;
    if fraction == 0.0 {
        floored
    } else if fraction <= 0.5 {
        floored + 0.5
    } else {
        floored + 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_rounding_is_half_up() {
        assert_eq!(round_sq_feet(2.4), 2.0);
        assert_eq!(round_sq_feet(2.5), 3.0);
        assert_eq!(round_sq_feet(2.999), 3.0);
        assert_eq!(round_sq_feet(2.49999), 2.0);
        assert_eq!(round_sq_feet(0.0), 0.0);
        assert_eq!(round_sq_feet(64.58), 65.0);
    }

    #[test]
    fn whole_rounding_guards_nan() {
        assert_eq!(round_sq_feet(f64::NAN), 0.0);
    }

    #[test]
    fn half_step_rounding() {
        assert_eq!(round_sq_feet_half_step(2.0), 2.0);
        assert_eq!(round_sq_feet_half_step(2.3), 2.5);
        assert_eq!(round_sq_feet_half_step(2.5), 2.5);
        assert_eq!(round_sq_feet_half_step(2.6), 3.0);
    }

    #[test]
    fn policy_dispatch() {
        assert_eq!(AreaRounding::Whole.apply(2.3), 2.0);
        assert_eq!(AreaRounding::HalfStep.apply(2.3), 2.5);
        assert_eq!(AreaRounding::default(), AreaRounding::Whole);
    }
}

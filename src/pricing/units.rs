//! Centimetre to imperial conversions.
//!
//! Site measurements are taken in centimetres but the contractor prices
//! area work per square foot and running work per foot.

/// Square centimetres in one square foot.
pub const SQ_CM_PER_SQ_FOOT: f64 = 929.03;

/// Centimetres in one foot.
pub const CM_PER_FOOT: f64 = 30.48;

/// Area of a `length x breadth` patch in square feet. Non-finite results
/// (NaN or infinite input) collapse to zero.
pub fn cm_to_sq_feet(length_cm: f64, breadth_cm: f64) -> f64 {
    finite_or_zero((length_cm * breadth_cm) / SQ_CM_PER_SQ_FOOT)
}

/// Length in feet, with the same non-finite guard.
pub fn cm_to_feet(length_cm: f64) -> f64 {
    finite_or_zero(length_cm / CM_PER_FOOT)
}

/// Collapse NaN and infinities to zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sq_feet_matches_formula() {
        for (l, b) in [(300.0, 200.0), (12.5, 80.0), (1.0, 1.0), (929.03, 1.0)] {
            assert!((cm_to_sq_feet(l, b) - l * b / 929.03).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_side_is_zero_area() {
        assert_eq!(cm_to_sq_feet(0.0, 450.0), 0.0);
        assert_eq!(cm_to_sq_feet(450.0, 0.0), 0.0);
    }

    #[test]
    fn non_finite_input_is_zero() {
        assert_eq!(cm_to_sq_feet(f64::NAN, 10.0), 0.0);
        assert_eq!(cm_to_sq_feet(f64::INFINITY, 10.0), 0.0);
        assert_eq!(cm_to_feet(f64::NAN), 0.0);
        assert_eq!(cm_to_feet(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn feet_conversion() {
        assert!((cm_to_feet(30.48) - 1.0).abs() < 1e-12);
        assert!((cm_to_feet(1000.0) - 32.808_398_95).abs() < 1e-6);
    }
}

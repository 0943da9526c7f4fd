//! Estimate totals: subtotal, discount, grand total.

use serde::Serialize;

use crate::model::{DiscountType, LineItem};
use crate::pricing::units::finite_or_zero;

/// The three figures printed in an estimate's totals block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub grand_total: f64,
}

impl Totals {
    /// Compose line amounts with a discount.
    ///
    /// Nothing is clamped: a percentage over 100 or a fixed discount larger
    /// than the subtotal gives a negative grand total.
    pub fn compute<I>(line_amounts: I, discount: f64, discount_type: DiscountType) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let subtotal: f64 = line_amounts.into_iter().map(finite_or_zero).sum();
        let discount = finite_or_zero(discount);
        let discount_amount = match discount_type {
            DiscountType::Percentage => subtotal * discount / 100.0,
            DiscountType::Fixed => discount,
        };
        Totals {
            subtotal,
            discount_amount,
            grand_total: subtotal - discount_amount,
        }
    }

    pub fn for_items(items: &[LineItem], discount: f64, discount_type: DiscountType) -> Self {
        Self::compute(items.iter().map(LineItem::total_amount), discount, discount_type)
    }
}

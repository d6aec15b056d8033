//! Sale models and total computation

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A finalized point-of-sale transaction
///
/// Totals are computed once at finalization and never re-derived. A sale is
/// immutable after creation: there is no edit or delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub user_id: Uuid,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A line on a finalized sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Sale price frozen when the item entered the cart
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Monetary totals of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl SaleTotals {
    /// Compute totals from a subtotal: `tax = subtotal × rate` rounded to
    /// two decimals (midpoint away from zero), `total = subtotal + tax −
    /// discount`. Discounts are not offered yet, so callers pass zero.
    pub fn compute(subtotal: Decimal, tax_rate: Decimal, discount: Decimal) -> Self {
        let tax = (subtotal * tax_rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        SaleTotals {
            subtotal,
            tax,
            discount,
            total: subtotal + tax - discount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_totals_at_standard_rate() {
        // 2 units at 1000.00 with 18% tax
        let totals = SaleTotals::compute(dec("2000.00"), dec("0.18"), Decimal::ZERO);
        assert_eq!(totals.subtotal, dec("2000.00"));
        assert_eq!(totals.tax, dec("360.00"));
        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(totals.total, dec("2360.00"));
    }

    #[test]
    fn test_tax_rounds_to_two_decimals() {
        // 33.33 × 0.18 = 5.9994 -> 6.00
        let totals = SaleTotals::compute(dec("33.33"), dec("0.18"), Decimal::ZERO);
        assert_eq!(totals.tax, dec("6.00"));
        assert_eq!(totals.total, dec("39.33"));
    }

    #[test]
    fn test_discount_subtracts_from_total() {
        let totals = SaleTotals::compute(dec("100.00"), dec("0.18"), dec("10.00"));
        assert_eq!(totals.total, dec("108.00"));
    }

    #[test]
    fn test_zero_rate() {
        let totals = SaleTotals::compute(dec("150.00"), Decimal::ZERO, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, dec("150.00"));
    }
}

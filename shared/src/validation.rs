//! Validation utilities for the Hardware Store Management Platform
//!
//! Pure helpers shared by the engines and the bulk import reconciler.

use rust_decimal::Decimal;
use std::str::FromStr;

// ============================================================================
// Quantity / Price Validations
// ============================================================================

/// Validate a sale or order quantity (must be at least 1)
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Quantity must be at least 1");
    }
    Ok(())
}

/// Validate a received quantity (zero is allowed for partial receiving)
pub fn validate_received_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity < 0 {
        return Err("Received quantity cannot be negative");
    }
    Ok(())
}

/// Validate a monetary amount that may not be negative
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

/// Validate a stock level or alert threshold (zero is valid)
pub fn validate_stock_level(level: i32) -> Result<(), &'static str> {
    if level < 0 {
        return Err("Stock level cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Import Helpers
// ============================================================================

/// Normalize a CSV header name for case-insensitive matching: trim,
/// lowercase, and fold spaces and hyphens into underscores, so that
/// "Purchase Price", "purchase-price" and "purchase_price" all map to the
/// same field.
pub fn normalize_header(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Parse a decimal that may use a comma as the decimal separator
/// (exported spreadsheets from French locales write "12,50")
pub fn parse_lenient_decimal(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Parse an integer field from an import cell
pub fn parse_import_integer(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Quantity / Price Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_received_quantity_allows_zero() {
        assert!(validate_received_quantity(0).is_ok());
        assert!(validate_received_quantity(5).is_ok());
        assert!(validate_received_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(Decimal::new(1250, 2)).is_ok());
        assert!(validate_price(Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_validate_stock_level() {
        assert!(validate_stock_level(0).is_ok());
        assert!(validate_stock_level(42).is_ok());
        assert!(validate_stock_level(-1).is_err());
    }

    // ========================================================================
    // Import Helper Tests
    // ========================================================================

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Purchase Price"), "purchase_price");
        assert_eq!(normalize_header("  purchase-price "), "purchase_price");
        assert_eq!(normalize_header("CATEGORY_ID"), "category_id");
        assert_eq!(normalize_header("name"), "name");
    }

    #[test]
    fn test_parse_lenient_decimal() {
        assert_eq!(
            parse_lenient_decimal("12,50"),
            Some(Decimal::new(1250, 2))
        );
        assert_eq!(
            parse_lenient_decimal(" 12.50 "),
            Some(Decimal::new(1250, 2))
        );
        assert_eq!(parse_lenient_decimal("300"), Some(Decimal::from(300)));
        assert_eq!(parse_lenient_decimal(""), None);
        assert_eq!(parse_lenient_decimal("abc"), None);
    }

    #[test]
    fn test_parse_import_integer() {
        assert_eq!(parse_import_integer(" 15 "), Some(15));
        assert_eq!(parse_import_integer("0"), Some(0));
        assert_eq!(parse_import_integer("1.5"), None);
        assert_eq!(parse_import_integer(""), None);
    }
}

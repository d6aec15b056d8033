//! Product catalog and reference entities

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product in the store catalog
///
/// `current_stock` is a cached figure: every mutation goes through the stock
/// ledger (sales, receipts, manual adjustments), except bulk import which
/// overwrites it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Scannable barcode (EAN-13 or similar), unique when present
    pub barcode: Option<String>,
    /// Supplier or internal reference code, unique when present
    pub reference: Option<String>,
    pub category_id: Uuid,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub current_stock: i32,
    /// Reorder threshold: the product appears on the low-stock list when
    /// `current_stock <= alert_threshold`
    pub alert_threshold: i32,
    /// Aisle/bin location in the store
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product is at or below its reorder threshold
    pub fn needs_reorder(&self) -> bool {
        self.current_stock <= self.alert_threshold
    }
}

/// A product category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A supplier that purchase orders are placed with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

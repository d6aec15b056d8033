//! Product catalog read service
//!
//! Lookup contracts consumed by the engines and by the cart-building
//! caller. Stock is never mutated here; every write goes through the
//! ledger or the bulk import reconciler.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Product;

/// Product catalog service
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Row for product queries
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    barcode: Option<String>,
    reference: Option<String>,
    category_id: Uuid,
    purchase_price: Decimal,
    sale_price: Decimal,
    current_stock: i32,
    alert_threshold: i32,
    location: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            barcode: row.barcode,
            reference: row.reference,
            category_id: row.category_id,
            purchase_price: row.purchase_price,
            sale_price: row.sale_price,
            current_stock: row.current_stock,
            alert_threshold: row.alert_threshold,
            location: row.location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, barcode, reference, category_id, purchase_price, \
                               sale_price, current_stock, alert_threshold, location, \
                               created_at, updated_at";

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get a product by id
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::ProductNotFound(product_id))?;

        Ok(row.into())
    }

    /// Find a product by its barcode
    pub async fn find_by_barcode(&self, barcode: &str) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE barcode = $1 LIMIT 1",
            PRODUCT_COLUMNS
        ))
        .bind(barcode)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Find a product by its reference code
    pub async fn find_by_reference(&self, reference: &str) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE reference = $1 LIMIT 1",
            PRODUCT_COLUMNS
        ))
        .bind(reference)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Product::from))
    }

    /// List all products, alphabetically
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY name ASC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// List products at or below their reorder threshold
    pub async fn list_low_stock(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE current_stock <= alert_threshold ORDER BY name ASC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

//! Sale transaction engine
//!
//! Converts an in-progress cart into a committed sale: re-validates
//! availability against live stock, writes the sale and its items, and
//! decrements stock through the ledger, all in one transaction. Prices are
//! frozen in the cart; the catalog price at finalization time is irrelevant.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ledger::apply_movement;
use shared::models::{Cart, MovementType, Sale, SaleItem, SaleTotals};

/// Sale transaction engine
#[derive(Clone)]
pub struct SalesService {
    db: PgPool,
}

/// Input for finalizing a sale
#[derive(Debug, Deserialize)]
pub struct FinalizeSaleInput {
    pub cart: Cart,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
}

/// A sale with its line items, as returned to the invoice collaborator
#[derive(Debug, Serialize)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Row for sale queries
#[derive(Debug, FromRow)]
struct SaleRow {
    id: Uuid,
    subtotal: Decimal,
    tax: Decimal,
    discount: Decimal,
    total: Decimal,
    user_id: Uuid,
    customer_name: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Sale {
            id: row.id,
            subtotal: row.subtotal,
            tax: row.tax,
            discount: row.discount,
            total: row.total,
            user_id: row.user_id,
            customer_name: row.customer_name,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

/// Row for sale item queries
#[derive(Debug, FromRow)]
struct SaleItemRow {
    id: Uuid,
    sale_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    line_total: Decimal,
}

impl From<SaleItemRow> for SaleItem {
    fn from(row: SaleItemRow) -> Self {
        SaleItem {
            id: row.id,
            sale_id: row.sale_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            line_total: row.line_total,
        }
    }
}

/// Stock snapshot row used for pre-commit re-validation
#[derive(Debug, FromRow)]
struct StockSnapshotRow {
    id: Uuid,
    name: String,
    current_stock: i32,
}

impl SalesService {
    /// Create a new SalesService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Finalize a sale from a cart
    ///
    /// The whole operation is atomic: the sale row, its items, the ledger
    /// entries and the stock decrements all commit together or not at all.
    /// Availability is re-checked here against a fresh snapshot because time
    /// may have passed since the cart was built; the guarded decrement in
    /// the ledger closes the remaining window between snapshot and commit.
    pub async fn finalize_sale(
        &self,
        user_id: Uuid,
        tax_rate: Decimal,
        input: FinalizeSaleInput,
    ) -> AppResult<Sale> {
        let cart = &input.cart;

        if cart.is_empty() {
            return Err(AppError::Validation {
                field: "cart".to_string(),
                message: "The cart is empty; there is nothing to finalize".to_string(),
                message_fr: "Le panier est vide. Impossible de finaliser la vente".to_string(),
            });
        }

        for item in cart.items() {
            if item.quantity < 1 {
                return Err(AppError::Validation {
                    field: "cart".to_string(),
                    message: format!("Invalid quantity for product '{}'", item.name),
                    message_fr: format!("Quantité invalide pour le produit '{}'", item.name),
                });
            }
        }

        let mut tx = self.db.begin().await?;

        // Snapshot current stock for every distinct cart product in one read
        let product_ids: Vec<Uuid> = cart.items().iter().map(|i| i.product_id).collect();
        let snapshot_rows = sqlx::query_as::<_, StockSnapshotRow>(
            "SELECT id, name, current_stock FROM products WHERE id = ANY($1)",
        )
        .bind(&product_ids)
        .fetch_all(&mut *tx)
        .await?;
        let snapshots: HashMap<Uuid, StockSnapshotRow> =
            snapshot_rows.into_iter().map(|r| (r.id, r)).collect();

        // Reject the whole sale if any line exceeds its snapshot stock
        for item in cart.items() {
            let snapshot = snapshots
                .get(&item.product_id)
                .ok_or(AppError::ProductNotFound(item.product_id))?;
            if snapshot.current_stock < item.quantity {
                return Err(AppError::InsufficientStock {
                    product_id: item.product_id,
                    name: snapshot.name.clone(),
                    requested: item.quantity,
                    available: snapshot.current_stock,
                });
            }
        }

        let totals = SaleTotals::compute(cart.subtotal(), tax_rate, Decimal::ZERO);

        let sale_row = sqlx::query_as::<_, SaleRow>(
            r#"
            INSERT INTO sales (subtotal, tax, discount, total, user_id, customer_name, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, subtotal, tax, discount, total, user_id, customer_name, notes, created_at
            "#,
        )
        .bind(totals.subtotal)
        .bind(totals.tax)
        .bind(totals.discount)
        .bind(totals.total)
        .bind(user_id)
        .bind(&input.customer_name)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        for item in cart.items() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, line_total)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(sale_row.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.line_total())
            .execute(&mut *tx)
            .await?;

            let movement_notes =
                format!("Sale #{} ({} x {})", sale_row.id, item.quantity, item.name);
            apply_movement(
                &mut tx,
                item.product_id,
                MovementType::Sale,
                -item.quantity,
                Some(&movement_notes),
                user_id,
            )
            .await?;
        }

        tx.commit().await?;

        debug!(sale_id = %sale_row.id, total = %totals.total, "Finalized sale");

        Ok(sale_row.into())
    }

    /// Get a sale with its items
    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<SaleWithItems> {
        let sale = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, subtotal, tax, discount, total, user_id, customer_name, notes, created_at
            FROM sales
            WHERE id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let items = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price, line_total
            FROM sale_items
            WHERE sale_id = $1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?;

        Ok(SaleWithItems {
            sale: sale.into(),
            items: items.into_iter().map(SaleItem::from).collect(),
        })
    }

    /// List the most recent sales
    pub async fn list_sales(&self, limit: i64) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, subtotal, tax, discount, total, user_id, customer_name, notes, created_at
            FROM sales
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Sale::from).collect())
    }
}

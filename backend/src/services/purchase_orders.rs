//! Purchase order service and lifecycle state machine
//!
//! Orders are created `Pending` with purchase prices frozen at creation
//! time. Status changes never touch stock; only the receiving engine moves
//! an order into `Received`, so the bare status flip the store used to have
//! for that state is deliberately not exposed here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus};
use shared::validation::validate_quantity;

/// Purchase order service
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: PgPool,
}

/// Input for creating a purchase order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub supplier_id: Uuid,
    pub lines: Vec<OrderLineInput>,
    pub notes: Option<String>,
}

/// One requested line on a new purchase order
#[derive(Debug, Deserialize)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A purchase order with its line items
#[derive(Debug, Serialize)]
pub struct PurchaseOrderWithItems {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
}

/// Row for purchase order queries
#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    supplier_id: Uuid,
    total_amount: Decimal,
    status: String,
    user_id: Uuid,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> AppResult<PurchaseOrder> {
        let status = PurchaseOrderStatus::parse(&self.status).ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "unknown purchase order status '{}' on order {}",
                self.status,
                self.id
            ))
        })?;
        Ok(PurchaseOrder {
            id: self.id,
            supplier_id: self.supplier_id,
            total_amount: self.total_amount,
            status,
            user_id: self.user_id,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

/// Row for purchase order item queries
#[derive(Debug, FromRow)]
pub(crate) struct OrderItemRow {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub product_id: Uuid,
    pub quantity_ordered: i32,
    pub quantity_received: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<OrderItemRow> for PurchaseOrderItem {
    fn from(row: OrderItemRow) -> Self {
        PurchaseOrderItem {
            id: row.id,
            purchase_order_id: row.purchase_order_id,
            product_id: row.product_id,
            quantity_ordered: row.quantity_ordered,
            quantity_received: row.quantity_received,
            unit_price: row.unit_price,
            line_total: row.line_total,
        }
    }
}

impl PurchaseOrderService {
    /// Create a new PurchaseOrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a purchase order in the `Pending` state
    ///
    /// Line unit prices are the products' purchase prices at creation time;
    /// later catalog changes do not affect the order.
    pub async fn create_order(
        &self,
        user_id: Uuid,
        input: CreateOrderInput,
    ) -> AppResult<PurchaseOrderWithItems> {
        if input.lines.is_empty() {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "The order is empty; add at least one line".to_string(),
                message_fr: "La commande est vide. Impossible de sauvegarder".to_string(),
            });
        }

        for line in &input.lines {
            if let Err(msg) = validate_quantity(line.quantity) {
                return Err(AppError::Validation {
                    field: "lines".to_string(),
                    message: msg.to_string(),
                    message_fr: "Veuillez saisir une quantité valide (> 0)".to_string(),
                });
            }
        }

        let supplier_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
                .bind(input.supplier_id)
                .fetch_one(&self.db)
                .await?;

        if !supplier_exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        let mut tx = self.db.begin().await?;

        // Freeze purchase prices for every requested product in one read
        let product_ids: Vec<Uuid> = input.lines.iter().map(|l| l.product_id).collect();
        let price_rows = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT id, purchase_price FROM products WHERE id = ANY($1)",
        )
        .bind(&product_ids)
        .fetch_all(&mut *tx)
        .await?;
        let prices: HashMap<Uuid, Decimal> = price_rows.into_iter().collect();

        let mut line_totals: Vec<(Uuid, i32, Decimal, Decimal)> = Vec::new();
        let mut total_amount = Decimal::ZERO;
        for line in &input.lines {
            let unit_price = *prices
                .get(&line.product_id)
                .ok_or(AppError::ProductNotFound(line.product_id))?;
            let line_total = unit_price * Decimal::from(line.quantity);
            total_amount += line_total;
            line_totals.push((line.product_id, line.quantity, unit_price, line_total));
        }

        let order_row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO purchase_orders (supplier_id, total_amount, status, user_id, notes)
            VALUES ($1, $2, 'Pending', $3, $4)
            RETURNING id, supplier_id, total_amount, status, user_id, notes, created_at
            "#,
        )
        .bind(input.supplier_id)
        .bind(total_amount)
        .bind(user_id)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(line_totals.len());
        for (product_id, quantity, unit_price, line_total) in line_totals {
            let item_row = sqlx::query_as::<_, OrderItemRow>(
                r#"
                INSERT INTO purchase_order_items
                    (purchase_order_id, product_id, quantity_ordered, unit_price, line_total)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, purchase_order_id, product_id, quantity_ordered, quantity_received,
                          unit_price, line_total
                "#,
            )
            .bind(order_row.id)
            .bind(product_id)
            .bind(quantity)
            .bind(unit_price)
            .bind(line_total)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item_row.into());
        }

        tx.commit().await?;

        debug!(order_id = %order_row.id, total = %total_amount, "Created purchase order");

        Ok(PurchaseOrderWithItems {
            order: order_row.into_order()?,
            items,
        })
    }

    /// Mark a pending order as sent to the supplier
    pub async fn mark_sent(&self, order_id: Uuid) -> AppResult<PurchaseOrder> {
        self.transition(order_id, PurchaseOrderStatus::Sent).await
    }

    /// Cancel an order that has not been received yet
    pub async fn cancel_order(&self, order_id: Uuid) -> AppResult<PurchaseOrder> {
        self.transition(order_id, PurchaseOrderStatus::Cancelled)
            .await
    }

    /// Apply a status-only transition, enforcing the state machine
    ///
    /// The UPDATE re-checks the current status so that a concurrent
    /// transition cannot slip through between the read and the write.
    async fn transition(
        &self,
        order_id: Uuid,
        requested: PurchaseOrderStatus,
    ) -> AppResult<PurchaseOrder> {
        let current_str =
            sqlx::query_scalar::<_, String>("SELECT status FROM purchase_orders WHERE id = $1")
                .bind(order_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or(AppError::OrderNotFound(order_id))?;

        let current = PurchaseOrderStatus::parse(&current_str).ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "unknown purchase order status '{}' on order {}",
                current_str,
                order_id
            ))
        })?;

        if !current.can_transition_to(requested) {
            return Err(AppError::InvalidStateTransition { current, requested });
        }

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            UPDATE purchase_orders
            SET status = $1
            WHERE id = $2 AND status = $3
            RETURNING id, supplier_id, total_amount, status, user_id, notes, created_at
            "#,
        )
        .bind(requested.as_str())
        .bind(order_id)
        .bind(current.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidStateTransition { current, requested })?;

        debug!(order_id = %order_id, status = %requested, "Purchase order transition");

        row.into_order()
    }

    /// Get an order with its line items
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<PurchaseOrderWithItems> {
        let order = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, supplier_id, total_amount, status, user_id, notes, created_at
            FROM purchase_orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::OrderNotFound(order_id))?;

        let items = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, purchase_order_id, product_id, quantity_ordered, quantity_received,
                   unit_price, line_total
            FROM purchase_order_items
            WHERE purchase_order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(PurchaseOrderWithItems {
            order: order.into_order()?,
            items: items.into_iter().map(PurchaseOrderItem::from).collect(),
        })
    }

    /// List orders, most recent first
    pub async fn list_orders(&self) -> AppResult<Vec<PurchaseOrder>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, supplier_id, total_amount, status, user_id, notes, created_at
            FROM purchase_orders
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }
}

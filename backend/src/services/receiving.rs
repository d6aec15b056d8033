//! Goods receiving engine
//!
//! Applies a goods receipt against a purchase order: each submitted
//! quantity is the amount received in this event (a delta, not a new
//! total). Receiving increments the line's cumulative counter, the
//! product's stock, and the ledger, then closes the order, all in one
//! transaction.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ledger::apply_movement;
use crate::services::purchase_orders::OrderItemRow;
use shared::models::{MovementType, PurchaseOrderStatus};

/// Receiving engine
#[derive(Clone)]
pub struct ReceivingService {
    db: PgPool,
}

/// Input for receiving goods against an order
///
/// Maps line ids to the quantity received in this event. Lines omitted or
/// submitted with zero are left untouched, which is how partial deliveries
/// are recorded.
#[derive(Debug, Deserialize)]
pub struct ReceiveOrderInput {
    pub lines: HashMap<Uuid, i32>,
    pub notes: Option<String>,
}

/// Outcome of a receiving operation
#[derive(Debug, Serialize)]
pub struct ReceiptResult {
    pub order_id: Uuid,
    /// Number of lines whose stock was updated
    pub lines_updated: u32,
    pub status: PurchaseOrderStatus,
}

impl ReceivingService {
    /// Create a new ReceivingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Receive goods against a purchase order
    ///
    /// The order must be `Pending` or `Sent`. After the submitted lines are
    /// processed the order is set to `Received`, even when the receipt was
    /// partial. A second receiving pass against the same order is not
    /// possible; outstanding quantities are settled with the supplier
    /// outside the system.
    pub async fn receive_order(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        input: ReceiveOrderInput,
    ) -> AppResult<ReceiptResult> {
        if input.lines.is_empty() {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "No received quantities were submitted".to_string(),
                message_fr: "Aucune quantité de réception soumise".to_string(),
            });
        }

        for (line_id, quantity) in &input.lines {
            if *quantity < 0 {
                return Err(AppError::Validation {
                    field: "lines".to_string(),
                    message: format!("Received quantity for line {} cannot be negative", line_id),
                    message_fr: "La quantité reçue ne peut pas être négative".to_string(),
                });
            }
        }

        let mut tx = self.db.begin().await?;

        // Lock the order row for the duration of the receipt so that two
        // concurrent deliveries against the same order serialize here
        let current_str = sqlx::query_scalar::<_, String>(
            "SELECT status FROM purchase_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::OrderNotFound(order_id))?;

        let current = PurchaseOrderStatus::parse(&current_str).ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "unknown purchase order status '{}' on order {}",
                current_str,
                order_id
            ))
        })?;

        if !current.is_receivable() {
            return Err(AppError::InvalidStateTransition {
                current,
                requested: PurchaseOrderStatus::Received,
            });
        }

        // Load the order's lines so submitted ids can be checked against them
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, purchase_order_id, product_id, quantity_ordered, quantity_received,
                   unit_price, line_total
            FROM purchase_order_items
            WHERE purchase_order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;
        let items_by_id: HashMap<Uuid, OrderItemRow> =
            item_rows.into_iter().map(|r| (r.id, r)).collect();

        let mut lines_updated = 0u32;
        for (line_id, quantity) in &input.lines {
            let item = items_by_id
                .get(line_id)
                .ok_or(AppError::LineNotFound(*line_id))?;

            // Zero means "nothing arrived for this line in this delivery"
            if *quantity == 0 {
                continue;
            }

            sqlx::query(
                "UPDATE purchase_order_items SET quantity_received = quantity_received + $1 WHERE id = $2",
            )
            .bind(quantity)
            .bind(line_id)
            .execute(&mut *tx)
            .await?;

            let movement_notes = match &input.notes {
                Some(notes) => format!(
                    "Receipt for order #{} (line {}: +{}) - {}",
                    order_id, line_id, quantity, notes
                ),
                None => format!(
                    "Receipt for order #{} (line {}: +{})",
                    order_id, line_id, quantity
                ),
            };
            apply_movement(
                &mut tx,
                item.product_id,
                MovementType::PurchaseReceipt,
                *quantity,
                Some(&movement_notes),
                user_id,
            )
            .await?;

            lines_updated += 1;
        }

        // Close the order; the row lock taken above makes this safe
        sqlx::query("UPDATE purchase_orders SET status = 'Received' WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            order_id = %order_id,
            lines_updated,
            "Received goods against purchase order"
        );

        Ok(ReceiptResult {
            order_id,
            lines_updated,
            status: PurchaseOrderStatus::Received,
        })
    }
}

//! Stock ledger service
//!
//! The ledger is the source of truth for why stock changed. Every mutation
//! of a product's cached `current_stock` goes through [`apply_movement`],
//! which writes the ledger row and the stock delta in the same transaction:
//! either both land or neither does. Entries are append-only; a reversal is
//! a new entry with the opposite sign, never an update or delete.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{MovementType, StockMovement};
use shared::validation::validate_quantity;

/// Service for recording and reading stock movements
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

/// Input for recording a manual stock adjustment
///
/// `quantity` is the positive magnitude entered by the stockist; the stored
/// sign is derived from the movement type.
#[derive(Debug, Deserialize)]
pub struct RecordMovementInput {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Row for movement queries
#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Uuid,
    movement_type: String,
    quantity: i32,
    notes: Option<String>,
    user_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl MovementRow {
    fn into_movement(self) -> AppResult<StockMovement> {
        let movement_type = MovementType::parse(&self.movement_type).ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "unknown movement type '{}' in ledger row {}",
                self.movement_type,
                self.id
            ))
        })?;
        Ok(StockMovement {
            id: self.id,
            product_id: self.product_id,
            movement_type,
            quantity: self.quantity,
            notes: self.notes,
            user_id: self.user_id,
            created_at: self.created_at,
        })
    }
}

/// Apply one signed movement inside an open transaction: adjust the
/// product's cached stock and append the ledger row. The caller's commit or
/// rollback covers both writes.
///
/// Decrements are guarded: the stock update only matches when the resulting
/// stock stays non-negative, so two competing decrements of the last unit
/// cannot both succeed (the loser sees zero affected rows and gets
/// `InsufficientStock`). Increments are unconditional.
pub async fn apply_movement(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    movement_type: MovementType,
    quantity: i32,
    notes: Option<&str>,
    user_id: Uuid,
) -> AppResult<StockMovement> {
    if quantity == 0 {
        return Err(AppError::Validation {
            field: "quantity".to_string(),
            message: "Movement quantity cannot be zero".to_string(),
            message_fr: "La quantité du mouvement ne peut pas être nulle".to_string(),
        });
    }

    let updated = if quantity > 0 {
        sqlx::query(
            "UPDATE products SET current_stock = current_stock + $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(quantity)
        .bind(product_id)
        .execute(&mut **tx)
        .await?
        .rows_affected()
    } else {
        sqlx::query(
            r#"
            UPDATE products
            SET current_stock = current_stock + $1, updated_at = NOW()
            WHERE id = $2 AND current_stock + $1 >= 0
            "#,
        )
        .bind(quantity)
        .bind(product_id)
        .execute(&mut **tx)
        .await?
        .rows_affected()
    };

    if updated == 0 {
        // Distinguish a missing product from an insufficient-stock rejection
        let product = sqlx::query_as::<_, (String, i32)>(
            "SELECT name, current_stock FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;

        return match product {
            Some((name, available)) => Err(AppError::InsufficientStock {
                product_id,
                name,
                requested: -quantity,
                available,
            }),
            None => Err(AppError::ProductNotFound(product_id)),
        };
    }

    let row = sqlx::query_as::<_, MovementRow>(
        r#"
        INSERT INTO stock_movements (product_id, movement_type, quantity, notes, user_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, product_id, movement_type, quantity, notes, user_id, created_at
        "#,
    )
    .bind(product_id)
    .bind(movement_type.as_str())
    .bind(quantity)
    .bind(notes)
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;

    row.into_movement()
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a manual stock adjustment
    ///
    /// Only the manual adjustment types are accepted on this path; sales and
    /// receipts go through their own engines.
    pub async fn record_movement(
        &self,
        user_id: Uuid,
        input: RecordMovementInput,
    ) -> AppResult<StockMovement> {
        if !input.movement_type.is_manual() {
            return Err(AppError::Validation {
                field: "movement_type".to_string(),
                message: "Only manual adjustment movements can be recorded directly".to_string(),
                message_fr: "Seuls les ajustements manuels peuvent être enregistrés directement"
                    .to_string(),
            });
        }

        if let Err(msg) = validate_quantity(input.quantity) {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: msg.to_string(),
                message_fr: "Veuillez saisir une quantité valide (> 0)".to_string(),
            });
        }

        let signed_quantity = input.movement_type.signed(input.quantity);

        let mut tx = self.db.begin().await?;
        let movement = apply_movement(
            &mut tx,
            input.product_id,
            input.movement_type,
            signed_quantity,
            input.notes.as_deref(),
            user_id,
        )
        .await?;
        tx.commit().await?;

        debug!(
            product_id = %input.product_id,
            quantity = signed_quantity,
            "Recorded manual stock movement"
        );

        Ok(movement)
    }

    /// List the most recent movements across all products
    pub async fn list_movements(&self, limit: i64) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, product_id, movement_type, quantity, notes, user_id, created_at
            FROM stock_movements
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(MovementRow::into_movement).collect()
    }

    /// Get the full movement history for a product
    pub async fn list_movements_for_product(
        &self,
        product_id: Uuid,
    ) -> AppResult<Vec<StockMovement>> {
        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !product_exists {
            return Err(AppError::ProductNotFound(product_id));
        }

        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, product_id, movement_type, quantity, notes, user_id, created_at
            FROM stock_movements
            WHERE product_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(MovementRow::into_movement).collect()
    }
}

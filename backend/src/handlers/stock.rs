//! HTTP handlers for stock ledger endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ledger::{LedgerService, RecordMovementInput};
use crate::AppState;
use shared::models::StockMovement;
use shared::types::UserRole;

const MOVEMENT_HISTORY_LIMIT: i64 = 50;

/// Record a manual stock adjustment
pub async fn record_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<Json<StockMovement>> {
    current_user
        .0
        .require_role(&[UserRole::Admin, UserRole::Stockist])?;

    let service = LedgerService::new(state.db);
    let movement = service.record_movement(current_user.0.user_id, input).await?;
    Ok(Json(movement))
}

/// List the most recent stock movements
pub async fn list_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockMovement>>> {
    current_user
        .0
        .require_role(&[UserRole::Admin, UserRole::Stockist])?;

    let service = LedgerService::new(state.db);
    let movements = service.list_movements(MOVEMENT_HISTORY_LIMIT).await?;
    Ok(Json(movements))
}

/// Get the full movement history for a product
pub async fn get_product_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockMovement>>> {
    current_user
        .0
        .require_role(&[UserRole::Admin, UserRole::Stockist])?;

    let service = LedgerService::new(state.db);
    let movements = service.list_movements_for_product(product_id).await?;
    Ok(Json(movements))
}

//! HTTP handlers for point-of-sale endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sales::{FinalizeSaleInput, SaleWithItems, SalesService};
use crate::AppState;
use shared::models::Sale;
use shared::types::UserRole;

const SALES_HISTORY_LIMIT: i64 = 50;

/// Finalize a sale from a cart
pub async fn finalize_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<FinalizeSaleInput>,
) -> AppResult<Json<Sale>> {
    current_user
        .0
        .require_role(&[UserRole::Admin, UserRole::Seller])?;

    let service = SalesService::new(state.db);
    let sale = service
        .finalize_sale(current_user.0.user_id, state.config.sales.tax_rate, input)
        .await?;
    Ok(Json(sale))
}

/// Get a sale with its items (read by the invoice generator)
pub async fn get_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleWithItems>> {
    current_user
        .0
        .require_role(&[UserRole::Admin, UserRole::Seller])?;

    let service = SalesService::new(state.db);
    let sale = service.get_sale(sale_id).await?;
    Ok(Json(sale))
}

/// List recent sales
pub async fn list_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Sale>>> {
    current_user
        .0
        .require_role(&[UserRole::Admin, UserRole::Seller])?;

    let service = SalesService::new(state.db);
    let sales = service.list_sales(SALES_HISTORY_LIMIT).await?;
    Ok(Json(sales))
}

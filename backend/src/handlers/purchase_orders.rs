//! HTTP handlers for purchase order and receiving endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::purchase_orders::{
    CreateOrderInput, PurchaseOrderService, PurchaseOrderWithItems,
};
use crate::services::receiving::{ReceiptResult, ReceiveOrderInput, ReceivingService};
use crate::AppState;
use shared::models::PurchaseOrder;
use shared::types::UserRole;

/// Create a purchase order
pub async fn create_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<PurchaseOrderWithItems>> {
    current_user
        .0
        .require_role(&[UserRole::Admin, UserRole::Stockist])?;

    let service = PurchaseOrderService::new(state.db);
    let order = service.create_order(current_user.0.user_id, input).await?;
    Ok(Json(order))
}

/// List purchase orders
pub async fn list_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<PurchaseOrder>>> {
    current_user
        .0
        .require_role(&[UserRole::Admin, UserRole::Stockist])?;

    let service = PurchaseOrderService::new(state.db);
    let orders = service.list_orders().await?;
    Ok(Json(orders))
}

/// Get a purchase order with its items
pub async fn get_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrderWithItems>> {
    current_user
        .0
        .require_role(&[UserRole::Admin, UserRole::Stockist])?;

    let service = PurchaseOrderService::new(state.db);
    let order = service.get_order(order_id).await?;
    Ok(Json(order))
}

/// Mark a pending order as sent to the supplier
pub async fn mark_order_sent(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrder>> {
    current_user
        .0
        .require_role(&[UserRole::Admin, UserRole::Stockist])?;

    let service = PurchaseOrderService::new(state.db);
    let order = service.mark_sent(order_id).await?;
    Ok(Json(order))
}

/// Cancel an order that has not been received
pub async fn cancel_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrder>> {
    current_user
        .0
        .require_role(&[UserRole::Admin, UserRole::Stockist])?;

    let service = PurchaseOrderService::new(state.db);
    let order = service.cancel_order(order_id).await?;
    Ok(Json(order))
}

/// Receive goods against an order
pub async fn receive_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<ReceiveOrderInput>,
) -> AppResult<Json<ReceiptResult>> {
    current_user
        .0
        .require_role(&[UserRole::Admin, UserRole::Stockist])?;

    let service = ReceivingService::new(state.db);
    let result = service
        .receive_order(current_user.0.user_id, order_id, input)
        .await?;
    Ok(Json(result))
}

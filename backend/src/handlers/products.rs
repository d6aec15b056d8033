//! HTTP handlers for catalog and bulk import endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::catalog::CatalogService;
use crate::services::imports::{ImportService, ImportSummary};
use crate::AppState;
use shared::models::Product;
use shared::types::UserRole;

/// List all products
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    let service = CatalogService::new(state.db);
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Get a product by id
pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// Find a product by scanned barcode
pub async fn find_product_by_barcode(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(barcode): Path<String>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db);
    let product = service
        .find_by_barcode(&barcode)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
    Ok(Json(product))
}

/// Find a product by reference code
pub async fn find_product_by_reference(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(reference): Path<String>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db);
    let product = service
        .find_by_reference(&reference)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
    Ok(Json(product))
}

/// List products at or below their reorder threshold
pub async fn list_low_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    let service = CatalogService::new(state.db);
    let products = service.list_low_stock().await?;
    Ok(Json(products))
}

/// Import products from a `;`-delimited CSV body
pub async fn import_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    body: String,
) -> AppResult<Json<ImportSummary>> {
    current_user.0.require_role(&[UserRole::Admin])?;

    let rows = ImportService::parse_rows(body.as_bytes())?;
    let service = ImportService::new(state.db);
    let summary = service
        .import_products(current_user.0.user_id, rows)
        .await?;
    Ok(Json(summary))
}

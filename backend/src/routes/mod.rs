//! Route definitions for the Hardware Store Management Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - point of sale
        .nest("/sales", sales_routes())
        // Protected routes - supplier orders and receiving
        .nest("/purchase-orders", purchase_order_routes())
        // Protected routes - stock ledger
        .nest("/stock", stock_routes())
        // Protected routes - catalog and bulk import
        .nest("/products", product_routes())
}

/// Point-of-sale routes (protected)
fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::finalize_sale))
        .route("/:sale_id", get(handlers::get_sale))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchase order routes (protected)
fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/send", post(handlers::mark_order_sent))
        .route("/:order_id/cancel", post(handlers::cancel_order))
        .route("/:order_id/receive", post(handlers::receive_order))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock ledger routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/movements",
            get(handlers::list_movements).post(handlers::record_movement),
        )
        .route(
            "/products/:product_id/movements",
            get(handlers::get_product_movements),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Catalog routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products))
        .route("/low-stock", get(handlers::list_low_stock))
        .route("/import", post(handlers::import_products))
        .route("/barcode/:barcode", get(handlers::find_product_by_barcode))
        .route(
            "/reference/:reference",
            get(handlers::find_product_by_reference),
        )
        .route("/:product_id", get(handlers::get_product))
        .route_layer(middleware::from_fn(auth_middleware))
}

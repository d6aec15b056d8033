//! Error handling for the Hardware Store Management Platform
//!
//! Provides consistent error responses in French and English

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::models::PurchaseOrderStatus;
use thiserror::Error;
use uuid::Uuid;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_fr: String,
    },

    // Business logic errors
    #[error("Insufficient stock for product '{name}': requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        name: String,
        requested: i32,
        available: i32,
    },

    #[error("Invalid state transition from '{current}' to '{requested}'")]
    InvalidStateTransition {
        current: PurchaseOrderStatus,
        requested: PurchaseOrderStatus,
    },

    // Reference errors
    #[error("Product {0} not found")]
    ProductNotFound(Uuid),

    #[error("Purchase order {0} not found")]
    OrderNotFound(Uuid),

    #[error("Purchase order line {0} not found")]
    LineNotFound(Uuid),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_fr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "INSUFFICIENT_PERMISSIONS".to_string(),
                    message_en: "You do not have permission to perform this action".to_string(),
                    message_fr: "Vous n'avez pas les permissions pour effectuer cette action"
                        .to_string(),
                    field: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_fr,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_fr: message_fr.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::InsufficientStock {
                name,
                requested,
                available,
                ..
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message_en: format!(
                        "Insufficient stock for product '{}': requested {}, available {}",
                        name, requested, available
                    ),
                    message_fr: format!(
                        "Stock insuffisant pour le produit '{}'. Stock disponible : {}",
                        name, available
                    ),
                    field: None,
                },
            ),
            AppError::InvalidStateTransition { current, requested } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_STATE_TRANSITION".to_string(),
                    message_en: format!(
                        "Cannot move purchase order from '{}' to '{}'",
                        current, requested
                    ),
                    message_fr: format!(
                        "Impossible de passer la commande du statut '{}' au statut '{}'",
                        current, requested
                    ),
                    field: None,
                },
            ),
            AppError::ProductNotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "PRODUCT_NOT_FOUND".to_string(),
                    message_en: format!("Product {} not found", id),
                    message_fr: "Produit introuvable".to_string(),
                    field: None,
                },
            ),
            AppError::OrderNotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "ORDER_NOT_FOUND".to_string(),
                    message_en: format!("Purchase order {} not found", id),
                    message_fr: "Commande fournisseur introuvable".to_string(),
                    field: None,
                },
            ),
            AppError::LineNotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "LINE_NOT_FOUND".to_string(),
                    message_en: format!("Purchase order line {} not found", id),
                    message_fr: "Article de commande introuvable".to_string(),
                    field: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_fr: format!("Introuvable : {}", resource),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_fr: "Une erreur de base de données est survenue".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_fr: "Une erreur interne est survenue".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

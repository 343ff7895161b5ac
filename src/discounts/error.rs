use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

/// Error types for discount and linkage operations
#[derive(Debug, thiserror::Error)]
pub enum DiscountError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Discount not found")]
    NotFound,

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Discount code already exists: {0}")]
    CodeAlreadyExists(String),

    #[error("Discount is already linked to this product")]
    AlreadyLinked,

    #[error("No link found between this product and discount")]
    LinkNotFound,

    #[error("Invalid date window: {0}")]
    InvalidDateWindow(String),

    #[error("Usage cap reached")]
    UsageCapReached,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for DiscountError {
    fn from(err: sqlx::Error) -> Self {
        DiscountError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for DiscountError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            DiscountError::DatabaseError(msg) => {
                tracing::error!("Database error in discounts: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            DiscountError::NotFound => (StatusCode::NOT_FOUND, "Discount not found".to_string()),
            DiscountError::ProductNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Product with id {} not found", id),
            ),
            DiscountError::CodeAlreadyExists(code) => (
                StatusCode::CONFLICT,
                format!("Discount code '{}' already exists", code),
            ),
            DiscountError::AlreadyLinked => (
                StatusCode::CONFLICT,
                "Discount is already linked to this product".to_string(),
            ),
            DiscountError::LinkNotFound => (
                StatusCode::NOT_FOUND,
                "No link found between this product and discount".to_string(),
            ),
            DiscountError::InvalidDateWindow(msg) => (StatusCode::BAD_REQUEST, msg),
            DiscountError::UsageCapReached => (
                StatusCode::CONFLICT,
                "Discount usage cap reached".to_string(),
            ),
            DiscountError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

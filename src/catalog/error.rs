use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Slug already exists: {0}")]
    SlugAlreadyExists(String),

    #[error("SKU already exists: {0}")]
    SkuAlreadyExists(String),

    #[error("Category still has products")]
    CategoryInUse,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl CatalogError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        CatalogError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        CatalogError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            CatalogError::DatabaseError(msg) => {
                tracing::error!("Database error in catalog: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            CatalogError::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                format!("{} with id {} not found", resource, id),
            ),
            CatalogError::SlugAlreadyExists(slug) => (
                StatusCode::CONFLICT,
                format!("Slug '{}' already exists", slug),
            ),
            CatalogError::SkuAlreadyExists(sku) => (
                StatusCode::CONFLICT,
                format!("SKU '{}' already exists", sku),
            ),
            CatalogError::CategoryInUse => (
                StatusCode::CONFLICT,
                "Category still has products and cannot be deleted".to_string(),
            ),
            CatalogError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

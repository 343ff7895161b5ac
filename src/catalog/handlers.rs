// HTTP handlers for catalog endpoints
//
// Product and category reads are public; all mutations sit behind the
// admin role middleware at the router level.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::catalog::error::CatalogError;
use crate::catalog::models::{
    Category, CreateCategoryRequest, CreateProductRequest, Product, ProductResponse,
    UpdateCategoryRequest, UpdateProductRequest,
};
use crate::query::{ProductQueryParams, QueryValidator};

/// Query parameters for product search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// Handler for GET /api/products
///
/// Supports search, price range and active filters, sorting, and
/// pagination. Every returned product carries resolved pricing.
#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("search" = Option<String>, Query, description = "Match against name and description"),
        ("min_price" = Option<String>, Query, description = "Minimum base price (inclusive)"),
        ("max_price" = Option<String>, Query, description = "Maximum base price (inclusive)"),
        ("active" = Option<bool>, Query, description = "Filter by active flag"),
        ("sort" = Option<String>, Query, description = "Sort field: name, price or created"),
        ("order" = Option<String>, Query, description = "Sort order: asc or desc"),
        ("page" = Option<u32>, Query, description = "Page number, 1-indexed"),
        ("limit" = Option<u32>, Query, description = "Items per page, capped at 100")
    ),
    responses(
        (status = 200, description = "List of products with resolved pricing", body = Vec<ProductResponse>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "products"
)]
pub async fn list_products_handler(
    State(state): State<crate::AppState>,
    Query(params): Query<ProductQueryParams>,
) -> Result<Json<Vec<ProductResponse>>, CatalogError> {
    let validated =
        QueryValidator::validate(params).map_err(|e| CatalogError::ValidationError(e.message))?;

    let products = state.catalog_service.list_products(&validated).await?;
    Ok(Json(products))
}

/// Handler for GET /api/products/search?q=term
#[utoipa::path(
    get,
    path = "/api/products/search",
    params(
        ("q" = String, Query, description = "Search term")
    ),
    responses(
        (status = 200, description = "Matching active products", body = Vec<ProductResponse>)
    ),
    tag = "products"
)]
pub async fn search_products_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ProductResponse>>, CatalogError> {
    let term = query.q.trim();
    if term.is_empty() {
        return Err(CatalogError::ValidationError(
            "Search term cannot be empty".to_string(),
        ));
    }

    let products = state.catalog_service.search_products(term).await?;
    Ok(Json(products))
}

/// Handler for GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product with resolved pricing", body = ProductResponse),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn get_product_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, CatalogError> {
    let product = state.catalog_service.get_product(id).await?;
    Ok(Json(product))
}

/// Handler for GET /api/products/slug/{slug}
#[utoipa::path(
    get,
    path = "/api/products/slug/{slug}",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Product with resolved pricing", body = ProductResponse),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn get_product_by_slug_handler(
    State(state): State<crate::AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductResponse>, CatalogError> {
    let product = state.catalog_service.get_product_by_slug(&slug).await?;
    Ok(Json(product))
}

/// Handler for GET /api/products/category/{id}
#[utoipa::path(
    get,
    path = "/api/products/category/{id}",
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Active products in the category", body = Vec<ProductResponse>),
        (status = 404, description = "Category not found")
    ),
    tag = "products"
)]
pub async fn products_in_category_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ProductResponse>>, CatalogError> {
    let products = state.catalog_service.products_in_category(id).await?;
    Ok(Json(products))
}

/// Handler for POST /api/products (admin)
pub async fn create_product_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), CatalogError> {
    request
        .validate()
        .map_err(|e| CatalogError::ValidationError(e.to_string()))?;

    let product = state.catalog_service.create_product(request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Handler for PUT /api/products/{id} (admin)
/// Partial update; omitted fields keep their current values
pub async fn update_product_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Product>, CatalogError> {
    request
        .validate()
        .map_err(|e| CatalogError::ValidationError(e.to_string()))?;

    let product = state.catalog_service.update_product(id, request).await?;
    Ok(Json(product))
}

/// Handler for DELETE /api/products/{id} (admin)
pub async fn delete_product_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CatalogError> {
    state.catalog_service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/categories
pub async fn list_categories_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<Category>>, CatalogError> {
    let categories = state.catalog_service.list_categories().await?;
    Ok(Json(categories))
}

/// Handler for GET /api/categories/{id}
pub async fn get_category_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, CatalogError> {
    let category = state.catalog_service.get_category(id).await?;
    Ok(Json(category))
}

/// Handler for POST /api/categories (admin)
pub async fn create_category_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), CatalogError> {
    request
        .validate()
        .map_err(|e| CatalogError::ValidationError(e.to_string()))?;

    let category = state.catalog_service.create_category(request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Handler for PUT /api/categories/{id} (admin)
pub async fn update_category_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, CatalogError> {
    request
        .validate()
        .map_err(|e| CatalogError::ValidationError(e.to_string()))?;

    let category = state.catalog_service.update_category(id, request).await?;
    Ok(Json(category))
}

/// Handler for DELETE /api/categories/{id} (admin)
/// Rejected with 409 while products still reference the category
pub async fn delete_category_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CatalogError> {
    state.catalog_service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

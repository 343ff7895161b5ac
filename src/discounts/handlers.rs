// HTTP handlers for discount management endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::discounts::{
    CreateDiscountRequest, Discount, DiscountError, LinkDiscountRequest, ProductDiscountLink,
    UnlinkDiscountRequest, UpdateDiscountRequest,
};

/// Handler for POST /api/discounts
/// Creates a new discount rule
pub async fn create_discount_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateDiscountRequest>,
) -> Result<(StatusCode, Json<Discount>), DiscountError> {
    request
        .validate()
        .map_err(|e| DiscountError::ValidationError(e.to_string()))?;

    let discount = state.discount_service.create_discount(request).await?;

    Ok((StatusCode::CREATED, Json(discount)))
}

/// Handler for GET /api/discounts
/// Lists all discount rules
pub async fn list_discounts_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<Discount>>, DiscountError> {
    let discounts = state.discount_service.list_discounts().await?;
    Ok(Json(discounts))
}

/// Handler for GET /api/discounts/{id}
pub async fn get_discount_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Discount>, DiscountError> {
    let discount = state.discount_service.get_discount(id).await?;
    Ok(Json(discount))
}

/// Handler for PUT /api/discounts/{id}
/// Partial update; omitted fields keep their current values
pub async fn update_discount_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDiscountRequest>,
) -> Result<Json<Discount>, DiscountError> {
    request
        .validate()
        .map_err(|e| DiscountError::ValidationError(e.to_string()))?;

    let discount = state.discount_service.update_discount(id, request).await?;
    Ok(Json(discount))
}

/// Handler for DELETE /api/discounts/{id}
/// Deletes the discount and prunes its product links
pub async fn delete_discount_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, DiscountError> {
    state.discount_service.delete_discount(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/discounts/{id}/link
/// Links the discount to a product (optionally a specific product item)
pub async fn link_discount_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<LinkDiscountRequest>,
) -> Result<(StatusCode, Json<ProductDiscountLink>), DiscountError> {
    let link = state
        .discount_service
        .link_product(id, request.product_id, request.product_item_id)
        .await?;

    Ok((StatusCode::CREATED, Json(link)))
}

/// Handler for DELETE /api/discounts/{id}/link
/// Removes the link between the discount and a product
pub async fn unlink_discount_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UnlinkDiscountRequest>,
) -> Result<StatusCode, DiscountError> {
    state
        .discount_service
        .unlink_product(id, request.product_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/discounts/{id}/links
/// Lists the active product links for a discount
pub async fn discount_links_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ProductDiscountLink>>, DiscountError> {
    let links = state.discount_service.links_for_discount(id).await?;
    Ok(Json(links))
}

/// Handler for POST /api/discounts/{id}/redeem
/// Records one redemption against the usage cap (atomic at the storage layer)
pub async fn redeem_discount_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Discount>, DiscountError> {
    let discount = state.discount_service.redeem(id).await?;
    Ok(Json(discount))
}

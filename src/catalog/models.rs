use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::discounts::models::AppliedDiscount;
use crate::validation::{validate_non_negative_price, validate_sku, validate_slug};

/// Category database model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Beverages")]
    pub name: String,
    #[schema(example = "beverages")]
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product database model
///
/// `final_price` is never stored; read paths re-resolve pricing on the fly.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Single-Origin Beans 1kg")]
    pub name: String,
    /// Unique, lowercase
    #[schema(example = "single-origin-beans-1kg")]
    pub slug: String,
    pub description: String,
    #[schema(example = "24.99")]
    pub base_price: Decimal,
    pub category_id: Uuid,
    /// Unique, uppercase
    #[schema(example = "BEANS-1KG")]
    pub sku: String,
    /// Ordered list of image URLs
    pub images: Vec<String>,
    pub is_active: bool,
    /// Free-form metadata map
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product read response: static product fields enriched with resolved
/// pricing
///
/// `final_price` is present only when a discount actually applied, and
/// `applied_discounts` only when non-empty; otherwise both fields are
/// omitted from the JSON rather than duplicating `base_price`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub base_price: Decimal,
    pub category_id: Uuid,
    pub sku: String,
    pub images: Vec<String>,
    pub is_active: bool,
    pub metadata: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_discounts: Option<Vec<AppliedDiscount>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    /// Build a response for a product with no applicable discount
    pub fn without_discount(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            slug: product.slug,
            description: product.description,
            base_price: product.base_price,
            category_id: product.category_id,
            sku: product.sku,
            images: product.images,
            is_active: product.is_active,
            metadata: product.metadata,
            final_price: None,
            applied_discounts: None,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }

    /// Build a response with a resolved final price and the applied discount
    pub fn with_discount(product: Product, final_price: Decimal, applied: AppliedDiscount) -> Self {
        let mut response = Self::without_discount(product);
        response.final_price = Some(final_price);
        response.applied_discounts = Some(vec![applied]);
        response
    }
}

/// Request DTO for creating a product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(custom = "validate_slug")]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom = "validate_non_negative_price")]
    pub base_price: Decimal,
    pub category_id: Uuid,
    #[validate(custom = "validate_sku")]
    pub sku: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_metadata")]
    pub metadata: serde_json::Value,
}

fn default_true() -> bool {
    true
}

fn default_metadata() -> serde_json::Value {
    serde_json::json!({})
}

/// Request DTO for updating a product
/// All fields are optional to support partial updates
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(custom = "validate_slug")]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "validate_non_negative_price")]
    pub base_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    #[validate(custom = "validate_sku")]
    pub sku: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(custom = "validate_slug")]
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

/// Request DTO for updating a category
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(custom = "validate_slug")]
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_product() -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Test Product".to_string(),
            slug: "test-product".to_string(),
            description: "A product".to_string(),
            base_price: dec!(100),
            category_id: Uuid::new_v4(),
            sku: "TEST-1".to_string(),
            images: vec!["https://example.com/a.jpg".to_string()],
            is_active: true,
            metadata: serde_json::json!({"color": "red"}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_response_omits_pricing_fields_without_discount() {
        let response = ProductResponse::without_discount(sample_product());
        let json = serde_json::to_string(&response).unwrap();

        assert!(!json.contains("final_price"));
        assert!(!json.contains("applied_discounts"));
        assert!(json.contains("\"base_price\""));
    }

    #[test]
    fn test_response_includes_pricing_fields_with_discount() {
        let applied = AppliedDiscount {
            id: Uuid::new_v4(),
            name: "Sale".to_string(),
            discount_type: crate::discounts::models::DiscountType::Percentage,
            value: dec!(20),
        };
        let response = ProductResponse::with_discount(sample_product(), dec!(80), applied);
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"final_price\":\"80\""));
        assert!(json.contains("\"applied_discounts\""));
        assert!(json.contains("\"percentage\""));
    }

    #[test]
    fn test_create_product_deserialization_defaults() {
        let json = r#"{
            "name": "Beans",
            "slug": "beans",
            "base_price": "12.50",
            "category_id": "6b9f0f3e-9e7e-4f63-bd2f-0f2ffdbdfd3a",
            "sku": "BEANS-1"
        }"#;

        let request: CreateProductRequest =
            serde_json::from_str(json).expect("Failed to deserialize CreateProductRequest");

        assert!(request.is_active);
        assert!(request.images.is_empty());
        assert_eq!(request.metadata, serde_json::json!({}));
    }
}

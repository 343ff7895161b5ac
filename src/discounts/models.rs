use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_non_negative_price;

/// Discount type enum: percentage off the base price or a fixed amount off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
}

impl DiscountType {
    /// Convert discount type to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::FixedAmount => "fixed_amount",
        }
    }

    /// Parse discount type from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed_amount" => Ok(DiscountType::FixedAmount),
            _ => Err(format!("Invalid discount type: {}", s)),
        }
    }
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model representing a discount rule in the database
///
/// A discount reduces a product's price by a percentage or a fixed amount,
/// bounded by an active window and an optional usage cap. The `usage_count`
/// counter is only ever advanced through the atomic redeem path, never by
/// the read-side pricing resolution.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Discount {
    pub id: Uuid,
    pub code: Option<String>,
    pub name: String,
    pub description: String,
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub is_active: bool,
    pub min_order_value: Option<Decimal>,
    pub min_quantity: Option<i32>,
    pub max_usage_count: Option<i32>,
    pub usage_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Domain model for the many-to-many association between products
/// (optionally a specific product item) and discounts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductDiscountLink {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_item_id: Option<Uuid>,
    pub discount_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Description of the discount that won pricing resolution,
/// embedded in product read responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AppliedDiscount {
    pub id: Uuid,
    pub name: String,
    pub discount_type: DiscountType,
    pub value: Decimal,
}

impl From<&Discount> for AppliedDiscount {
    fn from(discount: &Discount) -> Self {
        Self {
            id: discount.id,
            name: discount.name.clone(),
            discount_type: discount.discount_type,
            value: discount.value,
        }
    }
}

/// Request DTO for creating a discount
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDiscountRequest {
    #[validate(length(min = 3, max = 32, message = "Code must be 3-32 characters"))]
    pub code: Option<String>,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub discount_type: DiscountType,
    #[validate(custom = "validate_non_negative_price")]
    pub value: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub min_order_value: Option<Decimal>,
    #[validate(range(min = 1, message = "Minimum quantity must be at least 1"))]
    pub min_quantity: Option<i32>,
    #[validate(range(min = 1, message = "Maximum usage count must be at least 1"))]
    pub max_usage_count: Option<i32>,
}

fn default_true() -> bool {
    true
}

/// Request DTO for updating a discount
/// All fields are optional to support partial updates
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDiscountRequest {
    #[validate(length(min = 3, max = 32, message = "Code must be 3-32 characters"))]
    pub code: Option<String>,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    #[validate(custom = "validate_non_negative_price")]
    pub value: Option<Decimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub min_order_value: Option<Decimal>,
    #[validate(range(min = 1, message = "Minimum quantity must be at least 1"))]
    pub min_quantity: Option<i32>,
    #[validate(range(min = 1, message = "Maximum usage count must be at least 1"))]
    pub max_usage_count: Option<i32>,
}

/// Request DTO for linking a discount to a product
#[derive(Debug, Deserialize, Validate)]
pub struct LinkDiscountRequest {
    pub product_id: Uuid,
    pub product_item_id: Option<Uuid>,
}

/// Request DTO for unlinking a discount from a product
#[derive(Debug, Deserialize, Validate)]
pub struct UnlinkDiscountRequest {
    pub product_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_type_round_trip() {
        assert_eq!(DiscountType::from_str("percentage").unwrap(), DiscountType::Percentage);
        assert_eq!(DiscountType::from_str("FIXED_AMOUNT").unwrap(), DiscountType::FixedAmount);
        assert_eq!(DiscountType::Percentage.as_str(), "percentage");
        assert_eq!(DiscountType::FixedAmount.as_str(), "fixed_amount");
        assert!(DiscountType::from_str("bogus").is_err());
    }

    #[test]
    fn test_discount_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&DiscountType::FixedAmount).unwrap();
        assert_eq!(json, "\"fixed_amount\"");

        let parsed: DiscountType = serde_json::from_str("\"percentage\"").unwrap();
        assert_eq!(parsed, DiscountType::Percentage);
    }

    #[test]
    fn test_create_discount_deserialization_defaults() {
        let json = r#"{
            "name": "Launch Sale",
            "discount_type": "percentage",
            "value": "20",
            "starts_at": "2026-01-01T00:00:00Z",
            "ends_at": "2026-02-01T00:00:00Z"
        }"#;

        let request: CreateDiscountRequest =
            serde_json::from_str(json).expect("Failed to deserialize CreateDiscountRequest");

        assert_eq!(request.name, "Launch Sale");
        assert!(request.is_active);
        assert!(request.code.is_none());
        assert!(request.max_usage_count.is_none());
        assert_eq!(request.description, "");
    }

    #[test]
    fn test_update_discount_partial_fields() {
        let json = r#"{"value": "15", "is_active": false}"#;

        let request: UpdateDiscountRequest =
            serde_json::from_str(json).expect("Failed to deserialize UpdateDiscountRequest");

        assert_eq!(request.value, Some(Decimal::from(15)));
        assert_eq!(request.is_active, Some(false));
        assert!(request.name.is_none());
        assert!(request.starts_at.is_none());
    }
}

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::catalog::repository::ProductRepository;
use crate::discounts::error::DiscountError;
use crate::discounts::models::{
    CreateDiscountRequest, Discount, DiscountType, ProductDiscountLink, UpdateDiscountRequest,
};
use crate::discounts::repository::{DiscountRepository, LinkRepository};

/// Service for discount and linkage business logic
#[derive(Clone)]
pub struct DiscountService {
    discount_repo: DiscountRepository,
    link_repo: LinkRepository,
    product_repo: ProductRepository,
}

impl DiscountService {
    /// Create a new DiscountService
    pub fn new(
        discount_repo: DiscountRepository,
        link_repo: LinkRepository,
        product_repo: ProductRepository,
    ) -> Self {
        Self {
            discount_repo,
            link_repo,
            product_repo,
        }
    }

    /// Create a new discount
    ///
    /// # Validation
    /// - `starts_at` must be strictly before `ends_at`; violations are
    ///   rejected before anything is persisted
    /// - Percentage values must be within 0-100
    /// - Codes are normalized to uppercase and must be unique
    pub async fn create_discount(
        &self,
        mut request: CreateDiscountRequest,
    ) -> Result<Discount, DiscountError> {
        Self::validate_window(request.starts_at, request.ends_at)?;
        Self::validate_value(request.discount_type, request.value)?;

        if let Some(code) = request.code.take() {
            let code = code.trim().to_uppercase();
            if self.discount_repo.code_exists(&code, None).await? {
                return Err(DiscountError::CodeAlreadyExists(code));
            }
            request.code = Some(code);
        }

        let discount = self.discount_repo.create(&request).await?;

        tracing::info!("Created discount {} ({})", discount.id, discount.name);
        Ok(discount)
    }

    /// Get a discount by ID
    pub async fn get_discount(&self, id: Uuid) -> Result<Discount, DiscountError> {
        self.discount_repo
            .find_by_id(id)
            .await?
            .ok_or(DiscountError::NotFound)
    }

    /// List all discounts, newest first
    pub async fn list_discounts(&self) -> Result<Vec<Discount>, DiscountError> {
        self.discount_repo.find_all().await
    }

    /// Update a discount with provided fields, keeping existing values for
    /// omitted fields
    pub async fn update_discount(
        &self,
        id: Uuid,
        request: UpdateDiscountRequest,
    ) -> Result<Discount, DiscountError> {
        let existing = self
            .discount_repo
            .find_by_id(id)
            .await?
            .ok_or(DiscountError::NotFound)?;

        let code = match request.code {
            Some(code) => {
                let code = code.trim().to_uppercase();
                if self.discount_repo.code_exists(&code, Some(id)).await? {
                    return Err(DiscountError::CodeAlreadyExists(code));
                }
                Some(code)
            }
            None => existing.code,
        };

        let merged = Discount {
            code,
            name: request.name.unwrap_or(existing.name),
            description: request.description.unwrap_or(existing.description),
            discount_type: request.discount_type.unwrap_or(existing.discount_type),
            value: request.value.unwrap_or(existing.value),
            starts_at: request.starts_at.unwrap_or(existing.starts_at),
            ends_at: request.ends_at.unwrap_or(existing.ends_at),
            is_active: request.is_active.unwrap_or(existing.is_active),
            min_order_value: request.min_order_value.or(existing.min_order_value),
            min_quantity: request.min_quantity.or(existing.min_quantity),
            max_usage_count: request.max_usage_count.or(existing.max_usage_count),
            ..existing
        };

        // The merged window must still be ordered even when only one bound
        // was provided
        Self::validate_window(merged.starts_at, merged.ends_at)?;
        Self::validate_value(merged.discount_type, merged.value)?;

        let updated = self.discount_repo.update(&merged).await?;

        tracing::info!("Updated discount {}", updated.id);
        Ok(updated)
    }

    /// Delete a discount, pruning any product links pointing at it
    pub async fn delete_discount(&self, id: Uuid) -> Result<(), DiscountError> {
        if !self.discount_repo.delete(id).await? {
            return Err(DiscountError::NotFound);
        }

        tracing::info!("Deleted discount {}", id);
        Ok(())
    }

    /// Link a discount to a product (optionally a specific product item)
    ///
    /// Both referenced records are checked for existence here; the link
    /// repository itself performs no validation. A duplicate active link is
    /// surfaced as a conflict.
    pub async fn link_product(
        &self,
        discount_id: Uuid,
        product_id: Uuid,
        product_item_id: Option<Uuid>,
    ) -> Result<ProductDiscountLink, DiscountError> {
        self.get_discount(discount_id).await?;

        let product_exists = self
            .product_repo
            .exists(product_id)
            .await
            .map_err(|e| DiscountError::DatabaseError(e.to_string()))?;
        if !product_exists {
            return Err(DiscountError::ProductNotFound(product_id));
        }

        if self
            .link_repo
            .active_link_exists(product_id, discount_id)
            .await?
        {
            return Err(DiscountError::AlreadyLinked);
        }

        let link = self
            .link_repo
            .link(product_id, product_item_id, discount_id)
            .await?;

        tracing::info!(
            "Linked discount {} to product {}",
            discount_id,
            product_id
        );
        Ok(link)
    }

    /// Unlink a discount from a product
    pub async fn unlink_product(
        &self,
        discount_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), DiscountError> {
        if !self.link_repo.unlink(product_id, discount_id).await? {
            return Err(DiscountError::LinkNotFound);
        }

        tracing::info!(
            "Unlinked discount {} from product {}",
            discount_id,
            product_id
        );
        Ok(())
    }

    /// List the active links for a discount
    pub async fn links_for_discount(
        &self,
        discount_id: Uuid,
    ) -> Result<Vec<ProductDiscountLink>, DiscountError> {
        self.get_discount(discount_id).await?;
        self.link_repo.find_by_discount(discount_id).await
    }

    /// Record one redemption of a discount.
    ///
    /// Delegates to the storage layer's atomic conditional increment so that
    /// concurrent redemptions cannot overshoot the usage cap. Returns the
    /// refreshed discount record.
    pub async fn redeem(&self, id: Uuid) -> Result<Discount, DiscountError> {
        let counted = self.discount_repo.increment_usage(id).await?;

        if counted == 0 {
            // Distinguish a missing discount from an exhausted one
            return match self.discount_repo.find_by_id(id).await? {
                Some(_) => Err(DiscountError::UsageCapReached),
                None => Err(DiscountError::NotFound),
            };
        }

        self.get_discount(id).await
    }

    fn validate_window(
        starts_at: chrono::DateTime<chrono::Utc>,
        ends_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), DiscountError> {
        if starts_at >= ends_at {
            return Err(DiscountError::InvalidDateWindow(
                "starts_at must be strictly before ends_at".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_value(
        discount_type: DiscountType,
        value: Decimal,
    ) -> Result<(), DiscountError> {
        if value < Decimal::ZERO {
            return Err(DiscountError::ValidationError(
                "Discount value must not be negative".to_string(),
            ));
        }
        if discount_type == DiscountType::Percentage && value > Decimal::ONE_HUNDRED {
            return Err(DiscountError::ValidationError(
                "Percentage discounts must be between 0 and 100".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_window_rejects_start_after_end() {
        let now = Utc::now();
        let result = DiscountService::validate_window(now + Duration::days(1), now);
        assert!(matches!(result, Err(DiscountError::InvalidDateWindow(_))));
    }

    #[test]
    fn test_window_rejects_equal_bounds() {
        let now = Utc::now();
        let result = DiscountService::validate_window(now, now);
        assert!(matches!(result, Err(DiscountError::InvalidDateWindow(_))));
    }

    #[test]
    fn test_window_accepts_ordered_bounds() {
        let now = Utc::now();
        assert!(DiscountService::validate_window(now, now + Duration::days(1)).is_ok());
    }

    #[test]
    fn test_value_rejects_percentage_over_hundred() {
        let result = DiscountService::validate_value(DiscountType::Percentage, dec!(101));
        assert!(matches!(result, Err(DiscountError::ValidationError(_))));
    }

    #[test]
    fn test_value_accepts_large_fixed_amount() {
        assert!(DiscountService::validate_value(DiscountType::FixedAmount, dec!(500)).is_ok());
    }

    #[test]
    fn test_value_rejects_negative() {
        let result = DiscountService::validate_value(DiscountType::FixedAmount, dec!(-1));
        assert!(matches!(result, Err(DiscountError::ValidationError(_))));
    }
}

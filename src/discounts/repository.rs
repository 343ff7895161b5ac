use sqlx::PgPool;
use uuid::Uuid;

use crate::discounts::error::DiscountError;
use crate::discounts::models::{CreateDiscountRequest, Discount, ProductDiscountLink};

const DISCOUNT_COLUMNS: &str = "id, code, name, description, discount_type, value, starts_at, \
     ends_at, is_active, min_order_value, min_quantity, max_usage_count, usage_count, \
     created_at, updated_at";

/// Repository for discount record operations
#[derive(Clone)]
pub struct DiscountRepository {
    pool: PgPool,
}

impl DiscountRepository {
    /// Create a new DiscountRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new discount record
    ///
    /// The request is expected to be validated and normalized (uppercase
    /// code, ordered date window) by the service layer before it gets here.
    pub async fn create(&self, request: &CreateDiscountRequest) -> Result<Discount, DiscountError> {
        let discount = sqlx::query_as::<_, Discount>(&format!(
            r#"
            INSERT INTO discounts
                (code, name, description, discount_type, value, starts_at, ends_at,
                 is_active, min_order_value, min_quantity, max_usage_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {DISCOUNT_COLUMNS}
            "#
        ))
        .bind(&request.code)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.discount_type)
        .bind(request.value)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .bind(request.is_active)
        .bind(request.min_order_value)
        .bind(request.min_quantity)
        .bind(request.max_usage_count)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return DiscountError::CodeAlreadyExists(
                        request.code.clone().unwrap_or_default(),
                    );
                }
            }
            DiscountError::DatabaseError(e.to_string())
        })?;

        Ok(discount)
    }

    /// Find a discount by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Discount>, DiscountError> {
        let discount = sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(discount)
    }

    /// Find multiple discounts by IDs in a single query
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Discount>, DiscountError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let discounts = sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
    }

    /// List all discounts, newest first
    pub async fn find_all(&self) -> Result<Vec<Discount>, DiscountError> {
        let discounts = sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
    }

    /// Overwrite a discount record with the given merged state
    pub async fn update(&self, discount: &Discount) -> Result<Discount, DiscountError> {
        let updated = sqlx::query_as::<_, Discount>(&format!(
            r#"
            UPDATE discounts
            SET code = $1,
                name = $2,
                description = $3,
                discount_type = $4,
                value = $5,
                starts_at = $6,
                ends_at = $7,
                is_active = $8,
                min_order_value = $9,
                min_quantity = $10,
                max_usage_count = $11,
                updated_at = NOW()
            WHERE id = $12
            RETURNING {DISCOUNT_COLUMNS}
            "#
        ))
        .bind(&discount.code)
        .bind(&discount.name)
        .bind(&discount.description)
        .bind(discount.discount_type)
        .bind(discount.value)
        .bind(discount.starts_at)
        .bind(discount.ends_at)
        .bind(discount.is_active)
        .bind(discount.min_order_value)
        .bind(discount.min_quantity)
        .bind(discount.max_usage_count)
        .bind(discount.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DiscountError::NotFound)?;

        Ok(updated)
    }

    /// Delete a discount, pruning its product links in the same transaction
    ///
    /// Returns whether a discount row was actually removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DiscountError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM product_discount_links WHERE discount_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check if a discount code already exists, optionally excluding one
    /// discount (used when updating)
    pub async fn code_exists(
        &self,
        code: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, DiscountError> {
        let exists: Option<bool> = match exclude_id {
            Some(id) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM discounts WHERE code = $1 AND id != $2)",
                )
                .bind(code)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM discounts WHERE code = $1)")
                    .bind(code)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(exists.unwrap_or(false))
    }

    /// Atomically advance the usage counter, respecting the usage cap.
    ///
    /// Single conditional UPDATE, never a read-modify-write, so concurrent
    /// redemptions cannot lose updates or overshoot the cap. Returns the
    /// number of rows counted (0 when the cap is already reached or the
    /// discount does not exist).
    pub async fn increment_usage(&self, id: Uuid) -> Result<u64, DiscountError> {
        let result = sqlx::query(
            r#"
            UPDATE discounts
            SET usage_count = usage_count + 1, updated_at = NOW()
            WHERE id = $1
              AND (max_usage_count IS NULL OR usage_count < max_usage_count)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Repository for product-discount link operations
///
/// Performs no existence validation on the referenced records; that is the
/// service layer's responsibility.
#[derive(Clone)]
pub struct LinkRepository {
    pool: PgPool,
}

impl LinkRepository {
    /// Create a new LinkRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a link between a product (optionally a specific product item)
    /// and a discount
    pub async fn link(
        &self,
        product_id: Uuid,
        product_item_id: Option<Uuid>,
        discount_id: Uuid,
    ) -> Result<ProductDiscountLink, DiscountError> {
        let link = sqlx::query_as::<_, ProductDiscountLink>(
            r#"
            INSERT INTO product_discount_links (product_id, product_item_id, discount_id)
            VALUES ($1, $2, $3)
            RETURNING id, product_id, product_item_id, discount_id, is_active, created_at
            "#,
        )
        .bind(product_id)
        .bind(product_item_id)
        .bind(discount_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return DiscountError::AlreadyLinked;
                }
            }
            DiscountError::DatabaseError(e.to_string())
        })?;

        Ok(link)
    }

    /// Remove the first link matching the (product, discount) pair.
    ///
    /// Returns whether a link row was found and removed. Unlinking deletes
    /// the row outright; there is no soft flag for removed links.
    pub async fn unlink(&self, product_id: Uuid, discount_id: Uuid) -> Result<bool, DiscountError> {
        let result = sqlx::query(
            r#"
            DELETE FROM product_discount_links
            WHERE id IN (
                SELECT id FROM product_discount_links
                WHERE product_id = $1 AND discount_id = $2
                ORDER BY created_at
                LIMIT 1
            )
            "#,
        )
        .bind(product_id)
        .bind(discount_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Find all active links for a product
    pub async fn find_by_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<ProductDiscountLink>, DiscountError> {
        let links = sqlx::query_as::<_, ProductDiscountLink>(
            r#"
            SELECT id, product_id, product_item_id, discount_id, is_active, created_at
            FROM product_discount_links
            WHERE product_id = $1 AND is_active
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    /// Find all active links for a batch of products in a single query
    pub async fn find_by_products(
        &self,
        product_ids: &[Uuid],
    ) -> Result<Vec<ProductDiscountLink>, DiscountError> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let links = sqlx::query_as::<_, ProductDiscountLink>(
            r#"
            SELECT id, product_id, product_item_id, discount_id, is_active, created_at
            FROM product_discount_links
            WHERE product_id = ANY($1) AND is_active
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    /// Find all active links scoped to a specific product item
    pub async fn find_by_product_item(
        &self,
        product_item_id: Uuid,
    ) -> Result<Vec<ProductDiscountLink>, DiscountError> {
        let links = sqlx::query_as::<_, ProductDiscountLink>(
            r#"
            SELECT id, product_id, product_item_id, discount_id, is_active, created_at
            FROM product_discount_links
            WHERE product_item_id = $1 AND is_active
            "#,
        )
        .bind(product_item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    /// Find all active links for a discount
    pub async fn find_by_discount(
        &self,
        discount_id: Uuid,
    ) -> Result<Vec<ProductDiscountLink>, DiscountError> {
        let links = sqlx::query_as::<_, ProductDiscountLink>(
            r#"
            SELECT id, product_id, product_item_id, discount_id, is_active, created_at
            FROM product_discount_links
            WHERE discount_id = $1 AND is_active
            "#,
        )
        .bind(discount_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    /// Check whether an active link already exists for the pair
    pub async fn active_link_exists(
        &self,
        product_id: Uuid,
        discount_id: Uuid,
    ) -> Result<bool, DiscountError> {
        let exists: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM product_discount_links
                WHERE product_id = $1 AND discount_id = $2 AND is_active
            )
            "#,
        )
        .bind(product_id)
        .bind(discount_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.unwrap_or(false))
    }
}

use sqlx::PgPool;
use uuid::Uuid;

use crate::catalog::error::CatalogError;
use crate::catalog::models::{Category, CreateProductRequest, Product};
use crate::query::{ProductQueryBuilder, ValidatedQuery};

const PRODUCT_COLUMNS: &str = "id, name, slug, description, base_price, category_id, sku, \
     images, is_active, metadata, created_at, updated_at";

const CATEGORY_COLUMNS: &str = "id, name, slug, description, created_at, updated_at";

/// Repository for product operations
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new ProductRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new product record
    ///
    /// Expects an already-normalized request (lowercase slug, uppercase SKU)
    /// from the service layer.
    pub async fn create(&self, request: &CreateProductRequest) -> Result<Product, CatalogError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products
                (name, slug, description, base_price, category_id, sku, images, is_active, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&request.name)
        .bind(&request.slug)
        .bind(&request.description)
        .bind(request.base_price)
        .bind(request.category_id)
        .bind(&request.sku)
        .bind(&request.images)
        .bind(request.is_active)
        .bind(&request.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_unique_violation(e, &request.slug, &request.sku))?;

        Ok(product)
    }

    /// Find a product by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, CatalogError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Find a product by its unique slug
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, CatalogError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Find all active products in a category
    pub async fn find_by_category(&self, category_id: Uuid) -> Result<Vec<Product>, CatalogError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE category_id = $1 AND is_active ORDER BY name"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Full-text-ish search over name and description, active products only
    pub async fn search(&self, term: &str) -> Result<Vec<Product>, CatalogError> {
        let pattern = format!("%{}%", term);
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE (name ILIKE $1 OR description ILIKE $1) AND is_active \
             ORDER BY name LIMIT 50"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// List products with validated filters, sorting, and pagination
    pub async fn list(&self, validated: &ValidatedQuery) -> Result<Vec<Product>, CatalogError> {
        let mut builder = ProductQueryBuilder::new();

        if let Some(ref search) = validated.search {
            builder.add_search_filter(search);
        }
        builder.add_price_range(validated.min_price, validated.max_price);
        if let Some(active) = validated.active {
            builder.add_active_filter(active);
        }
        if let Some(sort_field) = validated.sort_field {
            builder.set_sort(sort_field, validated.sort_order);
        }
        builder.set_pagination(validated.page, validated.limit);

        let (query_str, params) = builder.build();

        let mut query = sqlx::query_as::<_, Product>(&query_str);
        for param in &params {
            query = query.bind(param);
        }

        let products = query.fetch_all(&self.pool).await?;
        Ok(products)
    }

    /// Overwrite a product record with the given merged state
    pub async fn update(&self, product: &Product) -> Result<Product, CatalogError> {
        let updated = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET name = $1,
                slug = $2,
                description = $3,
                base_price = $4,
                category_id = $5,
                sku = $6,
                images = $7,
                is_active = $8,
                metadata = $9,
                updated_at = NOW()
            WHERE id = $10
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.base_price)
        .bind(product.category_id)
        .bind(&product.sku)
        .bind(&product.images)
        .bind(product.is_active)
        .bind(&product.metadata)
        .bind(product.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_unique_violation(e, &product.slug, &product.sku))?
        .ok_or_else(|| CatalogError::not_found("Product", product.id))?;

        Ok(updated)
    }

    /// Delete a product, pruning its discount links in the same transaction
    ///
    /// Returns whether a product row was actually removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, CatalogError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM product_discount_links WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check whether a product exists
    pub async fn exists(&self, id: Uuid) -> Result<bool, CatalogError> {
        let exists: Option<bool> =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.unwrap_or(false))
    }

    /// Check if a slug already exists, optionally excluding one product
    pub async fn slug_exists(
        &self,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, CatalogError> {
        let exists: Option<bool> = match exclude_id {
            Some(id) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM products WHERE slug = $1 AND id != $2)",
                )
                .bind(slug)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
            }
            None => sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?,
        };

        Ok(exists.unwrap_or(false))
    }

    /// Check if a SKU already exists, optionally excluding one product
    pub async fn sku_exists(
        &self,
        sku: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, CatalogError> {
        let exists: Option<bool> = match exclude_id {
            Some(id) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1 AND id != $2)",
                )
                .bind(sku)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
            }
            None => sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)")
                .bind(sku)
                .fetch_one(&self.pool)
                .await?,
        };

        Ok(exists.unwrap_or(false))
    }

    /// Count products referencing a category
    pub async fn count_in_category(&self, category_id: Uuid) -> Result<i64, CatalogError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    fn map_unique_violation(e: sqlx::Error, slug: &str, sku: &str) -> CatalogError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return match db_err.constraint() {
                    Some(name) if name.contains("sku") => {
                        CatalogError::SkuAlreadyExists(sku.to_string())
                    }
                    _ => CatalogError::SlugAlreadyExists(slug.to_string()),
                };
            }
        }
        CatalogError::DatabaseError(e.to_string())
    }
}

/// Repository for category operations
#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new CategoryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new category
    pub async fn create(
        &self,
        name: &str,
        slug: &str,
        description: &str,
    ) -> Result<Category, CatalogError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (name, slug, description)
            VALUES ($1, $2, $3)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(slug)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return CatalogError::SlugAlreadyExists(slug.to_string());
                }
            }
            CatalogError::DatabaseError(e.to_string())
        })?;

        Ok(category)
    }

    /// Find a category by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, CatalogError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// List all categories ordered by name
    pub async fn find_all(&self) -> Result<Vec<Category>, CatalogError> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Overwrite a category with the given merged state
    pub async fn update(&self, category: &Category) -> Result<Category, CatalogError> {
        let updated = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET name = $1, slug = $2, description = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return CatalogError::SlugAlreadyExists(category.slug.clone());
                }
            }
            CatalogError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| CatalogError::not_found("Category", category.id))?;

        Ok(updated)
    }

    /// Delete a category
    ///
    /// Returns whether a row was removed. The service layer is responsible
    /// for rejecting deletion while products still reference the category.
    pub async fn delete(&self, id: Uuid) -> Result<bool, CatalogError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check if a category slug already exists, optionally excluding one
    pub async fn slug_exists(
        &self,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, CatalogError> {
        let exists: Option<bool> = match exclude_id {
            Some(id) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1 AND id != $2)",
                )
                .bind(slug)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
            }
            None => sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?,
        };

        Ok(exists.unwrap_or(false))
    }
}

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::catalog::error::CatalogError;
use crate::catalog::models::{
    Category, CreateCategoryRequest, CreateProductRequest, Product, ProductResponse,
    UpdateCategoryRequest, UpdateProductRequest,
};
use crate::catalog::repository::{CategoryRepository, ProductRepository};
use crate::discounts::models::Discount;
use crate::discounts::repository::{DiscountRepository, LinkRepository};
use crate::discounts::resolver::PricingResolver;
use crate::query::ValidatedQuery;

/// Service layer for catalog operations
///
/// Owns the read-path pricing enrichment: every product read resolves the
/// best applicable discount at request time instead of storing prices.
#[derive(Clone)]
pub struct CatalogService {
    product_repo: ProductRepository,
    category_repo: CategoryRepository,
    link_repo: LinkRepository,
    discount_repo: DiscountRepository,
}

impl CatalogService {
    /// Create a new CatalogService
    pub fn new(
        product_repo: ProductRepository,
        category_repo: CategoryRepository,
        link_repo: LinkRepository,
        discount_repo: DiscountRepository,
    ) -> Self {
        Self {
            product_repo,
            category_repo,
            link_repo,
            discount_repo,
        }
    }

    // ----- products -----

    /// Create a product after normalizing identifiers and checking uniqueness
    pub async fn create_product(
        &self,
        mut request: CreateProductRequest,
    ) -> Result<Product, CatalogError> {
        request.slug = request.slug.trim().to_lowercase();
        request.sku = request.sku.trim().to_uppercase();

        if self
            .category_repo
            .find_by_id(request.category_id)
            .await?
            .is_none()
        {
            return Err(CatalogError::not_found("Category", request.category_id));
        }
        if self.product_repo.slug_exists(&request.slug, None).await? {
            return Err(CatalogError::SlugAlreadyExists(request.slug));
        }
        if self.product_repo.sku_exists(&request.sku, None).await? {
            return Err(CatalogError::SkuAlreadyExists(request.sku));
        }

        let product = self.product_repo.create(&request).await?;
        tracing::info!("Created product {} ({})", product.id, product.slug);

        Ok(product)
    }

    /// Fetch a single product by id with pricing resolved
    pub async fn get_product(&self, id: Uuid) -> Result<ProductResponse, CatalogError> {
        let product = self
            .product_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Product", id))?;

        self.price_product(product).await
    }

    /// Fetch a single product by slug with pricing resolved
    pub async fn get_product_by_slug(&self, slug: &str) -> Result<ProductResponse, CatalogError> {
        let product = self
            .product_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| CatalogError::not_found("Product", slug))?;

        self.price_product(product).await
    }

    /// List products with filters, sorting and pagination, pricing resolved
    pub async fn list_products(
        &self,
        validated: &ValidatedQuery,
    ) -> Result<Vec<ProductResponse>, CatalogError> {
        let products = self.product_repo.list(validated).await?;
        self.price_products(products).await
    }

    /// Search active products by name or description, pricing resolved
    pub async fn search_products(&self, term: &str) -> Result<Vec<ProductResponse>, CatalogError> {
        let products = self.product_repo.search(term).await?;
        self.price_products(products).await
    }

    /// List active products in a category, pricing resolved
    pub async fn products_in_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<ProductResponse>, CatalogError> {
        if self.category_repo.find_by_id(category_id).await?.is_none() {
            return Err(CatalogError::not_found("Category", category_id));
        }

        let products = self.product_repo.find_by_category(category_id).await?;
        self.price_products(products).await
    }

    /// Apply a partial update to a product
    pub async fn update_product(
        &self,
        id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<Product, CatalogError> {
        let existing = self
            .product_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Product", id))?;

        let slug = request
            .slug
            .map(|s| s.trim().to_lowercase())
            .unwrap_or(existing.slug);
        let sku = request
            .sku
            .map(|s| s.trim().to_uppercase())
            .unwrap_or(existing.sku);

        if self.product_repo.slug_exists(&slug, Some(id)).await? {
            return Err(CatalogError::SlugAlreadyExists(slug));
        }
        if self.product_repo.sku_exists(&sku, Some(id)).await? {
            return Err(CatalogError::SkuAlreadyExists(sku));
        }

        let category_id = request.category_id.unwrap_or(existing.category_id);
        if category_id != existing.category_id
            && self.category_repo.find_by_id(category_id).await?.is_none()
        {
            return Err(CatalogError::not_found("Category", category_id));
        }

        let merged = Product {
            name: request.name.unwrap_or(existing.name),
            slug,
            description: request.description.unwrap_or(existing.description),
            base_price: request.base_price.unwrap_or(existing.base_price),
            category_id,
            sku,
            images: request.images.unwrap_or(existing.images),
            is_active: request.is_active.unwrap_or(existing.is_active),
            metadata: request.metadata.unwrap_or(existing.metadata),
            ..existing
        };

        let updated = self.product_repo.update(&merged).await?;
        tracing::info!("Updated product {}", updated.id);

        Ok(updated)
    }

    /// Delete a product along with its discount links
    pub async fn delete_product(&self, id: Uuid) -> Result<(), CatalogError> {
        let deleted = self.product_repo.delete(id).await?;
        if !deleted {
            return Err(CatalogError::not_found("Product", id));
        }

        tracing::info!("Deleted product {}", id);
        Ok(())
    }

    // ----- categories -----

    /// Create a category
    pub async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> Result<Category, CatalogError> {
        let slug = request.slug.trim().to_lowercase();

        if self.category_repo.slug_exists(&slug, None).await? {
            return Err(CatalogError::SlugAlreadyExists(slug));
        }

        let category = self
            .category_repo
            .create(&request.name, &slug, &request.description)
            .await?;
        tracing::info!("Created category {} ({})", category.id, category.slug);

        Ok(category)
    }

    /// Fetch a single category
    pub async fn get_category(&self, id: Uuid) -> Result<Category, CatalogError> {
        self.category_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Category", id))
    }

    /// List all categories
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.category_repo.find_all().await
    }

    /// Apply a partial update to a category
    pub async fn update_category(
        &self,
        id: Uuid,
        request: UpdateCategoryRequest,
    ) -> Result<Category, CatalogError> {
        let existing = self
            .category_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Category", id))?;

        let slug = request
            .slug
            .map(|s| s.trim().to_lowercase())
            .unwrap_or(existing.slug);

        if self.category_repo.slug_exists(&slug, Some(id)).await? {
            return Err(CatalogError::SlugAlreadyExists(slug));
        }

        let merged = Category {
            name: request.name.unwrap_or(existing.name),
            slug,
            description: request.description.unwrap_or(existing.description),
            ..existing
        };

        self.category_repo.update(&merged).await
    }

    /// Delete a category, refusing while products still reference it
    pub async fn delete_category(&self, id: Uuid) -> Result<(), CatalogError> {
        if self.category_repo.find_by_id(id).await?.is_none() {
            return Err(CatalogError::not_found("Category", id));
        }

        let product_count = self.product_repo.count_in_category(id).await?;
        if product_count > 0 {
            tracing::warn!(
                "Refusing to delete category {} with {} products",
                id,
                product_count
            );
            return Err(CatalogError::CategoryInUse);
        }

        self.category_repo.delete(id).await?;
        tracing::info!("Deleted category {}", id);

        Ok(())
    }

    // ----- pricing enrichment -----

    /// Resolve pricing for a single product
    async fn price_product(&self, product: Product) -> Result<ProductResponse, CatalogError> {
        let links = self
            .link_repo
            .find_by_product(product.id)
            .await
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        let discount_ids: Vec<Uuid> = links.iter().map(|l| l.discount_id).collect();
        let discounts = self
            .discount_repo
            .find_by_ids(&discount_ids)
            .await
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        let outcome = PricingResolver::resolve(product.base_price, &discounts, Utc::now());

        Ok(match outcome.applied {
            Some(applied) => ProductResponse::with_discount(product, outcome.final_price, applied),
            None => ProductResponse::without_discount(product),
        })
    }

    /// Resolve pricing for a batch of products with two bulk queries
    ///
    /// Fetches every link for the batch, then every referenced discount, and
    /// resolves in memory so list endpoints stay at a constant query count.
    async fn price_products(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductResponse>, CatalogError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let links = self
            .link_repo
            .find_by_products(&product_ids)
            .await
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        let discount_ids: Vec<Uuid> = links.iter().map(|l| l.discount_id).collect();
        let discounts = self
            .discount_repo
            .find_by_ids(&discount_ids)
            .await
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        let discounts_by_id: HashMap<Uuid, &Discount> =
            discounts.iter().map(|d| (d.id, d)).collect();

        let mut discounts_by_product: HashMap<Uuid, Vec<Discount>> = HashMap::new();
        for link in &links {
            if let Some(discount) = discounts_by_id.get(&link.discount_id) {
                discounts_by_product
                    .entry(link.product_id)
                    .or_default()
                    .push((*discount).clone());
            }
        }

        let now = Utc::now();
        let responses = products
            .into_iter()
            .map(|product| {
                let candidates = discounts_by_product
                    .get(&product.id)
                    .map(|v| v.as_slice())
                    .unwrap_or(&[]);
                let outcome = PricingResolver::resolve(product.base_price, candidates, now);
                match outcome.applied {
                    Some(applied) => {
                        ProductResponse::with_discount(product, outcome.final_price, applied)
                    }
                    None => ProductResponse::without_discount(product),
                }
            })
            .collect();

        Ok(responses)
    }
}

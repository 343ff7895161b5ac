use serde::Deserialize;

/// SQL query builder for constructing parameterized product listing queries
/// Builds a single SQL query with filters, sorting, and pagination
pub struct ProductQueryBuilder {
    base_query: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_clause: Option<String>,
    limit: u32,
    offset: u32,
}

impl ProductQueryBuilder {
    /// Creates a new ProductQueryBuilder with default values
    pub fn new() -> Self {
        Self {
            base_query: "SELECT id, name, slug, description, base_price, category_id, sku, \
                         images, is_active, metadata, created_at, updated_at FROM products"
                .to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_clause: None,
            limit: 10,
            offset: 0,
        }
    }

    /// Adds a search filter matching name or description (case-insensitive)
    pub fn add_search_filter(&mut self, search: &str) {
        let param_index = self.params.len() + 1;
        self.where_clauses.push(format!(
            "(name ILIKE ${0} OR description ILIKE ${0})",
            param_index
        ));
        self.params.push(format!("%{}%", search));
    }

    /// Adds base price range filters (min and/or max, both inclusive)
    ///
    /// Parameters travel as text and are cast to numeric in SQL so the
    /// builder can keep a single homogeneous parameter list.
    pub fn add_price_range(
        &mut self,
        min: Option<rust_decimal::Decimal>,
        max: Option<rust_decimal::Decimal>,
    ) {
        if let Some(min_price) = min {
            let param_index = self.params.len() + 1;
            self.where_clauses
                .push(format!("base_price >= ${}::numeric", param_index));
            self.params.push(min_price.to_string());
        }

        if let Some(max_price) = max {
            let param_index = self.params.len() + 1;
            self.where_clauses
                .push(format!("base_price <= ${}::numeric", param_index));
            self.params.push(max_price.to_string());
        }
    }

    /// Restricts the listing by the active flag
    pub fn add_active_filter(&mut self, active: bool) {
        if active {
            self.where_clauses.push("is_active".to_string());
        } else {
            self.where_clauses.push("NOT is_active".to_string());
        }
    }

    /// Sets the sort order for the query
    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        let field_name = match field {
            SortField::Name => "name",
            SortField::Price => "base_price",
            SortField::Created => "created_at",
        };

        let order_str = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        self.order_clause = Some(format!("{} {}", field_name, order_str));
    }

    /// Sets pagination parameters
    /// Calculates LIMIT and OFFSET based on page number and limit
    pub fn set_pagination(&mut self, page: u32, limit: u32) {
        self.limit = limit;
        self.offset = (page - 1) * limit;
    }

    /// Builds the final SQL query string with all parameters
    /// Returns a tuple of (query_string, parameters)
    pub fn build(&self) -> (String, Vec<String>) {
        let mut query = self.base_query.clone();

        if !self.where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.where_clauses.join(" AND "));
        }

        if let Some(ref order) = self.order_clause {
            query.push_str(" ORDER BY ");
            query.push_str(order);
        }

        // LIMIT and OFFSET are validated integers, embedded directly
        query.push_str(&format!(" LIMIT {}", self.limit));
        query.push_str(&format!(" OFFSET {}", self.offset));

        (query, self.params.clone())
    }
}

impl Default for ProductQueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Query parameters extracted from HTTP product listing requests
/// All fields are optional to support flexible querying
#[derive(Debug, Deserialize)]
pub struct ProductQueryParams {
    /// Search term matched against name and description (case-insensitive)
    pub search: Option<String>,
    /// Minimum base price filter (inclusive)
    pub min_price: Option<rust_decimal::Decimal>,
    /// Maximum base price filter (inclusive)
    pub max_price: Option<rust_decimal::Decimal>,
    /// Filter by active flag
    pub active: Option<bool>,
    /// Sort field: "name", "price" or "created"
    pub sort: Option<String>,
    /// Sort order: "asc" or "desc"
    pub order: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (defaults to 10)
    pub limit: Option<u32>,
}

/// Sort field options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Price,
    Created,
}

/// Sort order options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Validated and normalized query parameters
#[derive(Debug)]
pub struct ValidatedQuery {
    pub search: Option<String>,
    pub min_price: Option<rust_decimal::Decimal>,
    pub max_price: Option<rust_decimal::Decimal>,
    pub active: Option<bool>,
    pub sort_field: Option<SortField>,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

/// Validation error type for query parameters
#[derive(Debug)]
pub struct QueryValidationError {
    pub message: String,
}

impl std::fmt::Display for QueryValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for QueryValidationError {}

/// Query parameter validator
pub struct QueryValidator;

impl QueryValidator {
    /// Validates and normalizes query parameters
    pub fn validate(params: ProductQueryParams) -> Result<ValidatedQuery, QueryValidationError> {
        let search = Self::normalize_string(params.search);

        let min_price = params.min_price;
        let max_price = params.max_price;

        if let Some(min) = min_price {
            Self::validate_price(min, "min_price")?;
        }
        if let Some(max) = max_price {
            Self::validate_price(max, "max_price")?;
        }
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(QueryValidationError {
                    message: "min_price cannot be greater than max_price".to_string(),
                });
            }
        }

        let sort_field = if let Some(sort_str) = params.sort {
            Some(Self::parse_sort_field(&sort_str)?)
        } else {
            None
        };

        let sort_order = if let Some(order_str) = params.order {
            Self::parse_sort_order(&order_str)?
        } else {
            match sort_field {
                Some(SortField::Created) => SortOrder::Desc,
                _ => SortOrder::Asc,
            }
        };

        let page = if let Some(p) = params.page {
            Self::validate_pagination_param(p, "page")?;
            p
        } else {
            1
        };

        let limit = if let Some(l) = params.limit {
            Self::validate_pagination_param(l, "limit")?;
            if l > 100 {
                return Err(QueryValidationError {
                    message: "limit cannot exceed 100".to_string(),
                });
            }
            l
        } else {
            10
        };

        Ok(ValidatedQuery {
            search,
            min_price,
            max_price,
            active: params.active,
            sort_field,
            sort_order,
            page,
            limit,
        })
    }

    /// Normalizes string parameters by trimming whitespace
    /// Returns None if the string is empty or whitespace-only
    fn normalize_string(s: Option<String>) -> Option<String> {
        s.and_then(|s| {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    /// Validates that a price bound is not negative
    fn validate_price(
        price: rust_decimal::Decimal,
        param_name: &str,
    ) -> Result<(), QueryValidationError> {
        if price < rust_decimal::Decimal::ZERO {
            return Err(QueryValidationError {
                message: format!("{} must not be negative", param_name),
            });
        }
        Ok(())
    }

    /// Parses sort field string to SortField enum
    fn parse_sort_field(s: &str) -> Result<SortField, QueryValidationError> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "price" => Ok(SortField::Price),
            "created" => Ok(SortField::Created),
            _ => Err(QueryValidationError {
                message: format!(
                    "Invalid sort field '{}'. Must be 'name', 'price' or 'created'",
                    s
                ),
            }),
        }
    }

    /// Parses sort order string to SortOrder enum
    fn parse_sort_order(s: &str) -> Result<SortOrder, QueryValidationError> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(QueryValidationError {
                message: format!("Invalid sort order '{}'. Must be 'asc' or 'desc'", s),
            }),
        }
    }

    /// Validates pagination parameters (page and limit)
    fn validate_pagination_param(value: u32, param_name: &str) -> Result<(), QueryValidationError> {
        if value == 0 {
            return Err(QueryValidationError {
                message: format!("{} must be a positive number (greater than 0)", param_name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_basic_query() {
        let builder = ProductQueryBuilder::new();
        let (query, params) = builder.build();

        assert!(query.contains("FROM products"));
        assert!(query.contains("LIMIT 10"));
        assert!(query.contains("OFFSET 0"));
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn test_builder_with_search() {
        let mut builder = ProductQueryBuilder::new();
        builder.add_search_filter("beans");
        let (query, params) = builder.build();

        assert!(query.contains("WHERE"));
        assert!(query.contains("name ILIKE $1 OR description ILIKE $1"));
        assert_eq!(params[0], "%beans%");
    }

    #[test]
    fn test_builder_with_price_range() {
        let mut builder = ProductQueryBuilder::new();
        builder.add_price_range(Some(dec!(5.00)), Some(dec!(10.00)));
        let (query, params) = builder.build();

        assert!(query.contains("base_price >= $1::numeric"));
        assert!(query.contains("base_price <= $2::numeric"));
        assert_eq!(params[0], "5.00");
        assert_eq!(params[1], "10.00");
    }

    #[test]
    fn test_builder_with_active_filter() {
        let mut builder = ProductQueryBuilder::new();
        builder.add_active_filter(true);
        let (query, params) = builder.build();

        assert!(query.contains("WHERE is_active"));
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn test_builder_with_sorting() {
        let mut builder = ProductQueryBuilder::new();
        builder.set_sort(SortField::Price, SortOrder::Desc);
        let (query, _) = builder.build();

        assert!(query.contains("ORDER BY base_price DESC"));
    }

    #[test]
    fn test_builder_with_pagination() {
        let mut builder = ProductQueryBuilder::new();
        builder.set_pagination(3, 20);
        let (query, _params) = builder.build();

        assert!(query.contains("LIMIT 20"));
        assert!(query.contains("OFFSET 40"));
    }

    #[test]
    fn test_builder_combined_filters() {
        let mut builder = ProductQueryBuilder::new();
        builder.add_search_filter("coffee");
        builder.add_price_range(Some(dec!(3)), None);
        builder.add_active_filter(true);
        builder.set_sort(SortField::Name, SortOrder::Asc);
        builder.set_pagination(1, 10);

        let (query, params) = builder.build();

        assert!(query.contains("WHERE"));
        assert!(query.contains(" AND "));
        assert!(query.contains("base_price >= $2::numeric"));
        assert!(query.contains("ORDER BY name ASC"));
        assert_eq!(params.len(), 2);
    }

    fn empty_params() -> ProductQueryParams {
        ProductQueryParams {
            search: None,
            min_price: None,
            max_price: None,
            active: None,
            sort: None,
            order: None,
            page: None,
            limit: None,
        }
    }

    #[test]
    fn test_validate_defaults() {
        let validated = QueryValidator::validate(empty_params()).unwrap();
        assert_eq!(validated.page, 1);
        assert_eq!(validated.limit, 10);
        assert_eq!(validated.sort_order, SortOrder::Asc);
        assert!(validated.sort_field.is_none());
    }

    #[test]
    fn test_validate_created_sort_defaults_descending() {
        let mut params = empty_params();
        params.sort = Some("created".to_string());

        let validated = QueryValidator::validate(params).unwrap();
        assert_eq!(validated.sort_field, Some(SortField::Created));
        assert_eq!(validated.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_validate_rejects_inverted_price_range() {
        let mut params = empty_params();
        params.min_price = Some(dec!(10));
        params.max_price = Some(dec!(5));

        assert!(QueryValidator::validate(params).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let mut params = empty_params();
        params.min_price = Some(dec!(-1));

        assert!(QueryValidator::validate(params).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_page() {
        let mut params = empty_params();
        params.page = Some(0);

        assert!(QueryValidator::validate(params).is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_limit() {
        let mut params = empty_params();
        params.limit = Some(500);

        assert!(QueryValidator::validate(params).is_err());
    }

    #[test]
    fn test_normalize_string_trims_and_drops_empty() {
        assert_eq!(
            QueryValidator::normalize_string(Some("  beans  ".to_string())),
            Some("beans".to_string())
        );
        assert_eq!(
            QueryValidator::normalize_string(Some("   ".to_string())),
            None
        );
        assert_eq!(QueryValidator::normalize_string(None), None);
    }

    #[test]
    fn test_parse_sort_field_invalid() {
        assert!(QueryValidator::parse_sort_field("rating").is_err());
    }

    #[test]
    fn test_parse_sort_order_case_insensitive() {
        assert_eq!(
            QueryValidator::parse_sort_order("DESC").unwrap(),
            SortOrder::Desc
        );
        assert!(QueryValidator::parse_sort_order("sideways").is_err());
    }
}

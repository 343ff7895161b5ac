// Validation utilities module
// Provides custom validation functions for domain-specific rules

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

fn slug_regex() -> &'static Regex {
    static SLUG_RE: OnceLock<Regex> = OnceLock::new();
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap())
}

fn sku_regex() -> &'static Regex {
    static SKU_RE: OnceLock<Regex> = OnceLock::new();
    SKU_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9_-]{0,62}[A-Za-z0-9])?$").unwrap())
}

/// Validates a URL slug: lowercase alphanumerics separated by single hyphens
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() || slug.len() > 100 {
        return Err(ValidationError::new("invalid_slug_length"));
    }
    if slug_regex().is_match(&slug.to_lowercase()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_slug_format"))
    }
}

/// Validates a SKU: alphanumerics with interior hyphens or underscores
pub fn validate_sku(sku: &str) -> Result<(), ValidationError> {
    if sku_regex().is_match(sku) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_sku_format"))
    }
}

/// Validates that a price or discount value is non-negative
pub fn validate_non_negative_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        Err(ValidationError::new("price_must_be_non_negative"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_slugs() {
        assert!(validate_slug("beans").is_ok());
        assert!(validate_slug("single-origin-beans-1kg").is_ok());
        assert!(validate_slug("a1-b2").is_ok());
    }

    #[test]
    fn test_invalid_slugs() {
        assert!(validate_slug("").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("trailing-").is_err());
        assert!(validate_slug("double--hyphen").is_err());
        assert!(validate_slug("with space").is_err());
        assert!(validate_slug("with_underscore").is_err());
        assert!(validate_slug(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_valid_skus() {
        assert!(validate_sku("BEANS-1KG").is_ok());
        assert!(validate_sku("A").is_ok());
        assert!(validate_sku("abc_123").is_ok());
    }

    #[test]
    fn test_invalid_skus() {
        assert!(validate_sku("").is_err());
        assert!(validate_sku("-BEANS").is_err());
        assert!(validate_sku("BEANS-").is_err());
        assert!(validate_sku("SKU WITH SPACE").is_err());
        assert!(validate_sku(&"X".repeat(65)).is_err());
    }

    #[test]
    fn test_price_validation() {
        assert!(validate_non_negative_price(&dec!(0)).is_ok());
        assert!(validate_non_negative_price(&dec!(19.99)).is_ok());
        assert!(validate_non_negative_price(&dec!(-0.01)).is_err());
    }
}

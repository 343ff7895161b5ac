// Discount validity evaluation
//
// Pure function of a discount record and wall-clock time. No I/O.

use chrono::{DateTime, Utc};

use crate::discounts::models::Discount;

/// Determine whether a discount is usable at the given instant.
///
/// A discount is usable when all of the following hold, checked in order:
/// 1. Its active flag is set.
/// 2. `now` falls inside the `[starts_at, ends_at]` window (inclusive).
/// 3. Its usage cap, when present, has not been reached.
pub fn is_usable(discount: &Discount, now: DateTime<Utc>) -> bool {
    if !discount.is_active {
        return false;
    }

    if now < discount.starts_at || now > discount.ends_at {
        return false;
    }

    if let Some(max) = discount.max_usage_count {
        if discount.usage_count >= max {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discounts::models::DiscountType;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn test_discount(now: DateTime<Utc>) -> Discount {
        Discount {
            id: Uuid::new_v4(),
            code: None,
            name: "Test".to_string(),
            description: String::new(),
            discount_type: DiscountType::Percentage,
            value: dec!(10),
            starts_at: now - Duration::days(1),
            ends_at: now + Duration::days(1),
            is_active: true,
            min_order_value: None,
            min_quantity: None,
            max_usage_count: None,
            usage_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_usable_inside_window() {
        let now = Utc::now();
        assert!(is_usable(&test_discount(now), now));
    }

    #[test]
    fn test_inactive_discount_is_not_usable() {
        let now = Utc::now();
        let mut discount = test_discount(now);
        discount.is_active = false;
        assert!(!is_usable(&discount, now));
    }

    #[test]
    fn test_not_usable_before_window() {
        let now = Utc::now();
        let mut discount = test_discount(now);
        discount.starts_at = now + Duration::hours(1);
        assert!(!is_usable(&discount, now));
    }

    #[test]
    fn test_not_usable_after_window() {
        let now = Utc::now();
        let mut discount = test_discount(now);
        discount.ends_at = now - Duration::hours(1);
        assert!(!is_usable(&discount, now));
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let now = Utc::now();
        let mut discount = test_discount(now);
        discount.starts_at = now;
        discount.ends_at = now;
        assert!(is_usable(&discount, now));
    }

    #[test]
    fn test_usage_cap_reached() {
        let now = Utc::now();
        let mut discount = test_discount(now);
        discount.max_usage_count = Some(5);
        discount.usage_count = 5;
        assert!(!is_usable(&discount, now));
    }

    #[test]
    fn test_usage_below_cap_is_usable() {
        let now = Utc::now();
        let mut discount = test_discount(now);
        discount.max_usage_count = Some(5);
        discount.usage_count = 4;
        assert!(is_usable(&discount, now));
    }

    #[test]
    fn test_no_cap_ignores_usage_count() {
        let now = Utc::now();
        let mut discount = test_discount(now);
        discount.usage_count = 1_000_000;
        assert!(is_usable(&discount, now));
    }
}

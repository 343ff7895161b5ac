use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::discounts::models::{AppliedDiscount, Discount, DiscountType};
use crate::discounts::validity;

/// Result of pricing resolution for one product
///
/// `applied` is `None` when no linked discount produced a positive saving,
/// in which case `final_price` equals the base price.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingOutcome {
    pub final_price: Decimal,
    pub applied: Option<AppliedDiscount>,
}

impl PricingOutcome {
    /// Outcome when no discount applies: the base price, unchanged
    pub fn base(base_price: Decimal) -> Self {
        Self {
            final_price: base_price,
            applied: None,
        }
    }
}

/// Service for resolving a product's effective sale price from its
/// linked discounts
///
/// This is a best-single-discount model: at most one discount is applied,
/// the one with the largest saving. Discounts never stack; this is the
/// chosen policy, not an oversight.
pub struct PricingResolver;

impl PricingResolver {
    /// Compute the candidate discounted price for a single discount.
    ///
    /// # Arguments
    /// * `base_price` - The product's undiscounted list price
    /// * `discount` - The discount rule to apply
    ///
    /// # Returns
    /// The price after applying the discount, floored at zero so the
    /// price can never go negative.
    pub fn candidate_price(base_price: Decimal, discount: &Discount) -> Decimal {
        let candidate = match discount.discount_type {
            DiscountType::Percentage => {
                base_price * (Decimal::ONE_HUNDRED - discount.value) / Decimal::ONE_HUNDRED
            }
            DiscountType::FixedAmount => base_price - discount.value,
        };

        candidate.max(Decimal::ZERO)
    }

    /// Resolve the effective price for a product given its linked discounts.
    ///
    /// # Arguments
    /// * `base_price` - The product's undiscounted list price
    /// * `discounts` - All discount records linked to the product
    /// * `now` - The instant to evaluate validity windows against
    ///
    /// # Returns
    /// The winning discount's candidate price and a description of the
    /// applied discount, or the base price with nothing applied when no
    /// discount is usable or none beats zero savings.
    ///
    /// Ties on savings are broken by the lower discount id, so resolution
    /// does not depend on the order discounts were fetched in.
    pub fn resolve(
        base_price: Decimal,
        discounts: &[Discount],
        now: DateTime<Utc>,
    ) -> PricingOutcome {
        let mut best: Option<(&Discount, Decimal)> = None;

        for discount in discounts {
            if !validity::is_usable(discount, now) {
                continue;
            }

            let candidate = Self::candidate_price(base_price, discount);
            let savings = base_price - candidate;

            // Only a strictly positive saving can win
            if savings <= Decimal::ZERO {
                continue;
            }

            best = match best {
                None => Some((discount, candidate)),
                Some((current, current_candidate)) => {
                    let current_savings = base_price - current_candidate;
                    if savings > current_savings
                        || (savings == current_savings && discount.id < current.id)
                    {
                        Some((discount, candidate))
                    } else {
                        Some((current, current_candidate))
                    }
                }
            };
        }

        match best {
            Some((discount, final_price)) => PricingOutcome {
                final_price,
                applied: Some(AppliedDiscount::from(discount)),
            },
            None => PricingOutcome::base(base_price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn make_discount(discount_type: DiscountType, value: Decimal, now: DateTime<Utc>) -> Discount {
        Discount {
            id: Uuid::new_v4(),
            code: None,
            name: "Test discount".to_string(),
            description: String::new(),
            discount_type,
            value,
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
    fn test_no_discounts_returns_base_price() {
        let now = Utc::now();
        let outcome = PricingResolver::resolve(dec!(100), &[], now);
        assert_eq!(outcome.final_price, dec!(100));
        assert!(outcome.applied.is_none());
    }

    #[test]
    fn test_percentage_discount_applied() {
        let now = Utc::now();
        let discount = make_discount(DiscountType::Percentage, dec!(20), now);
        let outcome = PricingResolver::resolve(dec!(100), &[discount.clone()], now);

        assert_eq!(outcome.final_price, dec!(80.0));
        let applied = outcome.applied.expect("discount should apply");
        assert_eq!(applied.id, discount.id);
        assert_eq!(applied.value, dec!(20));
        assert_eq!(applied.discount_type, DiscountType::Percentage);
    }

    #[test]
    fn test_fixed_amount_floors_at_zero() {
        let now = Utc::now();
        let discount = make_discount(DiscountType::FixedAmount, dec!(60), now);
        let outcome = PricingResolver::resolve(dec!(50), &[discount], now);

        assert_eq!(outcome.final_price, Decimal::ZERO);
        assert!(outcome.applied.is_some());
    }

    #[test]
    fn test_fixed_amount_discount_applied() {
        let now = Utc::now();
        let discount = make_discount(DiscountType::FixedAmount, dec!(15), now);
        let outcome = PricingResolver::resolve(dec!(40), &[discount], now);

        assert_eq!(outcome.final_price, dec!(25));
    }

    #[test]
    fn test_expired_discount_excluded() {
        let now = Utc::now();
        let mut discount = make_discount(DiscountType::Percentage, dec!(20), now);
        discount.ends_at = now - Duration::hours(1);
        discount.starts_at = now - Duration::days(2);

        let outcome = PricingResolver::resolve(dec!(100), &[discount], now);
        assert_eq!(outcome.final_price, dec!(100));
        assert!(outcome.applied.is_none());
    }

    #[test]
    fn test_future_discount_excluded() {
        let now = Utc::now();
        let mut discount = make_discount(DiscountType::Percentage, dec!(20), now);
        discount.starts_at = now + Duration::hours(1);
        discount.ends_at = now + Duration::days(2);

        let outcome = PricingResolver::resolve(dec!(100), &[discount], now);
        assert!(outcome.applied.is_none());
    }

    #[test]
    fn test_inactive_discount_excluded() {
        let now = Utc::now();
        let mut discount = make_discount(DiscountType::Percentage, dec!(20), now);
        discount.is_active = false;

        let outcome = PricingResolver::resolve(dec!(100), &[discount], now);
        assert_eq!(outcome.final_price, dec!(100));
        assert!(outcome.applied.is_none());
    }

    #[test]
    fn test_usage_cap_reached_excluded() {
        let now = Utc::now();
        let mut discount = make_discount(DiscountType::Percentage, dec!(20), now);
        discount.max_usage_count = Some(5);
        discount.usage_count = 5;

        let outcome = PricingResolver::resolve(dec!(100), &[discount], now);
        assert_eq!(outcome.final_price, dec!(100));
        assert!(outcome.applied.is_none());
    }

    #[test]
    fn test_best_saving_discount_wins() {
        let now = Utc::now();
        let small = make_discount(DiscountType::Percentage, dec!(10), now);
        let large = make_discount(DiscountType::FixedAmount, dec!(30), now);

        // 10% of 100 saves 10; fixed 30 saves 30
        let outcome = PricingResolver::resolve(dec!(100), &[small, large.clone()], now);
        assert_eq!(outcome.final_price, dec!(70));
        assert_eq!(outcome.applied.unwrap().id, large.id);
    }

    #[test]
    fn test_best_saving_wins_regardless_of_order() {
        let now = Utc::now();
        let small = make_discount(DiscountType::Percentage, dec!(10), now);
        let large = make_discount(DiscountType::Percentage, dec!(25), now);

        let outcome = PricingResolver::resolve(dec!(100), &[large.clone(), small], now);
        assert_eq!(outcome.final_price, dec!(75.0));
        assert_eq!(outcome.applied.unwrap().id, large.id);
    }

    #[test]
    fn test_equal_savings_lower_id_wins() {
        let now = Utc::now();
        let mut a = make_discount(DiscountType::Percentage, dec!(20), now);
        let mut b = make_discount(DiscountType::FixedAmount, dec!(20), now);
        a.id = Uuid::from_u128(1);
        b.id = Uuid::from_u128(2);

        // Both save exactly 20 on a base of 100
        let forward = PricingResolver::resolve(dec!(100), &[a.clone(), b.clone()], now);
        let reverse = PricingResolver::resolve(dec!(100), &[b, a.clone()], now);

        assert_eq!(forward.applied.as_ref().unwrap().id, a.id);
        assert_eq!(reverse.applied.as_ref().unwrap().id, a.id);
        assert_eq!(forward.final_price, reverse.final_price);
    }

    #[test]
    fn test_zero_value_discount_not_applied() {
        let now = Utc::now();
        let discount = make_discount(DiscountType::Percentage, dec!(0), now);

        let outcome = PricingResolver::resolve(dec!(100), &[discount], now);
        assert_eq!(outcome.final_price, dec!(100));
        assert!(outcome.applied.is_none());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let now = Utc::now();
        let discounts = vec![
            make_discount(DiscountType::Percentage, dec!(15), now),
            make_discount(DiscountType::FixedAmount, dec!(12), now),
        ];

        let first = PricingResolver::resolve(dec!(100), &discounts, now);
        let second = PricingResolver::resolve(dec!(100), &discounts, now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_hundred_percent_discount_reaches_zero() {
        let now = Utc::now();
        let discount = make_discount(DiscountType::Percentage, dec!(100), now);

        let outcome = PricingResolver::resolve(dec!(59.99), &[discount], now);
        assert_eq!(outcome.final_price, Decimal::ZERO);
        assert!(outcome.applied.is_some());
    }
}

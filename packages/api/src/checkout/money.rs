//! Money math for the checkout pipeline.
//!
//! All arithmetic happens in `rust_decimal` and rounds half-up to two
//! decimal places; integer minor units exist only at the provider boundary.

use cartella_types::{Result, bail};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::PlatformConfig;
use crate::entity::{discount, sea_orm_active_enums::DiscountType};

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed line quantity
pub const MAX_QUANTITY: i32 = 99;

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Σ(unit price × quantity) over the cart lines.
pub fn subtotal(lines: &[(Decimal, i32)]) -> Decimal {
    let sum = lines
        .iter()
        .fold(Decimal::ZERO, |acc, (price, qty)| {
            acc + *price * Decimal::from(*qty)
        });
    round_money(sum)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Applies the configured tax rate and shipping rule on top of a subtotal.
/// Shipping: flat fee below the free threshold, zero at/above it, and zero
/// for orders that ship nothing (course enrollments).
pub fn compute_totals(
    subtotal: Decimal,
    discount: Decimal,
    needs_shipping: bool,
    config: &PlatformConfig,
) -> OrderTotals {
    let tax = round_money(subtotal * config.tax_rate);
    let shipping = if needs_shipping && subtotal < config.free_shipping_threshold {
        config.shipping_flat_fee
    } else {
        Decimal::ZERO
    };
    let discount = round_money(discount.min(subtotal).max(Decimal::ZERO));
    let total = round_money(subtotal + tax + shipping - discount);
    OrderTotals {
        subtotal,
        tax,
        shipping,
        discount,
        total,
    }
}

/// Discount amount a coupon yields against a subtotal, capped at the
/// subtotal. Eligibility (active, window, uses, minimum) is checked by the
/// order builder before this runs.
pub fn discount_amount(coupon: &discount::Model, subtotal: Decimal) -> Decimal {
    let raw = match coupon.discount_type {
        DiscountType::Percentage => subtotal * coupon.discount_value / Decimal::from(100),
        DiscountType::Fixed => coupon.discount_value,
    };
    round_money(raw.min(subtotal).max(Decimal::ZERO))
}

/// Converts a decimal amount to integer minor units (cents/paise) for the
/// provider APIs. Fails rather than truncating sub-cent residue.
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
    let scaled = (amount * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    if scaled != amount * Decimal::from(100) {
        bail!("Amount {} has sub-minor-unit precision", amount);
    }
    match scaled.to_i64() {
        Some(minor) => Ok(minor),
        None => bail!("Amount {} out of range for minor units", amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn config() -> PlatformConfig {
        PlatformConfig {
            currency: "usd".to_string(),
            tax_rate: Decimal::new(10, 2),               // 0.10
            shipping_flat_fee: Decimal::new(1000, 2),    // 10.00
            free_shipping_threshold: Decimal::new(10000, 2), // 100.00
            frontend_url: "http://localhost:5173".to_string(),
        }
    }

    fn coupon(discount_type: DiscountType, value: Decimal) -> discount::Model {
        let now = Utc::now().naive_utc();
        discount::Model {
            id: "disc_1".to_string(),
            code: "TEST".to_string(),
            discount_type,
            discount_value: value,
            min_subtotal: None,
            max_uses: None,
            used_count: 0,
            is_active: true,
            starts_at: now,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn spec_happy_path_totals() {
        // $25.00 x 2 -> subtotal 50.00, tax 5.00, shipping 10.00, total 65.00
        let sub = subtotal(&[(Decimal::new(2500, 2), 2)]);
        assert_eq!(sub, Decimal::new(5000, 2));
        let totals = compute_totals(sub, Decimal::ZERO, true, &config());
        assert_eq!(totals.tax, Decimal::new(500, 2));
        assert_eq!(totals.shipping, Decimal::new(1000, 2));
        assert_eq!(totals.total, Decimal::new(6500, 2));
    }

    #[test]
    fn totals_invariant_holds() {
        let sub = subtotal(&[(Decimal::new(1999, 2), 3), (Decimal::new(499, 2), 1)]);
        let totals = compute_totals(sub, Decimal::new(500, 2), true, &config());
        assert_eq!(
            totals.total,
            totals.subtotal + totals.tax + totals.shipping - totals.discount
        );
    }

    #[test]
    fn free_shipping_at_threshold() {
        let totals = compute_totals(Decimal::new(10000, 2), Decimal::ZERO, true, &config());
        assert_eq!(totals.shipping, Decimal::ZERO);
    }

    #[test]
    fn course_orders_never_ship() {
        let totals = compute_totals(Decimal::new(500, 2), Decimal::ZERO, false, &config());
        assert_eq!(totals.shipping, Decimal::ZERO);
    }

    #[test]
    fn discount_capped_at_subtotal() {
        let totals = compute_totals(Decimal::new(2000, 2), Decimal::new(5000, 2), false, &config());
        assert_eq!(totals.discount, Decimal::new(2000, 2));
        assert_eq!(totals.total, totals.tax);
    }

    #[test]
    fn percentage_coupon() {
        let c = coupon(DiscountType::Percentage, Decimal::from(20));
        assert_eq!(
            discount_amount(&c, Decimal::new(5000, 2)),
            Decimal::new(1000, 2)
        );
    }

    #[test]
    fn fixed_coupon_capped() {
        let c = coupon(DiscountType::Fixed, Decimal::new(9900, 2));
        assert_eq!(
            discount_amount(&c, Decimal::new(5000, 2)),
            Decimal::new(5000, 2)
        );
    }

    #[test]
    fn rounding_is_half_up() {
        // 3 x 3.333 = 9.999 -> 10.00
        let sub = subtotal(&[(Decimal::new(3333, 3), 3)]);
        assert_eq!(sub, Decimal::new(1000, 2));
    }

    #[test]
    fn minor_units_roundtrip() {
        assert_eq!(to_minor_units(Decimal::new(6500, 2)).unwrap(), 6500);
        assert_eq!(to_minor_units(Decimal::ZERO).unwrap(), 0);
        assert!(to_minor_units(Decimal::new(10001, 3)).is_err());
    }
}

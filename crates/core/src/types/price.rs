//! Price arithmetic using decimal math.
//!
//! Catalog prices are stored as plain decimal amounts in the shop currency,
//! with an optional percentage discount applied at display time.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for displayed amounts.
pub const PRICE_SCALE: u32 = 2;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Apply a percentage discount to a price.
///
/// The percentage is clamped to `0..=100`, so malformed catalog data can
/// never produce a negative or inflated price. The result is rounded to
/// [`PRICE_SCALE`] places, midpoints away from zero.
///
/// ```rust
/// # use emporium_core::apply_discount;
/// # use rust_decimal::Decimal;
/// let price = Decimal::new(4999, 2); // 49.99
/// let sale = apply_discount(price, Decimal::from(10));
/// assert_eq!(sale, Decimal::new(4499, 2)); // 44.99
/// ```
#[must_use]
pub fn apply_discount(price: Decimal, percent: Decimal) -> Decimal {
    let percent = percent.clamp(Decimal::ZERO, ONE_HUNDRED);
    let discounted = price * (ONE_HUNDRED - percent) / ONE_HUNDRED;
    discounted.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_discount_zero_is_identity() {
        let price = Decimal::new(1999, 2);
        assert_eq!(apply_discount(price, Decimal::ZERO), price);
    }

    #[test]
    fn test_apply_discount_rounds_half_away_from_zero() {
        // 9.99 * 0.85 = 8.4915 -> 8.49
        assert_eq!(
            apply_discount(Decimal::new(999, 2), Decimal::from(15)),
            Decimal::new(849, 2)
        );
        // 0.05 * 0.5 = 0.025 -> 0.03
        assert_eq!(
            apply_discount(Decimal::new(5, 2), Decimal::from(50)),
            Decimal::new(3, 2)
        );
    }

    #[test]
    fn test_apply_discount_clamps_out_of_range_percentages() {
        let price = Decimal::new(1000, 2);
        assert_eq!(apply_discount(price, Decimal::from(150)), Decimal::ZERO);
        assert_eq!(apply_discount(price, Decimal::from(-20)), price);
    }
}

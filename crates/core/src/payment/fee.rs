//! Application fee arithmetic.
//!
//! Tenants can configure a platform fee in basis points that is passed to
//! the gateway when an intent is created.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Basis points in a whole.
const BPS_SCALE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Compute the application fee for an amount at the given basis points.
///
/// Uses Banker's Rounding (`MidpointNearestEven`) at 2 decimal places, the
/// same strategy used everywhere money is derived rather than entered.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use botica_core::payment::application_fee;
///
/// // 2.5% of 100.00
/// assert_eq!(application_fee(dec!(100.00), 250), dec!(2.50));
/// ```
#[must_use]
pub fn application_fee(amount: Decimal, fee_bps: u32) -> Decimal {
    (amount * Decimal::from(fee_bps) / BPS_SCALE)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_bps_is_free() {
        assert_eq!(application_fee(dec!(100.00), 0), dec!(0.00));
    }

    #[test]
    fn test_typical_fee() {
        // 2.9%
        assert_eq!(application_fee(dec!(50.00), 290), dec!(1.45));
        // 1%
        assert_eq!(application_fee(dec!(19.99), 100), dec!(0.20));
    }

    #[test]
    fn test_bankers_rounding_at_midpoint() {
        // 0.125 rounds to 0.12 (nearest even), 0.135 rounds to 0.14
        assert_eq!(application_fee(dec!(12.50), 100), dec!(0.12));
        assert_eq!(application_fee(dec!(13.50), 100), dec!(0.14));
    }

    #[test]
    fn test_full_bps_is_identity() {
        assert_eq!(application_fee(dec!(42.42), 10_000), dec!(42.42));
    }
}

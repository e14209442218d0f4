//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done in `Decimal`; amounts are rounded to 2 decimal
//! places (half away from zero) only where they are shown or submitted.

use crate::error::CheckoutError;
use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum tender the cash drawer accepts (₱1,000,000)
const MAX_TENDER: f64 = 1_000_000.0;

/// Round to centavos
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert f64 to Decimal (operator keypad input)
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// `amount * percent / 100`, unrounded
#[inline]
pub fn percent_of(amount: Decimal, percent: u32) -> Decimal {
    amount * Decimal::from(percent) / Decimal::ONE_HUNDRED
}

/// Validate a tendered amount typed by the operator
pub fn validate_tender(tendered: f64) -> Result<Decimal, CheckoutError> {
    if !tendered.is_finite() {
        return Err(CheckoutError::InvalidAmount(format!(
            "tendered must be a finite number, got {}",
            tendered
        )));
    }
    if tendered < 0.0 {
        return Err(CheckoutError::InvalidAmount(format!(
            "tendered must be non-negative, got {}",
            tendered
        )));
    }
    if tendered > MAX_TENDER {
        return Err(CheckoutError::InvalidAmount(format!(
            "tendered exceeds maximum allowed ({}), got {}",
            MAX_TENDER, tendered
        )));
    }
    Ok(round_money(to_decimal(tendered)))
}

/// Cash covers the total exactly or more
#[inline]
pub fn is_tender_sufficient(tendered: Decimal, grand_total: Decimal) -> bool {
    round_money(tendered) >= round_money(grand_total)
}

/// `max(0, tendered - grand_total)`, rounded
pub fn change_due(tendered: Decimal, grand_total: Decimal) -> Decimal {
    round_money((tendered - grand_total).max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(round_money(sum_dec), Decimal::new(3, 1));
    }

    #[test]
    fn test_rounding_half_up() {
        assert_eq!(round_money(Decimal::new(5, 3)), Decimal::new(1, 2));
        assert_eq!(round_money(Decimal::new(4, 3)), Decimal::ZERO);
        // 1.125 rounds away from zero, not to even
        assert_eq!(round_money(Decimal::new(1125, 3)), Decimal::new(113, 2));
    }

    #[test]
    fn test_change_due() {
        let total = Decimal::new(11200, 2);
        assert_eq!(change_due(Decimal::from(200), total), Decimal::new(8800, 2));
        assert_eq!(change_due(Decimal::from(100), total), Decimal::ZERO);
        assert_eq!(change_due(total, total), Decimal::ZERO);
    }

    #[test]
    fn test_is_tender_sufficient() {
        let total = Decimal::new(11200, 2);
        assert!(!is_tender_sufficient(Decimal::from(100), total));
        assert!(is_tender_sufficient(Decimal::from(112), total));
        assert!(is_tender_sufficient(Decimal::from(200), total));
        assert!(!is_tender_sufficient(Decimal::new(11199, 2), total));
    }

    #[test]
    fn test_validate_tender() {
        assert_eq!(validate_tender(200.0).unwrap(), Decimal::from(200));
        assert_eq!(validate_tender(99.999).unwrap(), Decimal::new(10000, 2));
        assert!(validate_tender(f64::NAN).is_err());
        assert!(validate_tender(f64::INFINITY).is_err());
        assert!(validate_tender(-1.0).is_err());
        assert!(validate_tender(2_000_000.0).is_err());
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(Decimal::from(1000), 12), Decimal::from(120));
        assert_eq!(percent_of(Decimal::new(3333, 2), 10), Decimal::new(3333, 3));
    }
}

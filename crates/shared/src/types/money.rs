//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary fields are `rust_decimal::Decimal`; these helpers hold the
//! single rounding rule and the amount validation used everywhere.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Errors for monetary values supplied by callers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// Amount is zero or negative where a positive amount is required.
    #[error("Amount must be positive, got {0}")]
    NotPositive(Decimal),
}

/// Rounds a monetary value to 2 decimal places, round-half-up.
///
/// Applied only where a value is persisted or displayed, never
/// mid-calculation. Intermediate `Decimal` arithmetic stays unrounded.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Validates that an amount is strictly positive.
///
/// # Errors
///
/// Returns `MoneyError::NotPositive` for zero or negative amounts.
/// Non-finite values cannot reach this point: `Decimal` has no NaN or
/// infinity representation, and deserialization rejects them.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, MoneyError> {
    if amount <= Decimal::ZERO {
        return Err(MoneyError::NotPositive(amount));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(1.005), dec!(1.01))]
    #[case(dec!(1.004), dec!(1.00))]
    #[case(dec!(2.675), dec!(2.68))]
    #[case(dec!(-1.005), dec!(-1.01))]
    fn test_round_money_half_up(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(input), expected);
    }

    #[test]
    fn test_round_money_no_op_at_two_places() {
        assert_eq!(round_money(dec!(100.25)), dec!(100.25));
        assert_eq!(round_money(dec!(0)), dec!(0));
    }

    #[test]
    fn test_validate_amount_positive() {
        assert_eq!(validate_amount(dec!(0.01)), Ok(dec!(0.01)));
        assert_eq!(validate_amount(dec!(5000)), Ok(dec!(5000)));
    }

    #[test]
    fn test_validate_amount_rejects_zero_and_negative() {
        assert_eq!(
            validate_amount(dec!(0)),
            Err(MoneyError::NotPositive(dec!(0)))
        );
        assert_eq!(
            validate_amount(dec!(-10)),
            Err(MoneyError::NotPositive(dec!(-10)))
        );
    }

    #[test]
    fn test_exact_decimal_comparison() {
        // 0.1 + 0.2 == 0.3 exactly in Decimal, the reason floats are banned.
        assert_eq!(dec!(0.1) + dec!(0.2), dec!(0.3));
    }
}

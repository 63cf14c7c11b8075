//! Money handling in integer cents.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts inside the system are signed integer cents (`i64`). Dollar
//! strings typed into forms (`"$12.34"`) are parsed to cents here, at the
//! edge; the core never re-parses decimal strings.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing a dollar-string into cents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The input is not a decimal number.
    #[error("not a valid dollar amount: {0}")]
    Malformed(String),

    /// The input has sub-cent precision.
    #[error("amounts cannot be more precise than cents: {0}")]
    TooPrecise(String),

    /// Form amounts are entered as non-negative values.
    #[error("amount cannot be negative: {0}")]
    Negative(String),

    /// The amount does not fit in 64-bit cents.
    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

/// Parses a user-entered dollar string (`"$12.34"`, `"12"`, `"0.05"`) into
/// non-negative integer cents.
///
/// # Errors
///
/// Returns `MoneyError` for malformed input, sub-cent precision, negative
/// amounts, or values outside the `i64` cent range.
pub fn parse_dollars(input: &str) -> Result<i64, MoneyError> {
    let trimmed = input.trim().trim_start_matches('$').trim();

    let amount =
        Decimal::from_str(trimmed).map_err(|_| MoneyError::Malformed(input.to_string()))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative(input.to_string()));
    }

    let cents = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| MoneyError::OutOfRange(input.to_string()))?;

    if cents.fract() != Decimal::ZERO {
        return Err(MoneyError::TooPrecise(input.to_string()));
    }

    cents
        .to_i64()
        .ok_or_else(|| MoneyError::OutOfRange(input.to_string()))
}

/// Formats signed cents as a dollar string (`-1234` → `"-$12.34"`).
#[must_use]
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();
    format!("{sign}${}.{:02}", magnitude / 100, magnitude % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("$12.34", 1234)]
    #[case("12.34", 1234)]
    #[case("12", 1200)]
    #[case("0.05", 5)]
    #[case("$ 250.00", 25000)]
    #[case("0", 0)]
    fn test_parse_dollars(#[case] input: &str, #[case] expected: i64) {
        assert_eq!(parse_dollars(input), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("12.3.4")]
    #[case("$")]
    fn test_parse_malformed(#[case] input: &str) {
        assert!(matches!(parse_dollars(input), Err(MoneyError::Malformed(_))));
    }

    #[test]
    fn test_parse_sub_cent_precision() {
        assert!(matches!(
            parse_dollars("12.345"),
            Err(MoneyError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_parse_trailing_zeros_ok() {
        assert_eq!(parse_dollars("12.340"), Ok(1234));
    }

    #[test]
    fn test_parse_negative_rejected() {
        assert!(matches!(
            parse_dollars("-5.00"),
            Err(MoneyError::Negative(_))
        ));
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(1234), "$12.34");
        assert_eq!(format_cents(-1234), "-$12.34");
        assert_eq!(format_cents(5), "$0.05");
        assert_eq!(format_cents(0), "$0.00");
        assert_eq!(format_cents(120_000), "$1200.00");
    }
}

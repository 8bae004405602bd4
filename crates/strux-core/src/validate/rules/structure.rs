//! Structural rules: presence, non-blankness and sign of single fields.

use rust_decimal::Decimal;

use crate::validate::Check;

/// Text must contain something other than whitespace.
pub fn require_non_blank(field: &str, value: &str) -> Check {
    if value.trim().is_empty() {
        return Err(format!("{}: must not be empty or whitespace", field));
    }
    Ok(())
}

/// A list must hold at least one entry.
pub fn require_non_empty<T>(field: &str, values: &[T], what: &str) -> Check {
    if values.is_empty() {
        return Err(format!("{}: at least one {} is required", field, what));
    }
    Ok(())
}

/// A count must not be negative.
pub fn require_non_negative_count(field: &str, value: i64) -> Check {
    if value < 0 {
        return Err(format!("{}: must not be negative (got {})", field, value));
    }
    Ok(())
}

/// An amount must not be negative.
pub fn require_non_negative(field: &str, value: Decimal) -> Check {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(format!("{}: must not be negative (got {})", field, value));
    }
    Ok(())
}

/// A rate must be a fraction between 0 and 1 inclusive.
pub fn require_fraction(field: &str, value: Decimal) -> Check {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(format!(
            "{}: must be a fraction between 0 and 1, e.g. 0.08 for 8% (got {})",
            field, value
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("name", "Ada").is_ok());
        assert_eq!(
            require_non_blank("name", " \t\n").unwrap_err(),
            "name: must not be empty or whitespace"
        );
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("items", &[1], "line item").is_ok());
        assert_eq!(
            require_non_empty::<u8>("items", &[], "line item").unwrap_err(),
            "items: at least one line item is required"
        );
    }

    #[test]
    fn test_require_non_negative() {
        assert!(require_non_negative("x", Decimal::ZERO).is_ok());
        assert!(require_non_negative("x", Decimal::from_str("-0.00").unwrap()).is_ok());
        assert!(require_non_negative("x", Decimal::from_str("-1.5").unwrap()).is_err());
        assert!(require_non_negative_count("q", -1).is_err());
        assert!(require_non_negative_count("q", 0).is_ok());
    }

    #[test]
    fn test_require_fraction() {
        assert!(require_fraction("tax_rate", Decimal::from_str("0.08").unwrap()).is_ok());
        assert!(require_fraction("tax_rate", Decimal::ONE).is_ok());
        let err = require_fraction("tax_rate", Decimal::from(8)).unwrap_err();
        assert!(err.contains("got 8"));
    }
}

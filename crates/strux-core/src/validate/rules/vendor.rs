//! Vendor field format rules.

use super::patterns::TAX_ID;
use crate::validate::Check;

/// Tax identifier must look like `XX-000-0000`.
pub fn check_tax_id(field: &str, value: &str) -> Check {
    if !TAX_ID.is_match(value) {
        return Err(format!(
            "{}: '{}' does not match the format XX-000-0000",
            field, value
        ));
    }
    Ok(())
}

/// Minimal email check: an `@` and a `.` must both be present.
pub fn check_email(field: &str, value: &str) -> Check {
    if !(value.contains('@') && value.contains('.')) {
        return Err(format!(
            "{}: '{}' is not a valid email address (needs '@' and '.')",
            field, value
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tax_id() {
        assert!(check_tax_id("vendor.tax_id", "AB-123-4567").is_ok());
        assert_eq!(
            check_tax_id("vendor.tax_id", "AB1234567").unwrap_err(),
            "vendor.tax_id: 'AB1234567' does not match the format XX-000-0000"
        );
    }

    #[test]
    fn test_check_email() {
        assert!(check_email("vendor.email", "billing@polar.example").is_ok());
        assert!(check_email("vendor.email", "billing@localhost").is_err());
        assert!(check_email("vendor.email", "billing.polar.example").is_err());
    }
}

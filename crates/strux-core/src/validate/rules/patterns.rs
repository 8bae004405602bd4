//! Common regex patterns for field format checks.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Vendor tax identifier: two capital letters, three digits, four digits
    pub static ref TAX_ID: Regex = Regex::new(
        r"^[A-Z]{2}-\d{3}-\d{4}$"
    ).unwrap();

    // Calendar date shape, checked before handing the value to chrono
    pub static ref ISO_DATE: Regex = Regex::new(
        r"^\d{4}-\d{2}-\d{2}$"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_id_pattern() {
        assert!(TAX_ID.is_match("AB-123-4567"));
        assert!(!TAX_ID.is_match("ab-123-4567"));
        assert!(!TAX_ID.is_match("AB-1234-567"));
        assert!(!TAX_ID.is_match(" AB-123-4567"));
    }

    #[test]
    fn test_iso_date_pattern() {
        assert!(ISO_DATE.is_match("2024-01-15"));
        assert!(!ISO_DATE.is_match("2024-1-15"));
        assert!(!ISO_DATE.is_match("15.01.2024"));
    }
}

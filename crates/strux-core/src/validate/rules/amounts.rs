//! Arithmetic rules for line items, tax and grand total.
//!
//! Line totals are checked to the cent. Tax and grand total use a wider
//! tolerance; the two constants are kept separate.

use rust_decimal::Decimal;

use crate::models::invoice::LineItem;
use crate::validate::Check;

/// Allowed gap between a line total and quantity × unit price (0.01).
pub const LINE_ITEM_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Allowed gap for tax amount and grand total (0.05).
pub const AGGREGATE_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Whether two amounts agree within a tolerance. A gap too large to
/// represent never agrees.
pub fn within(actual: Decimal, expected: Decimal, tolerance: Decimal) -> bool {
    actual
        .checked_sub(expected)
        .is_some_and(|gap| gap.abs() <= tolerance)
}

/// A line total must equal quantity × unit price.
pub fn check_line_item_total(index: usize, item: &LineItem) -> Check {
    let Some(expected) = item.expected_total() else {
        return Err(format!(
            "items[{}] ({}): quantity × unit_price overflows",
            index, item.description
        ));
    };
    if within(item.total, expected, LINE_ITEM_TOLERANCE) {
        return Ok(());
    }
    Err(format!(
        "items[{}] ({}): total {:.2} does not match quantity × unit_price = {} × {:.2} = {:.2}",
        index, item.description, item.total, item.quantity, item.unit_price, expected
    ))
}

/// Tax must equal the taxable subtotal × the tax rate.
///
/// `taxable_subtotal` is `None` when summing the items overflowed.
pub fn check_tax_amount(
    tax_amount: Decimal,
    taxable_subtotal: Option<Decimal>,
    tax_rate: Decimal,
) -> Check {
    let Some((taxable_subtotal, expected)) = taxable_subtotal
        .and_then(|subtotal| subtotal.checked_mul(tax_rate).map(|tax| (subtotal, tax)))
    else {
        return Err("tax_amount: taxable subtotal × rate overflows".to_string());
    };
    if within(tax_amount, expected, AGGREGATE_TOLERANCE) {
        return Ok(());
    }
    Err(format!(
        "tax_amount: expected {:.2} (taxable subtotal {:.2} × rate {}), got {:.2}",
        expected,
        taxable_subtotal,
        tax_rate.normalize(),
        tax_amount
    ))
}

/// Grand total must equal subtotal − discount + tax.
///
/// `subtotal` is `None` when summing the items overflowed.
pub fn check_grand_total(
    grand_total: Decimal,
    subtotal: Option<Decimal>,
    discount: Decimal,
    tax_amount: Decimal,
) -> Check {
    let Some((subtotal, expected)) = subtotal.and_then(|subtotal| {
        subtotal
            .checked_sub(discount)
            .and_then(|net| net.checked_add(tax_amount))
            .map(|total| (subtotal, total))
    }) else {
        return Err("grand_total: subtotal - discount + tax overflows".to_string());
    };
    if within(grand_total, expected, AGGREGATE_TOLERANCE) {
        return Ok(());
    }
    Err(format!(
        "grand_total: expected {:.2} (subtotal {:.2} - discount {:.2} + tax {:.2}), got {:.2}",
        expected, subtotal, discount, tax_amount, grand_total
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::Category;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(quantity: i64, unit_price: &str, total: &str) -> LineItem {
        LineItem {
            description: "Consultant Fee".to_string(),
            category: Category::Labor,
            quantity,
            unit_price: dec(unit_price),
            total: dec(total),
            is_taxable: true,
            justification: String::new(),
        }
    }

    #[test]
    fn test_tolerance_constants() {
        assert_eq!(LINE_ITEM_TOLERANCE, dec("0.01"));
        assert_eq!(AGGREGATE_TOLERANCE, dec("0.05"));
    }

    #[test]
    fn test_line_item_total() {
        assert!(check_line_item_total(0, &item(10, "150", "1500")).is_ok());
        assert!(check_line_item_total(0, &item(3, "0.333", "1.00")).is_ok());
        assert!(check_line_item_total(0, &item(3, "0.333", "1.01")).is_err());

        let err = check_line_item_total(2, &item(10, "150", "1400")).unwrap_err();
        assert_eq!(
            err,
            "items[2] (Consultant Fee): total 1400.00 does not match quantity × unit_price = 10 × 150.00 = 1500.00"
        );
    }

    #[test]
    fn test_tax_amount() {
        assert!(check_tax_amount(dec("210.04"), Some(dec("2625")), dec("0.08")).is_ok());

        let err = check_tax_amount(dec("212"), Some(dec("2625")), dec("0.08")).unwrap_err();
        assert_eq!(
            err,
            "tax_amount: expected 210.00 (taxable subtotal 2625.00 × rate 0.08), got 212.00"
        );
    }

    #[test]
    fn test_grand_total() {
        assert!(check_grand_total(dec("2837"), Some(dec("2625")), Decimal::ZERO, dec("212")).is_ok());
        assert!(check_grand_total(dec("2736.95"), Some(dec("2625")), dec("100"), dec("212")).is_ok());

        let err = check_grand_total(dec("2725"), Some(dec("2625")), Decimal::ZERO, dec("212")).unwrap_err();
        assert_eq!(
            err,
            "grand_total: expected 2837.00 (subtotal 2625.00 - discount 0.00 + tax 212.00), got 2725.00"
        );
    }

    #[test]
    fn test_line_item_overflow() {
        let err = check_line_item_total(4, &item(9_000_000_000_000_000_000, "1000000000000000", "1000"))
            .unwrap_err();
        assert_eq!(err, "items[4] (Consultant Fee): quantity × unit_price overflows");
    }

    #[test]
    fn test_aggregate_overflow() {
        assert_eq!(
            check_tax_amount(dec("80"), None, dec("0.08")).unwrap_err(),
            "tax_amount: taxable subtotal × rate overflows"
        );
        assert!(check_tax_amount(Decimal::ZERO, Some(Decimal::MAX), dec("2")).is_err());

        assert_eq!(
            check_grand_total(dec("1080"), None, Decimal::ZERO, dec("80")).unwrap_err(),
            "grand_total: subtotal - discount + tax overflows"
        );
        assert!(check_grand_total(Decimal::ZERO, Some(Decimal::MAX), Decimal::ZERO, Decimal::MAX).is_err());
    }

    #[test]
    fn test_within_unrepresentable_gap() {
        assert!(!within(Decimal::MAX, Decimal::MIN, LINE_ITEM_TOLERANCE));
        assert!(within(Decimal::MAX, Decimal::MAX, LINE_ITEM_TOLERANCE));
    }
}

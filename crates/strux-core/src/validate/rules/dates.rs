//! Calendar date rules.

use chrono::NaiveDate;

use super::patterns::ISO_DATE;
use crate::validate::Check;

/// The only accepted date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if !ISO_DATE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// The field must hold a real calendar date in `YYYY-MM-DD` form.
pub fn check_date_format(field: &str, value: &str) -> Check {
    if parse_date(value).is_none() {
        return Err(format!(
            "{}: '{}' is not a valid date, use YYYY-MM-DD (e.g. 2024-01-01)",
            field, value
        ));
    }
    Ok(())
}

/// The end date must not precede the start date.
///
/// Only applies when both dates parse; malformed dates are reported by
/// [`check_date_format`].
pub fn check_date_order(start: (&str, &str), end: (&str, &str)) -> Check {
    let (start_field, start_value) = start;
    let (end_field, end_value) = end;

    if let (Some(start_date), Some(end_date)) = (parse_date(start_value), parse_date(end_value)) {
        if end_date < start_date {
            return Err(format!(
                "{} ({}) is before {} ({})",
                end_field, end_date, start_field, start_date
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-15"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("2024-1-15"), None);
        assert_eq!(parse_date("15.01.2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_check_date_format_message() {
        assert!(check_date_format("date", "2024-05-15").is_ok());

        let err = check_date_format("start_date", "Dec 1, 2024").unwrap_err();
        assert_eq!(
            err,
            "start_date: 'Dec 1, 2024' is not a valid date, use YYYY-MM-DD (e.g. 2024-01-01)"
        );
    }

    #[test]
    fn test_check_date_order() {
        assert!(check_date_order(("start_date", "2024-10-01"), ("end_date", "2024-12-01")).is_ok());
        assert!(check_date_order(("start_date", "2024-10-01"), ("end_date", "2024-10-01")).is_ok());

        let err = check_date_order(("start_date", "2024-12-01"), ("end_date", "2024-10-15"))
            .unwrap_err();
        assert_eq!(err, "end_date (2024-10-15) is before start_date (2024-12-01)");
    }

    #[test]
    fn test_check_date_order_skips_malformed() {
        assert!(check_date_order(("start_date", "garbage"), ("end_date", "2024-10-15")).is_ok());
    }
}

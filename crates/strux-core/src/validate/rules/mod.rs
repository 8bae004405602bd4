//! Field and cross-field validation rules.

pub mod amounts;
pub mod dates;
pub mod patterns;
pub mod structure;
pub mod vendor;

pub use amounts::{
    check_grand_total, check_line_item_total, check_tax_amount, AGGREGATE_TOLERANCE,
    LINE_ITEM_TOLERANCE,
};
pub use dates::{check_date_format, check_date_order, parse_date, DATE_FORMAT};
pub use vendor::{check_email, check_tax_id};

//! Project invoice schema: vendor, schedule, line items and totals.

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::extraction::Extractable;
use crate::validate::rules::{amounts, dates, structure, vendor};
use crate::validate::{Validate, ValidationErrors};

/// A billed project with its vendor, schedule and line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProjectInvoice {
    /// Name of the project being billed.
    pub project_name: String,

    /// The party issuing the invoice.
    pub vendor: VendorInfo,

    /// Project start date in YYYY-MM-DD format.
    pub start_date: String,

    /// Project end date in YYYY-MM-DD format; must not precede the start date.
    pub end_date: String,

    /// Billed items, in the order they appear in the source.
    pub items: Vec<LineItem>,

    /// Tax rate as a fraction (0.08 for 8%).
    #[schemars(with = "f64")]
    pub tax_rate: Decimal,

    /// Tax charged: sum of taxable item totals times the tax rate.
    #[schemars(with = "f64")]
    pub tax_amount: Decimal,

    /// Discount subtracted from the subtotal.
    #[serde(default)]
    #[schemars(with = "f64")]
    pub discount_amount: Decimal,

    /// Amount payable: subtotal minus discount plus tax.
    #[schemars(with = "f64")]
    pub grand_total: Decimal,

    /// Contradictions found in the source and how they were resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction_notes: Option<String>,
}

/// Invoice issuer details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct VendorInfo {
    /// Vendor's legal or trading name.
    pub name: String,

    /// Tax identifier in the format XX-000-0000.
    pub tax_id: String,

    /// Billing contact email address.
    pub email: String,
}

/// A single billed line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LineItem {
    /// What was delivered.
    pub description: String,

    /// Kind of cost.
    pub category: Category,

    /// Number of units billed.
    pub quantity: i64,

    /// Price per unit.
    #[schemars(with = "f64")]
    pub unit_price: Decimal,

    /// Line total: quantity times unit price.
    #[schemars(with = "f64")]
    pub total: Decimal,

    /// Whether tax applies to this line.
    #[serde(default)]
    pub is_taxable: bool,

    /// Short explanation of how the total was computed.
    #[serde(default, alias = "math_reasoning")]
    pub justification: String,
}

/// Line item cost category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Hours of work.
    Labor,
    /// Physical goods consumed by the project.
    Materials,
    /// Recurring or managed services.
    Services,
    /// Licenses and subscriptions.
    Software,
    /// Equipment.
    Hardware,
    /// Travel and expenses.
    Travel,
    /// Anything else.
    Other,
}

impl Category {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Labor => "labor",
            Category::Materials => "materials",
            Category::Services => "services",
            Category::Software => "software",
            Category::Hardware => "hardware",
            Category::Travel => "travel",
            Category::Other => "other",
        }
    }
}

impl LineItem {
    /// Total implied by quantity and unit price, or `None` on overflow.
    pub fn expected_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

fn checked_sum<'a>(mut items: impl Iterator<Item = &'a LineItem>) -> Option<Decimal> {
    items.try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.total))
}

impl ProjectInvoice {
    /// Sum of the reported line totals, or `None` on overflow.
    pub fn subtotal(&self) -> Option<Decimal> {
        checked_sum(self.items.iter())
    }

    /// Sum of the reported line totals for taxable items, or `None` on overflow.
    pub fn taxable_subtotal(&self) -> Option<Decimal> {
        checked_sum(self.items.iter().filter(|i| i.is_taxable))
    }
}

impl Validate for ProjectInvoice {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        // Structural
        errors.check(structure::require_non_blank("project_name", &self.project_name));
        errors.check(structure::require_non_blank("vendor.name", &self.vendor.name));
        errors.check(structure::require_non_empty("items", &self.items, "line item"));
        for (i, item) in self.items.iter().enumerate() {
            let path = format!("items[{}]", i);
            errors.check(structure::require_non_blank(
                &format!("{}.description", path),
                &item.description,
            ));
            errors.check(structure::require_non_negative_count(
                &format!("{}.quantity", path),
                item.quantity,
            ));
            errors.check(structure::require_non_negative(
                &format!("{}.unit_price", path),
                item.unit_price,
            ));
        }
        errors.check(structure::require_fraction("tax_rate", self.tax_rate));
        errors.check(structure::require_non_negative("discount_amount", self.discount_amount));

        // Dates
        errors.check(dates::check_date_format("start_date", &self.start_date));
        errors.check(dates::check_date_format("end_date", &self.end_date));
        errors.check(dates::check_date_order(
            ("start_date", &self.start_date),
            ("end_date", &self.end_date),
        ));

        // Arithmetic
        for (i, item) in self.items.iter().enumerate() {
            errors.check(amounts::check_line_item_total(i, item));
        }
        errors.check(amounts::check_tax_amount(
            self.tax_amount,
            self.taxable_subtotal(),
            self.tax_rate,
        ));
        errors.check(amounts::check_grand_total(
            self.grand_total,
            self.subtotal(),
            self.discount_amount,
            self.tax_amount,
        ));

        // Vendor formats
        errors.check(vendor::check_tax_id("vendor.tax_id", &self.vendor.tax_id));
        errors.check(vendor::check_email("vendor.email", &self.vendor.email));

        errors
    }
}

impl Extractable for ProjectInvoice {
    const SCHEMA_NAME: &'static str = "project_invoice";
}

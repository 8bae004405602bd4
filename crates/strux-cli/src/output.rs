//! Rendering of extraction results as JSON, YAML or a plain-text table.

use rust_decimal::Decimal;
use serde::Serialize;

use strux_core::models::invoice::ProjectInvoice;
use strux_core::models::notes::MeetingNotes;

/// Output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Human-readable table
    Table,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Table => "txt",
        }
    }
}

/// Schemas that know how to lay themselves out as a table.
pub trait TableView {
    fn render_table(&self) -> String;
}

const WIDTH: usize = 60;

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

/// Tax rate as a whole percentage, or the raw fraction if scaling overflows.
fn percent(rate: Decimal) -> String {
    match rate.checked_mul(Decimal::ONE_HUNDRED) {
        Some(pct) => pct.round().normalize().to_string(),
        None => rate.normalize().to_string(),
    }
}

impl TableView for ProjectInvoice {
    fn render_table(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("\n{}", "=".repeat(WIDTH)));
        lines.push(format!("PROJECT: {}", self.project_name));
        lines.push(format!("VENDOR:  {} ({})", self.vendor.name, self.vendor.email));
        lines.push(format!("TAX ID:  {}", self.vendor.tax_id));
        lines.push(format!("DATES:   {} to {}", self.start_date, self.end_date));
        lines.push("-".repeat(WIDTH));
        lines.push(format!("{:<25} | {:<3} | {:<8} | {:<10}", "Description", "Qty", "Unit", "Total"));
        for item in &self.items {
            let description: String = item.description.chars().take(25).collect();
            let tax_mark = if item.is_taxable { "*" } else { " " };
            lines.push(format!(
                "{:<25} | {:<3} | ${:>7} | ${:>9}{}",
                description,
                item.quantity,
                money(item.unit_price),
                money(item.total),
                tax_mark
            ));
        }
        lines.push("-".repeat(WIDTH));
        let subtotal = self.subtotal().map(money).unwrap_or_else(|| "overflow".to_string());
        lines.push(format!("SUBTOTAL:     ${:>36}", subtotal));
        lines.push(format!("DISCOUNT:    -${:>36}", money(self.discount_amount)));
        lines.push(format!(
            "TAX ({:>2}%):     +${:>36}",
            percent(self.tax_rate),
            money(self.tax_amount)
        ));
        lines.push(format!("GRAND TOTAL:  ${:>36}", money(self.grand_total)));
        lines.push("=".repeat(WIDTH));
        if let Some(notes) = self.correction_notes.as_deref().filter(|n| !n.trim().is_empty()) {
            lines.push(format!("\nNOTES: {}", notes));
        }
        lines.join("\n")
    }
}

impl TableView for MeetingNotes {
    fn render_table(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("\n{}", "=".repeat(WIDTH)));
        lines.push(format!("NAME: {}", self.name));
        lines.push(format!("DATE: {}", self.date));
        lines.push("-".repeat(WIDTH));
        lines.push("ACTION ITEMS:".to_string());
        for item in &self.action_items {
            lines.push(format!("  - {}", item));
        }
        lines.push("=".repeat(WIDTH));
        lines.join("\n")
    }
}

pub fn render_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn render_yaml<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

pub fn render_table<T: TableView>(value: &T) -> String {
    value.render_table()
}

/// Render a result in the requested format.
pub fn render<T: Serialize + TableView>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => render_json(value),
        OutputFormat::Yaml => render_yaml(value),
        OutputFormat::Table => Ok(render_table(value)),
    }
}

//! Text renderings handed to print, CSV and listing collaborators. The quote line ordering is
//! the file content contract, so both exports reuse `QuoteResult::summary_lines` verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cpq::catalog::Catalog;
use crate::domain::quote::{money, QuoteResult};

pub const CSV_HEADER: &str = "Quote Summary";
pub const NO_PRODUCTS: &str = "No products available.";
pub const NO_PRODUCTS_IN_CATEGORY: &str = "No products in this category.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unsupported export format `{other}` (expected text|csv|json)")),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

pub fn render_text(result: &QuoteResult) -> String {
    let mut lines = result.summary_lines();
    lines.push(result.total_line());
    lines.join("\n")
}

pub fn render_csv(result: &QuoteResult) -> String {
    let mut lines = vec![CSV_HEADER.to_string()];
    lines.extend(result.summary_lines());
    lines.push(result.total_line());
    lines.join("\n")
}

pub fn render_json(result: &QuoteResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

pub fn render(result: &QuoteResult, format: ExportFormat) -> Result<String, serde_json::Error> {
    match format {
        ExportFormat::Text => Ok(render_text(result)),
        ExportFormat::Csv => Ok(render_csv(result)),
        ExportFormat::Json => render_json(result),
    }
}

/// Catalog listing as shown to a user picking products.
pub fn render_catalog(catalog: &Catalog) -> String {
    if catalog.categories().is_empty() {
        return NO_PRODUCTS.to_string();
    }

    let mut lines = Vec::new();
    for category in catalog.categories() {
        lines.push(format!("## {}", category.name));
        if category.is_empty() {
            lines.push(format!("  {NO_PRODUCTS_IN_CATEGORY}"));
            continue;
        }
        for product in &category.products {
            lines.push(format!(
                "  [{}] {} - ${}",
                product.id,
                product.name,
                money(product.unit_price)
            ));
        }
    }
    lines.join("\n")
}

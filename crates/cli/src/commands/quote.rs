use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use quotesmith_core::config::LoadOptions;
use quotesmith_core::domain::selection::{AddOnFlags, FormItem};
use quotesmith_core::export::{render, ExportFormat};
use quotesmith_core::{ApplicationError, QuoteRuntime, SelectionForm};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::commands::{
    load_catalog_blocking, load_config, CommandResult, EXIT_OUTPUT, EXIT_QUOTE_UNAVAILABLE,
};

/// Form-style inputs. Numeric fields stay strings here and are coerced by the core, so bad
/// values fall back to defaults instead of being rejected by argument parsing.
#[derive(Debug, Default, Args)]
pub struct QuoteArgs {
    #[arg(long, help = "Catalog JSON document (defaults to catalog.path from config)")]
    pub catalog: Option<PathBuf>,
    #[arg(long, help = "Selection JSON file (items, addons, numDevices, techHours, ...)")]
    pub selection: Option<PathBuf>,
    #[arg(long = "item", value_name = "SKU[=QTY]", help = "Select a product, repeatable")]
    pub items: Vec<String>,
    #[arg(long = "addon", value_name = "ID", help = "Check a service add-on, repeatable")]
    pub addons: Vec<String>,
    #[arg(long, help = "Number of devices (default 1)")]
    pub devices: Option<String>,
    #[arg(long, help = "Technician hours (default 0)")]
    pub tech_hours: Option<String>,
    #[arg(long, help = "Flat travel cost (default 0)")]
    pub travel_cost: Option<String>,
    #[arg(long, help = "Complexity multiplier (default 1)")]
    pub complexity: Option<String>,
    #[arg(long, help = "Preferred installation date, e.g. 2026-11-02")]
    pub date: Option<String>,
    #[arg(long, help = "Override the configured technician hourly rate")]
    pub hourly_rate: Option<Decimal>,
    #[arg(long, default_value_t = ExportFormat::Text, help = "Output format: text|csv|json")]
    pub format: ExportFormat,
    #[arg(long, help = "Write the rendered quote to this file instead of stdout")]
    pub output: Option<PathBuf>,
}

pub fn run(mut options: LoadOptions, args: &QuoteArgs) -> CommandResult {
    if args.hourly_rate.is_some() {
        options.overrides.hourly_rate = args.hourly_rate;
    }
    let config = match load_config("quote", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let form = match build_form(args) {
        Ok(form) => form,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "selection_input",
                format!("{error:#}"),
                EXIT_QUOTE_UNAVAILABLE,
            )
        }
    };

    let catalog_path = args.catalog.clone().unwrap_or(config.catalog.path.clone());
    let catalog = match load_catalog_blocking(&catalog_path) {
        Ok(catalog) => catalog,
        Err(error) => return CommandResult::unavailable("quote", error),
    };

    let runtime = QuoteRuntime::with_rates(catalog, config.pricing.rates());
    let result = match runtime.quote_form(&form) {
        Ok(result) => result,
        Err(error) => return CommandResult::unavailable("quote", ApplicationError::from(error)),
    };

    tracing::info!(
        event_name = "quote.generated",
        lines = result.line_items.len(),
        final_total = %result.final_total,
        format = %args.format,
        "quote generated"
    );

    let rendered = match render(&result, args.format) {
        Ok(rendered) => rendered,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "serialization",
                format!("quote serialization failed: {error}"),
                EXIT_OUTPUT,
            )
        }
    };

    match &args.output {
        None => CommandResult::raw(rendered),
        Some(path) => match write_output(path, &rendered) {
            Ok(()) => CommandResult::success(
                "quote",
                format!("{} quote written to `{}`", args.format, path.display()),
            ),
            Err(error) => {
                CommandResult::failure("quote", "output_write", format!("{error:#}"), EXIT_OUTPUT)
            }
        },
    }
}

/// Merges the selection file (if any) with command-line choices; flags win.
pub fn build_form(args: &QuoteArgs) -> anyhow::Result<SelectionForm> {
    let mut form = match &args.selection {
        Some(path) => read_selection(path)?,
        None => SelectionForm::default(),
    };

    for item in &args.items {
        let (sku, quantity) = match item.split_once('=') {
            Some((sku, quantity)) => (sku, Some(Value::String(quantity.to_string()))),
            None => (item.as_str(), None),
        };
        form.items.push(FormItem { sku: sku.to_string(), quantity });
    }

    if !args.addons.is_empty() {
        let mut checked = form.addons.checked();
        checked.extend(args.addons.iter().cloned());
        form.addons = AddOnFlags::Checked(checked);
    }

    let text = |value: &Option<String>| value.clone().map(Value::String);
    if args.devices.is_some() {
        form.num_devices = text(&args.devices);
    }
    if args.tech_hours.is_some() {
        form.tech_hours = text(&args.tech_hours);
    }
    if args.travel_cost.is_some() {
        form.travel_cost = text(&args.travel_cost);
    }
    if args.complexity.is_some() {
        form.complexity = text(&args.complexity);
    }
    if args.date.is_some() {
        form.schedule_date = text(&args.date);
    }

    Ok(form)
}

fn read_selection(path: &Path) -> anyhow::Result<SelectionForm> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read selection file `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("selection file `{}` is not a valid selection", path.display()))
}

fn write_output(path: &Path, rendered: &str) -> anyhow::Result<()> {
    fs::write(path, rendered)
        .with_context(|| format!("could not write quote to `{}`", path.display()))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::{build_form, QuoteArgs};
    use quotesmith_core::domain::selection::AddOnFlags;

    #[test]
    fn item_flags_accept_optional_quantities() {
        let args = QuoteArgs {
            items: vec!["LT-100=3".to_string(), "MN-1".to_string()],
            addons: vec!["addon-install".to_string()],
            devices: Some("2".to_string()),
            ..QuoteArgs::default()
        };

        let form = build_form(&args).expect("form");
        assert_eq!(form.items.len(), 2);
        assert_eq!(form.items[0].sku, "LT-100");
        assert_eq!(form.items[0].quantity, Some(Value::String("3".to_string())));
        assert_eq!(form.items[1].quantity, None);
        assert_eq!(form.addons, AddOnFlags::Checked(vec!["addon-install".to_string()]));
        assert_eq!(form.num_devices, Some(Value::String("2".to_string())));
        assert_eq!(form.complexity, None);
    }
}

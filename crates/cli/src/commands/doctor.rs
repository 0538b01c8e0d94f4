use quotesmith_core::config::{AppConfig, LoadOptions};
use quotesmith_core::domain::quote::money;
use quotesmith_core::{AddOn, Catalog, QuoteRuntime, Selection};
use serde::Serialize;

use crate::commands::load_catalog_blocking;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn skipped(name: &'static str, reason: &str) -> Self {
        Self { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: LoadOptions, json_output: bool) -> String {
    let report = build_report(options);

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_pricing_rates(&config));
            match load_catalog_blocking(&config.catalog.path) {
                Ok(catalog) => {
                    checks.push(check_catalog_contents(&config, &catalog));
                    checks.push(check_sample_quote(&config, catalog));
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "catalog_readable",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(DoctorCheck::skipped("sample_quote", "the catalog did not load"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["pricing_rates", "catalog_readable", "sample_quote"] {
                checks.push(DoctorCheck::skipped(name, "configuration did not load"));
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_pricing_rates(config: &AppConfig) -> DoctorCheck {
    let rates = config.pricing.rates();
    let mut parts = vec![format!("hourly ${}", money(rates.hourly_rate))];
    parts.extend(AddOn::ALL.iter().map(|addon| {
        format!("{} ({}) ${}", addon.as_str(), addon.label(), money(rates.addon_cost(*addon)))
    }));

    DoctorCheck { name: "pricing_rates", status: CheckStatus::Pass, details: parts.join(" / ") }
}

fn check_catalog_contents(config: &AppConfig, catalog: &Catalog) -> DoctorCheck {
    let path = config.catalog.path.display();
    if catalog.is_empty() {
        return DoctorCheck {
            name: "catalog_readable",
            status: CheckStatus::Fail,
            details: format!("`{path}` loaded but lists no products"),
        };
    }

    DoctorCheck {
        name: "catalog_readable",
        status: CheckStatus::Pass,
        details: format!(
            "`{path}` lists {} products in {} categories",
            catalog.len(),
            catalog.categories().len()
        ),
    }
}

/// Prices one unit of the first product to prove the engine runs end to end.
fn check_sample_quote(config: &AppConfig, catalog: Catalog) -> DoctorCheck {
    let Some(product) = catalog.products().next().cloned() else {
        return DoctorCheck::skipped("sample_quote", "the catalog has no products");
    };

    let runtime = QuoteRuntime::with_rates(catalog, config.pricing.rates());
    match runtime.quote(&Selection::new().with_item(product.id.clone(), 1)) {
        Ok(result) => DoctorCheck {
            name: "sample_quote",
            status: CheckStatus::Pass,
            details: format!("1 x [{}] priced at ${}", product.id, money(result.final_total)),
        },
        Err(error) => DoctorCheck {
            name: "sample_quote",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

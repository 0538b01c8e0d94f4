use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::catalog::Catalog;
use crate::domain::addon::AddOn;
use crate::domain::quote::{money, PricingTraceStep, QuoteLineItem, QuoteResult};
use crate::domain::selection::Selection;
use crate::errors::DomainError;

pub const DEFAULT_HOURLY_RATE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
pub const DEFAULT_ADDON_INSTALL: Decimal = Decimal::from_parts(25, 0, 0, false, 0);
pub const DEFAULT_ADDON_CONFIG: Decimal = Decimal::from_parts(15, 0, 0, false, 0);
pub const DEFAULT_ADDON_NETWORK: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Deployment-specific prices for everything that is not a catalog product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRates {
    pub hourly_rate: Decimal,
    pub addon_install: Decimal,
    pub addon_config: Decimal,
    pub addon_network: Decimal,
}

impl Default for PricingRates {
    fn default() -> Self {
        Self {
            hourly_rate: DEFAULT_HOURLY_RATE,
            addon_install: DEFAULT_ADDON_INSTALL,
            addon_config: DEFAULT_ADDON_CONFIG,
            addon_network: DEFAULT_ADDON_NETWORK,
        }
    }
}

impl PricingRates {
    pub fn addon_cost(&self, addon: AddOn) -> Decimal {
        match addon {
            AddOn::Install => self.addon_install,
            AddOn::Config => self.addon_config,
            AddOn::Network => self.addon_network,
        }
    }
}

pub trait QuotePricingEngine: Send + Sync {
    fn compute_quote(
        &self,
        catalog: &Catalog,
        selection: &Selection,
    ) -> Result<QuoteResult, DomainError>;
}

#[derive(Clone, Debug, Default)]
pub struct DeterministicQuoteEngine {
    rates: PricingRates,
}

impl DeterministicQuoteEngine {
    pub fn new(rates: PricingRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &PricingRates {
        &self.rates
    }
}

impl QuotePricingEngine for DeterministicQuoteEngine {
    fn compute_quote(
        &self,
        catalog: &Catalog,
        selection: &Selection,
    ) -> Result<QuoteResult, DomainError> {
        compute_quote(catalog, selection, &self.rates)
    }
}

/// Prices a selection against the catalog.
///
/// `final = products × devices × complexity + add-ons + technician + travel`. Only the product
/// subtotal scales; every selection entry is resolved before any output is built.
pub fn compute_quote(
    catalog: &Catalog,
    selection: &Selection,
    rates: &PricingRates,
) -> Result<QuoteResult, DomainError> {
    let line_items = selection
        .lines()
        .iter()
        .map(|line| -> Result<QuoteLineItem, DomainError> {
            let product = catalog.lookup(&line.product_id).ok_or_else(|| {
                DomainError::UnknownProduct { product_id: line.product_id.clone() }
            })?;
            let quantity = line.quantity.get();
            Ok(QuoteLineItem {
                product_id: product.id.clone(),
                name: product.name.clone(),
                quantity,
                unit_price: product.unit_price,
                line_cost: product
                    .unit_price
                    .checked_mul(Decimal::from(quantity))
                    .ok_or_else(|| DomainError::overflow("line_cost"))?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let product_total = checked_sum(line_items.iter().map(|item| item.line_cost), "product_total")?;

    let mut addons = BTreeSet::new();
    for raw in selection.addons() {
        match AddOn::parse(raw) {
            Some(addon) => {
                addons.insert(addon);
            }
            None => tracing::debug!(
                event_name = "quote.addon_ignored",
                addon_id = %raw,
                "ignoring unrecognized add-on"
            ),
        }
    }
    let addon_total =
        checked_sum(addons.iter().map(|addon| rates.addon_cost(*addon)), "addon_total")?;

    let customization = selection.customization();
    let device_count = customization.device_count().get();
    let complexity = customization.complexity();
    let technician_cost = customization
        .technician_hours()
        .checked_mul(rates.hourly_rate)
        .ok_or_else(|| DomainError::overflow("technician_cost"))?;
    let travel_cost = customization.travel_cost();

    let scaled_products = product_total
        .checked_mul(Decimal::from(device_count))
        .and_then(|amount| amount.checked_mul(complexity))
        .ok_or_else(|| DomainError::overflow("scaled_products"))?;
    let final_total = checked_sum(
        [scaled_products, addon_total, technician_cost, travel_cost],
        "final_total",
    )?;

    let trace = vec![
        step("product_total", "sum(unit_price * quantity)", product_total),
        step(
            "scaled_products",
            &format!(
                "product_total * {device_count} devices * {} complexity",
                complexity.normalize()
            ),
            scaled_products,
        ),
        step("addon_total", &addon_detail(&addons, rates), addon_total),
        step(
            "technician_cost",
            &format!(
                "{} hours * {} hourly rate",
                customization.technician_hours().normalize(),
                rates.hourly_rate.normalize()
            ),
            technician_cost,
        ),
        step("travel_cost", "flat travel cost", travel_cost),
        step(
            "final_total",
            "scaled_products + addon_total + technician_cost + travel_cost",
            final_total,
        ),
    ];

    tracing::debug!(
        event_name = "quote.computed",
        lines = line_items.len(),
        product_total = %product_total,
        final_total = %final_total,
        "quote computed"
    );

    Ok(QuoteResult {
        line_items,
        product_total,
        addon_total,
        technician_cost,
        travel_cost,
        device_count,
        complexity,
        preferred_date: customization.preferred_date().clone(),
        final_total,
        trace,
    })
}

fn checked_sum(
    amounts: impl IntoIterator<Item = Decimal>,
    stage: &str,
) -> Result<Decimal, DomainError> {
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total.checked_add(amount).ok_or_else(|| DomainError::overflow(stage))
    })
}

fn step(stage: &str, detail: &str, amount: Decimal) -> PricingTraceStep {
    PricingTraceStep { stage: stage.to_string(), detail: detail.to_string(), amount }
}

fn addon_detail(addons: &BTreeSet<AddOn>, rates: &PricingRates) -> String {
    if addons.is_empty() {
        return "no add-ons".to_string();
    }
    addons
        .iter()
        .map(|addon| format!("{} ${}", addon.label(), money(rates.addon_cost(*addon))))
        .collect::<Vec<_>>()
        .join(" + ")
}

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::product::ProductId;

pub const NOT_SET: &str = "Not set";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PreferredDate {
    #[default]
    NotSet,
    Date(NaiveDate),
    Text(String),
}

impl PreferredDate {
    /// Blank input is `NotSet`; ISO dates are parsed, anything else is echoed as given.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Self::NotSet;
        };

        match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => Self::Date(date),
            Err(_) => Self::Text(value.to_owned()),
        }
    }
}

impl fmt::Display for PreferredDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSet => f.write_str(NOT_SET),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionLine {
    pub product_id: ProductId,
    pub quantity: NonZeroU32,
}

/// Quote-wide parameters. Setters clamp out-of-range values to the documented defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customization {
    device_count: NonZeroU32,
    technician_hours: Decimal,
    travel_cost: Decimal,
    complexity: Decimal,
    preferred_date: PreferredDate,
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            device_count: NonZeroU32::MIN,
            technician_hours: Decimal::ZERO,
            travel_cost: Decimal::ZERO,
            complexity: Decimal::ONE,
            preferred_date: PreferredDate::NotSet,
        }
    }
}

impl Customization {
    pub fn with_device_count(mut self, device_count: u32) -> Self {
        self.device_count = NonZeroU32::new(device_count).unwrap_or(NonZeroU32::MIN);
        self
    }

    pub fn with_technician_hours(mut self, hours: Decimal) -> Self {
        self.technician_hours = non_negative(hours);
        self
    }

    pub fn with_travel_cost(mut self, cost: Decimal) -> Self {
        self.travel_cost = non_negative(cost);
        self
    }

    pub fn with_complexity(mut self, complexity: Decimal) -> Self {
        self.complexity = if complexity >= Decimal::ONE { complexity } else { Decimal::ONE };
        self
    }

    pub fn with_preferred_date(mut self, preferred_date: PreferredDate) -> Self {
        self.preferred_date = preferred_date;
        self
    }

    pub fn device_count(&self) -> NonZeroU32 {
        self.device_count
    }

    pub fn technician_hours(&self) -> Decimal {
        self.technician_hours
    }

    pub fn travel_cost(&self) -> Decimal {
        self.travel_cost
    }

    pub fn complexity(&self) -> Decimal {
        self.complexity
    }

    pub fn preferred_date(&self) -> &PreferredDate {
        &self.preferred_date
    }
}

/// One user's choices for a single quote. Products are referenced by id only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    lines: Vec<SelectionLine>,
    addons: Vec<String>,
    customization: Customization,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product, or replaces the quantity of an already selected one in place.
    /// A zero quantity is treated as 1.
    pub fn select(&mut self, product_id: impl Into<ProductId>, quantity: u32) -> &mut Self {
        let product_id = product_id.into();
        let quantity = NonZeroU32::new(quantity).unwrap_or(NonZeroU32::MIN);

        match self.lines.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => line.quantity = quantity,
            None => self.lines.push(SelectionLine { product_id, quantity }),
        }
        self
    }

    pub fn with_item(mut self, product_id: impl Into<ProductId>, quantity: u32) -> Self {
        self.select(product_id, quantity);
        self
    }

    pub fn with_addon(mut self, addon_id: impl Into<String>) -> Self {
        self.addons.push(addon_id.into());
        self
    }

    pub fn with_customization(mut self, customization: Customization) -> Self {
        self.customization = customization;
        self
    }

    pub fn lines(&self) -> &[SelectionLine] {
        &self.lines
    }

    /// Checked add-on identifiers as supplied, including ones the engine does not recognize.
    pub fn addons(&self) -> &[String] {
        &self.addons
    }

    pub fn customization(&self) -> &Customization {
        &self.customization
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Builds a selection from loosely typed form input. Never fails: unusable values fall back
    /// to their defaults.
    pub fn from_form(form: &SelectionForm) -> Self {
        let mut selection = Self::new();

        for item in &form.items {
            let sku = item.sku.trim();
            if sku.is_empty() {
                continue;
            }
            selection.select(sku, coerce_count(item.quantity.as_ref()));
        }

        selection.addons = form.addons.checked();
        selection.customization = Customization::default()
            .with_device_count(coerce_count(form.num_devices.as_ref()))
            .with_technician_hours(coerce_amount(form.tech_hours.as_ref()).unwrap_or_default())
            .with_travel_cost(coerce_amount(form.travel_cost.as_ref()).unwrap_or_default())
            .with_complexity(coerce_amount(form.complexity.as_ref()).unwrap_or(Decimal::ONE))
            .with_preferred_date(PreferredDate::parse(
                form.schedule_date.as_ref().and_then(Value::as_str),
            ));

        selection
    }
}

/// Raw selection input as a browser form (or a JSON file written by hand) delivers it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionForm {
    #[serde(default)]
    pub items: Vec<FormItem>,
    #[serde(default)]
    pub addons: AddOnFlags,
    #[serde(default)]
    pub num_devices: Option<Value>,
    #[serde(default)]
    pub tech_hours: Option<Value>,
    #[serde(default)]
    pub travel_cost: Option<Value>,
    #[serde(default)]
    pub complexity: Option<Value>,
    #[serde(default)]
    pub schedule_date: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormItem {
    pub sku: String,
    #[serde(default)]
    pub quantity: Option<Value>,
}

/// Add-ons arrive either as a list of checked ids or as an id -> checked map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddOnFlags {
    Checked(Vec<String>),
    Flags(BTreeMap<String, bool>),
}

impl Default for AddOnFlags {
    fn default() -> Self {
        Self::Checked(Vec::new())
    }
}

impl AddOnFlags {
    pub fn checked(&self) -> Vec<String> {
        match self {
            Self::Checked(ids) => ids.iter().map(|id| id.trim().to_owned()).collect(),
            Self::Flags(flags) => flags
                .iter()
                .filter(|(_, checked)| **checked)
                .map(|(id, _)| id.trim().to_owned())
                .collect(),
        }
    }
}

fn numeric(value: Option<&Value>) -> Option<Decimal> {
    let text = match value? {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_owned(),
        _ => return None,
    };

    Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)).ok()
}

/// Positive whole count; fractions truncate, anything unusable becomes 1.
pub fn coerce_count(value: Option<&Value>) -> u32 {
    numeric(value)
        .map(|number| number.trunc())
        .and_then(|number| number.to_u32())
        .filter(|count| *count > 0)
        .unwrap_or(1)
}

/// Non-negative amount, `None` when the input is missing, non-numeric or negative.
pub fn coerce_amount(value: Option<&Value>) -> Option<Decimal> {
    numeric(value).filter(|amount| !amount.is_sign_negative())
}

fn non_negative(value: Decimal) -> Decimal {
    if value.is_sign_negative() {
        Decimal::ZERO
    } else {
        value
    }
}

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::domain::selection::PreferredDate;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLineItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_cost: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

/// Snapshot of one engine run. Amounts keep full precision; rounding happens in display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub line_items: Vec<QuoteLineItem>,
    pub product_total: Decimal,
    pub addon_total: Decimal,
    pub technician_cost: Decimal,
    pub travel_cost: Decimal,
    pub device_count: u32,
    pub complexity: Decimal,
    pub preferred_date: PreferredDate,
    pub final_total: Decimal,
    pub trace: Vec<PricingTraceStep>,
}

impl QuoteResult {
    /// Display lines in their fixed order: products, optional cost lines, parameters, total.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .line_items
            .iter()
            .map(|item| format!("{} x{} - ${}", item.name, item.quantity, money(item.line_cost)))
            .collect();

        if self.addon_total > Decimal::ZERO {
            lines.push(format!("Service Add-Ons - ${}", money(self.addon_total)));
        }
        if self.technician_cost > Decimal::ZERO {
            lines.push(format!("Technician Cost - ${}", money(self.technician_cost)));
        }
        if self.travel_cost > Decimal::ZERO {
            lines.push(format!("Travel Cost - ${}", money(self.travel_cost)));
        }

        lines.push(format!("Devices: {}", self.device_count));
        lines.push(format!("Complexity Multiplier: {}", self.complexity.normalize()));
        lines.push(format!("Preferred Date: {}", self.preferred_date));
        lines.push(format!("Final Cost: ${}", money(self.final_total)));
        lines
    }

    pub fn total_line(&self) -> String {
        format!("Total: ${}", money(self.final_total))
    }
}

/// Two-decimal currency rendering, half away from zero.
pub fn money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

use quotesmith_core::{
    compute_quote, Catalog, Customization, DomainError, PricingRates, ProductId, Selection,
    SelectionForm,
};
use rust_decimal::Decimal;
use serde_json::json;

fn widget_catalog() -> Catalog {
    Catalog::load(&json!({
        "categories": [
            { "category": "Gadgets", "items": [{ "sku": "P1", "name": "Widget", "price": 10.00 }] }
        ]
    }))
    .expect("widget catalog should load")
}

fn price(selection: &Selection) -> quotesmith_core::QuoteResult {
    compute_quote(&widget_catalog(), selection, &PricingRates::default())
        .expect("selection should price")
}

#[test]
fn two_widgets_produce_the_reference_summary() {
    let result = price(&Selection::new().with_item("P1", 2));

    assert_eq!(result.product_total, Decimal::from(20));
    assert_eq!(result.final_total, Decimal::from(20));
    assert_eq!(
        result.summary_lines(),
        vec![
            "Widget x2 - $20.00",
            "Devices: 1",
            "Complexity Multiplier: 1",
            "Preferred Date: Not set",
            "Final Cost: $20.00",
        ]
    );
}

#[test]
fn scaled_quote_with_addon_technician_and_travel() {
    let selection = Selection::new()
        .with_item("P1", 1)
        .with_addon("addon-install")
        .with_customization(
            Customization::default()
                .with_device_count(3)
                .with_complexity(Decimal::from(2))
                .with_technician_hours(Decimal::ONE)
                .with_travel_cost(Decimal::from(15)),
        );

    let result = price(&selection);

    assert_eq!(result.product_total, Decimal::from(10));
    assert_eq!(result.addon_total, Decimal::from(25));
    assert_eq!(result.technician_cost, Decimal::from(50));
    assert_eq!(result.final_total, Decimal::from(150));
    assert_eq!(
        result.summary_lines(),
        vec![
            "Widget x1 - $10.00",
            "Service Add-Ons - $25.00",
            "Technician Cost - $50.00",
            "Travel Cost - $15.00",
            "Devices: 3",
            "Complexity Multiplier: 2",
            "Preferred Date: Not set",
            "Final Cost: $150.00",
        ]
    );
}

#[test]
fn repeated_computation_is_identical() {
    let selection = Selection::new()
        .with_item("P1", 7)
        .with_addon("addon-network")
        .with_customization(Customization::default().with_complexity(Decimal::new(125, 2)));

    assert_eq!(price(&selection), price(&selection));
}

#[test]
fn empty_selection_costs_only_the_additive_parts() {
    let selection = Selection::new().with_addon("addon-config").with_customization(
        Customization::default()
            .with_device_count(9)
            .with_complexity(Decimal::from(4))
            .with_technician_hours(Decimal::from(2))
            .with_travel_cost(Decimal::new(1250, 2)),
    );

    let result = price(&selection);

    assert!(result.line_items.is_empty());
    assert_eq!(result.product_total, Decimal::ZERO);
    assert_eq!(
        result.final_total,
        result.addon_total + result.technician_cost + result.travel_cost
    );
    assert_eq!(result.final_total, Decimal::new(12750, 2));
}

#[test]
fn product_cost_scales_with_devices_and_complexity_only() {
    let constant = Decimal::from(25 + 100 + 5);

    for devices in [1_u32, 2, 5] {
        for complexity in [Decimal::ONE, Decimal::new(15, 1), Decimal::from(3)] {
            let selection =
                Selection::new().with_item("P1", 2).with_addon("addon-install").with_customization(
                    Customization::default()
                        .with_device_count(devices)
                        .with_complexity(complexity)
                        .with_technician_hours(Decimal::from(2))
                        .with_travel_cost(Decimal::from(5)),
                );

            let result = price(&selection);
            assert_eq!(
                result.final_total,
                Decimal::from(20) * Decimal::from(devices) * complexity + constant
            );
        }
    }
}

#[test]
fn unknown_product_yields_no_quote() {
    let selection = Selection::new().with_item("P1", 1).with_item("P9", 1);

    let error = compute_quote(&widget_catalog(), &selection, &PricingRates::default())
        .expect_err("unknown sku should fail");
    assert_eq!(error, DomainError::UnknownProduct { product_id: ProductId::from("P9") });
}

#[test]
fn invalid_form_values_fall_back_to_defaults() {
    let form: SelectionForm = serde_json::from_value(json!({
        "items": [{ "sku": "P1", "quantity": "" }],
        "numDevices": "none",
        "complexity": "",
        "techHours": "x",
        "travelCost": null
    }))
    .expect("form should deserialize");

    let result = price(&Selection::from_form(&form));

    assert_eq!(result.line_items[0].quantity, 1);
    assert_eq!(result.device_count, 1);
    assert_eq!(result.complexity, Decimal::ONE);
    assert_eq!(result.final_total, Decimal::from(10));
}

#[test]
fn zero_cost_lines_are_omitted_and_preferred_date_is_echoed() {
    let form: SelectionForm = serde_json::from_value(json!({
        "items": [{ "sku": "P1", "quantity": 1 }],
        "addons": { "addon-install": false },
        "techHours": "0",
        "travelCost": "0",
        "scheduleDate": "2026-12-01"
    }))
    .expect("form should deserialize");

    let lines = price(&Selection::from_form(&form)).summary_lines();

    assert!(!lines.iter().any(|line| line.starts_with("Service Add-Ons")));
    assert!(!lines.iter().any(|line| line.starts_with("Technician Cost")));
    assert!(!lines.iter().any(|line| line.starts_with("Travel Cost")));
    assert!(lines.contains(&"Preferred Date: 2026-12-01".to_string()));
}

#[test]
fn out_of_range_amounts_fail_instead_of_panicking() {
    let form: SelectionForm = serde_json::from_value(json!({
        "items": [{ "sku": "P1", "quantity": "4000000000" }],
        "numDevices": "4000000000",
        "complexity": "1000000000000"
    }))
    .expect("form should deserialize");

    let selection = Selection::from_form(&form);
    let error = compute_quote(&widget_catalog(), &selection, &PricingRates::default())
        .expect_err("scaled product total exceeds the decimal range");

    assert_eq!(error, DomainError::AmountOverflow { stage: "scaled_products".to_string() });
}

#[test]
fn huge_technician_hours_fail_with_overflow() {
    let selection = Selection::new()
        .with_customization(Customization::default().with_technician_hours(Decimal::MAX));

    let error = compute_quote(&widget_catalog(), &selection, &PricingRates::default())
        .expect_err("technician cost exceeds the decimal range");

    assert_eq!(error, DomainError::overflow("technician_cost"));
}

#[test]
fn additive_costs_overflow_at_the_final_total() {
    let selection = Selection::new().with_item("P1", 1).with_customization(
        Customization::default().with_travel_cost(Decimal::MAX - Decimal::from(5)),
    );

    let error = compute_quote(&widget_catalog(), &selection, &PricingRates::default())
        .expect_err("final total exceeds the decimal range");

    assert_eq!(error, DomainError::AmountOverflow { stage: "final_total".to_string() });
}

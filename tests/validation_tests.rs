#![cfg(feature = "core")]

//! Rule-engine behaviour on canonical invoices built in code.

use chrono::NaiveDate;
use erechnung::core::*;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::json;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

/// Fully populated and consistent, but without payment terms, references
/// or seller contact.
fn consistent_invoice() -> CanonicalInvoice {
    InvoiceBuilder::new("RE-2024-001", "2024-06-15")
        .seller(
            PartyBuilder::new(
                "ACME GmbH",
                AddressBuilder::new("DE")
                    .street("Friedrichstraße 123")
                    .city("Berlin")
                    .postal_code("10115")
                    .build(),
            )
            .vat_id("DE123456789")
            .build(),
        )
        .buyer(
            PartyBuilder::new(
                "Kunde AG",
                AddressBuilder::new("DE").city("München").build(),
            )
            .build(),
        )
        .add_line(
            LineItemBuilder::new("Beratung", dec!(10), dec!(150))
                .unit("HUR")
                .tax(dec!(19))
                .build(),
        )
        .add_line(
            LineItemBuilder::new("Fachbuch", dec!(3), dec!(29.99))
                .tax(dec!(7))
                .build(),
        )
        .build()
}

#[test]
fn empty_invoice_reports_every_structural_gap() {
    let inv = CanonicalInvoice {
        invoice_number: String::new(),
        issue_date: String::new(),
        currency: String::new(),
        seller: PartyInfo::default(),
        buyer: PartyInfo::default(),
        totals: Totals::default(),
        line_items: Vec::new(),
        payment_terms: None,
        references: None,
    };
    let result = validate_at(&inv, today());

    assert_eq!(result.status, ValidationStatus::Fail);
    assert_eq!(
        result.error_codes(),
        [
            "INV-01", "INV-02", "CUR-01", "SUM-01", "LIN-01", "SELL-01", "SELL-02", "SELL-03",
            "BUY-01", "BUY-02"
        ]
    );
}

#[test]
fn empty_invoice_with_zero_totals() {
    let inv = CanonicalInvoice {
        invoice_number: String::new(),
        issue_date: String::new(),
        currency: String::new(),
        seller: PartyInfo::default(),
        buyer: PartyInfo::default(),
        totals: Totals::new(dec!(0), dec!(0), dec!(0)),
        line_items: Vec::new(),
        payment_terms: None,
        references: None,
    };
    let result = validate_at(&inv, today());
    assert_eq!(
        result.error_codes(),
        [
            "INV-01", "INV-02", "CUR-01", "LIN-01", "SELL-01", "SELL-02", "SELL-03", "BUY-01",
            "BUY-02", "TAX-01"
        ]
    );
}

#[test]
fn consistent_invoice_passes_with_advisory_warnings() {
    let result = validate_at(&consistent_invoice(), today());
    assert_eq!(result.status, ValidationStatus::Pass);
    assert!(result.errors.is_empty());
    assert_eq!(
        result.warning_codes(),
        ["PAY-01", "PAY-02", "REF-01", "REF-02", "CONT-01"]
    );
}

#[test]
fn warnings_never_change_status() {
    let mut inv = consistent_invoice();
    inv.references = None;
    inv.payment_terms = None;
    assert!(validate_at(&inv, today()).is_pass());
}

#[test]
fn line_total_scenario() {
    let mut inv = InvoiceBuilder::new("RE-1", "2024-06-01")
        .seller(
            PartyBuilder::new("ACME GmbH", AddressBuilder::new("DE").build())
                .vat_id("DE123456789")
                .build(),
        )
        .buyer(PartyBuilder::new("Kunde AG", AddressBuilder::new("DE").build()).build())
        .add_line(
            LineItemBuilder::new("Leistung", dec!(10), dec!(10.00))
                .net_amount(dec!(100.00))
                .tax(dec!(19))
                .build(),
        )
        .build();
    assert!(validate_at(&inv, today()).is_pass());

    inv.line_items[0].net_amount = dec!(95.00);
    let result = validate_at(&inv, today());
    let lin05: Vec<_> = result.errors.iter().filter(|i| i.code == "LIN-05").collect();
    assert_eq!(lin05.len(), 1);
    assert_eq!(lin05[0].path.as_deref(), Some("lineItems[0].netAmount"));
    assert_eq!(
        lin05[0].value,
        Some(json!({ "calculated": "100.00", "actual": "95.00" }))
    );
}

#[test]
fn gross_tolerance_is_inclusive() {
    let mut inv = consistent_invoice();
    inv.line_items.truncate(1);
    inv.line_items[0].net_amount = dec!(100.00);
    inv.line_items[0].quantity = dec!(1);
    inv.line_items[0].unit_price = dec!(100.00);
    inv.line_items[0].tax_amount = dec!(19.00);

    for (gross, passes) in [
        (dec!(119.00), true),
        (dec!(119.009), true),
        (dec!(119.01), true),
        (dec!(118.99), true),
        (dec!(119.02), false),
        (dec!(118.98), false),
    ] {
        inv.totals = Totals::new(dec!(100.00), dec!(19.00), gross);
        let result = validate_at(&inv, today());
        assert_eq!(
            !result.error_codes().contains(&"SUM-02"),
            passes,
            "gross {gross}"
        );
    }
}

#[test]
fn future_issue_date_is_rejected() {
    let mut inv = consistent_invoice();
    inv.issue_date = "2024-07-01".into();
    let result = validate_at(&inv, today());
    assert_eq!(result.error_codes(), ["INV-03"]);
    assert_eq!(
        result.errors[0].message,
        "Invoice issue date must not be in the future"
    );
}

#[test]
fn lowercase_currency_is_accepted() {
    let mut inv = consistent_invoice();
    inv.currency = "eur".into();
    assert!(validate_at(&inv, today()).is_pass());
}

#[test]
fn currencies_outside_the_european_subset_fail() {
    for code in ["JPY", "AUD", "CNY", "TRY"] {
        let mut inv = consistent_invoice();
        inv.currency = code.into();
        let result = validate_at(&inv, today());
        assert_eq!(result.error_codes(), ["CUR-02"], "{code}");
    }
}

#[test]
fn issue_display_and_json() {
    let mut inv = consistent_invoice();
    inv.currency = "EURO".into();
    let result = validate_at(&inv, today());
    let issue = &result.errors[0];
    assert_eq!(
        issue.to_string(),
        "[CUR-02] currency: Currency code must be a valid ISO 4217 code (e.g., EUR, USD). Found: EURO"
    );

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "FAIL");
    assert_eq!(json["errors"][0]["code"], "CUR-02");
    assert_eq!(json["errors"][0]["value"], "EURO");
    assert_eq!(json["warnings"].as_array().unwrap().len(), 5);
}

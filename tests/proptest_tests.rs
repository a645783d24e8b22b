//! Property-based tests for detection, mapping and validation.
//!
//! Run with: `cargo test --test proptest_tests`

#![cfg(feature = "xml")]

use chrono::NaiveDate;
use erechnung::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

/// Decimal with two fraction digits in `[-10_000.00, 10_000.00]`.
fn cents() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..=1_000_000).prop_map(|c| Decimal::new(c, 2))
}

fn line() -> impl Strategy<Value = LineItem> {
    ("[A-Za-z ]{0,12}", cents(), cents(), cents(), cents()).prop_map(
        |(description, quantity, unit_price, net_amount, tax_amount)| LineItem {
            id: String::new(),
            description,
            quantity,
            unit: "C62".into(),
            unit_price,
            net_amount,
            tax_rate: Decimal::new(19, 0),
            tax_amount,
        },
    )
}

fn invoice() -> impl Strategy<Value = CanonicalInvoice> {
    (
        "[A-Z0-9-]{0,10}",
        prop::option::of(cents()),
        prop::option::of(cents()),
        prop::option::of(cents()),
        prop::collection::vec(line(), 0..5),
        "[A-Z]{0,4}",
    )
        .prop_map(|(number, net, tax, gross, lines, currency)| {
            let mut builder = InvoiceBuilder::new(number, "2024-06-01")
                .currency(currency)
                .totals(Totals { net, tax, gross });
            for line in lines {
                builder = builder.add_line(line);
            }
            builder.build()
        })
}

proptest! {
    #[test]
    fn detect_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = detect(&bytes);
    }

    #[test]
    fn detect_is_repeatable(text in "<[A-Za-z:]{1,12}>[ -~]{0,64}</[A-Za-z:]{1,12}>") {
        prop_assert_eq!(detect(text.as_bytes()), detect(text.as_bytes()));
    }

    #[test]
    fn mapping_arbitrary_bytes_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        for dialect in Dialect::KNOWN {
            let _ = map_document(&bytes, dialect);
        }
    }

    #[test]
    fn validation_is_idempotent(inv in invoice()) {
        let first = validate_at(&inv, today());
        let second = validate_at(&inv, today());
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn status_reflects_errors_only(inv in invoice()) {
        let result = validate_at(&inv, today());
        prop_assert_eq!(result.is_pass(), result.errors.is_empty());
        for warning in &result.warnings {
            prop_assert!(["PAY-01", "PAY-02", "REF-01", "REF-02", "CONT-01"].contains(&warning.code.as_str()));
        }
    }

    #[test]
    fn sum_02_matches_tolerance(net in cents(), tax in cents(), delta in -500i64..=500) {
        // delta is in thousandths
        let gross = net + tax + Decimal::new(delta, 3);
        let mut inv = InvoiceBuilder::new("RE-1", "2024-06-01")
            .totals(Totals::new(net, tax, gross))
            .build();
        inv.currency = "EUR".into();
        let result = validate_at(&inv, today());
        let flagged = result.error_codes().contains(&"SUM-02");
        prop_assert_eq!(flagged, delta.abs() > 10);
    }
}

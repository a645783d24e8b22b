//! The validation rule catalogue.
//!
//! Each entry is an independent check over the whole canonical invoice. The
//! catalogue order is the order issues appear in a [`ValidationResult`].
//!
//! [`ValidationResult`]: super::validation::ValidationResult

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use super::currencies::is_known_currency_code;
use super::error::ValidationIssue;
use super::types::*;

/// Tolerance for header and line arithmetic (SUM-02, LIN-05).
pub const ROUNDING_TOLERANCE: Decimal = dec!(0.01);

/// Tolerance for the line-tax sum against the header tax (TAX-04). Wider,
/// since per-line rounding compounds.
pub const TAX_ROUNDING_TOLERANCE: Decimal = dec!(0.05);

/// Whether a violation invalidates the invoice or is advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fail,
    Warn,
}

/// Inputs a rule may need beyond the invoice itself.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    /// Calendar date issue dates are judged against.
    pub today: NaiveDate,
}

pub type RuleFn = fn(&CanonicalInvoice, &RuleContext) -> Vec<ValidationIssue>;

/// One catalogue entry. A rule may emit issues under several codes.
pub struct Rule {
    pub name: &'static str,
    pub severity: Severity,
    pub check: RuleFn,
}

pub static CATALOGUE: &[Rule] = &[
    Rule {
        name: "invoice-number",
        severity: Severity::Fail,
        check: check_invoice_number,
    },
    Rule {
        name: "issue-date",
        severity: Severity::Fail,
        check: check_issue_date,
    },
    Rule {
        name: "currency",
        severity: Severity::Fail,
        check: check_currency,
    },
    Rule {
        name: "totals",
        severity: Severity::Fail,
        check: check_totals,
    },
    Rule {
        name: "line-items",
        severity: Severity::Fail,
        check: check_line_items,
    },
    Rule {
        name: "seller",
        severity: Severity::Fail,
        check: check_seller,
    },
    Rule {
        name: "buyer",
        severity: Severity::Fail,
        check: check_buyer,
    },
    Rule {
        name: "tax",
        severity: Severity::Fail,
        check: check_tax,
    },
    Rule {
        name: "payment",
        severity: Severity::Warn,
        check: check_payment,
    },
    Rule {
        name: "references",
        severity: Severity::Warn,
        check: check_references,
    },
    Rule {
        name: "contact",
        severity: Severity::Warn,
        check: check_contact,
    },
];

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn is_blank_opt(s: Option<&String>) -> bool {
    s.is_none_or(|v| is_blank(v))
}

/// `|a - b| <= tolerance`. An overflowing difference is never within.
fn within(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    a.checked_sub(b).is_some_and(|diff| diff.abs() <= tolerance)
}

fn display_or_overflow(value: Option<Decimal>) -> String {
    value.map_or_else(|| "overflow".to_string(), |v| v.to_string())
}

/// Parse an issue date in any of the layouts producers emit.
pub fn parse_issue_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn check_invoice_number(invoice: &CanonicalInvoice, _: &RuleContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if is_blank(&invoice.invoice_number) {
        issues.push(ValidationIssue::new(
            "INV-01",
            "invoiceNumber",
            "Invoice number is required",
        ));
    }

    issues
}

fn check_issue_date(invoice: &CanonicalInvoice, ctx: &RuleContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if is_blank(&invoice.issue_date) {
        issues.push(ValidationIssue::new(
            "INV-02",
            "issueDate",
            "Invoice issue date is required",
        ));
        return issues;
    }

    let Some(date) = parse_issue_date(&invoice.issue_date) else {
        issues.push(
            ValidationIssue::new(
                "INV-03",
                "issueDate",
                "Invoice issue date must be a valid date",
            )
            .with_value(json!(invoice.issue_date)),
        );
        return issues;
    };

    // Dates are compared whole, so anything up to the end of today passes.
    if date > ctx.today {
        issues.push(
            ValidationIssue::new(
                "INV-03",
                "issueDate",
                "Invoice issue date must not be in the future",
            )
            .with_value(json!(invoice.issue_date)),
        );
    }

    issues
}

fn check_currency(invoice: &CanonicalInvoice, _: &RuleContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if is_blank(&invoice.currency) {
        issues.push(ValidationIssue::new(
            "CUR-01",
            "currency",
            "Currency code is required",
        ));
        return issues;
    }

    let currency = invoice.currency.trim().to_ascii_uppercase();
    if !is_known_currency_code(&currency) {
        issues.push(
            ValidationIssue::new(
                "CUR-02",
                "currency",
                format!(
                    "Currency code must be a valid ISO 4217 code (e.g., EUR, USD). Found: {currency}"
                ),
            )
            .with_value(json!(currency)),
        );
    }

    issues
}

fn check_totals(invoice: &CanonicalInvoice, _: &RuleContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let (Some(net), Some(tax), Some(gross)) =
        (invoice.totals.net, invoice.totals.tax, invoice.totals.gross)
    else {
        issues.push(ValidationIssue::new(
            "SUM-01",
            "totals",
            "Invoice totals (net, tax, gross) are required",
        ));
        return issues;
    };

    let calculated = net.checked_add(tax);
    if !calculated.is_some_and(|c| within(c, gross, ROUNDING_TOLERANCE)) {
        issues.push(
            ValidationIssue::new(
                "SUM-02",
                "totals.gross",
                format!(
                    "Invoice totals are inconsistent: Net ({net}) + Tax ({tax}) ≠ Gross ({gross})"
                ),
            )
            .with_value(json!({
                "net": net,
                "tax": tax,
                "gross": gross,
                "calculated": calculated,
            })),
        );
    }

    if gross < Decimal::ZERO {
        issues.push(
            ValidationIssue::new(
                "SUM-03",
                "totals.gross",
                "Total gross amount cannot be negative for standard invoices",
            )
            .with_value(json!(gross)),
        );
    }

    issues
}

fn check_line_items(invoice: &CanonicalInvoice, _: &RuleContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if invoice.line_items.is_empty() {
        issues.push(ValidationIssue::new(
            "LIN-01",
            "lineItems",
            "Invoice must contain at least one line item",
        ));
        return issues;
    }

    for (index, line) in invoice.line_items.iter().enumerate() {
        let prefix = format!("lineItems[{index}]");

        if is_blank(&line.description) {
            issues.push(ValidationIssue::new(
                "LIN-02",
                format!("{prefix}.description"),
                format!("Line item {} is missing a description", line.id),
            ));
        }

        if line.quantity <= Decimal::ZERO {
            issues.push(
                ValidationIssue::new(
                    "LIN-03",
                    format!("{prefix}.quantity"),
                    format!("Line item {} must have a positive quantity", line.id),
                )
                .with_value(json!(line.quantity)),
            );
        }

        if line.unit_price < Decimal::ZERO {
            issues.push(
                ValidationIssue::new(
                    "LIN-04",
                    format!("{prefix}.unitPrice"),
                    format!("Line item {} must not have a negative unit price", line.id),
                )
                .with_value(json!(line.unit_price)),
            );
        }

        let calculated = line.quantity.checked_mul(line.unit_price);
        if !calculated.is_some_and(|c| within(c, line.net_amount, ROUNDING_TOLERANCE)) {
            issues.push(
                ValidationIssue::new(
                    "LIN-05",
                    format!("{prefix}.netAmount"),
                    format!(
                        "Line item {}: quantity × price ≠ line total ({} × {} = {}, got {})",
                        line.id,
                        line.quantity,
                        line.unit_price,
                        display_or_overflow(calculated),
                        line.net_amount
                    ),
                )
                .with_value(json!({
                    "calculated": calculated,
                    "actual": line.net_amount,
                })),
            );
        }
    }

    issues
}

fn check_seller(invoice: &CanonicalInvoice, _: &RuleContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let seller = &invoice.seller;

    if is_blank(&seller.name) {
        issues.push(ValidationIssue::new(
            "SELL-01",
            "seller.name",
            "Seller name is required",
        ));
    }

    if is_blank(&seller.address.country) {
        issues.push(ValidationIssue::new(
            "SELL-02",
            "seller.address.country",
            "Seller postal address (minimum: country) is required",
        ));
    }

    if is_blank_opt(seller.vat_id.as_ref()) {
        issues.push(ValidationIssue::new(
            "SELL-03",
            "seller.vatId",
            "Seller VAT ID or tax registration number is required",
        ));
    }

    issues
}

fn check_buyer(invoice: &CanonicalInvoice, _: &RuleContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let buyer = &invoice.buyer;

    if is_blank(&buyer.name) {
        issues.push(ValidationIssue::new(
            "BUY-01",
            "buyer.name",
            "Buyer name is required",
        ));
    }

    if is_blank(&buyer.address.country) {
        issues.push(ValidationIssue::new(
            "BUY-02",
            "buyer.address.country",
            "Buyer postal address (minimum: country) is required",
        ));
    }

    issues
}

fn check_tax(invoice: &CanonicalInvoice, _: &RuleContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    // An absent header tax is already reported as SUM-01.
    let Some(invoice_total) = invoice.totals.tax else {
        return issues;
    };
    let line_total = invoice
        .line_items
        .iter()
        .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.tax_amount));

    if line_total.is_some_and(|t| t.is_zero()) && invoice_total.is_zero() {
        issues.push(ValidationIssue::new(
            "TAX-01",
            "totals.tax",
            "Tax breakdown is required (categories, rates, amounts)",
        ));
    }

    if !line_total.is_some_and(|t| within(t, invoice_total, TAX_ROUNDING_TOLERANCE)) {
        issues.push(
            ValidationIssue::new(
                "TAX-04",
                "totals.tax",
                format!(
                    "Sum of line item taxes does not match invoice tax total ({} vs {invoice_total})",
                    display_or_overflow(line_total)
                ),
            )
            .with_value(json!({
                "lineTotal": line_total,
                "invoiceTotal": invoice_total,
            })),
        );
    }

    issues
}

fn check_payment(invoice: &CanonicalInvoice, _: &RuleContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let terms = invoice.payment_terms.as_ref();

    let iban = terms
        .and_then(|t| t.payment_means.as_ref())
        .and_then(|m| m.iban.as_ref());
    let text = terms.and_then(|t| t.terms.as_ref());
    if is_blank_opt(iban) && is_blank_opt(text) {
        issues.push(ValidationIssue::new(
            "PAY-01",
            "paymentTerms.paymentMeans",
            "Payment instructions (bank details or terms) are recommended for faster payment",
        ));
    }

    if is_blank_opt(terms.and_then(|t| t.due_date.as_ref())) {
        issues.push(ValidationIssue::new(
            "PAY-02",
            "paymentTerms.dueDate",
            "Payment due date is missing; consider adding it to improve cash flow",
        ));
    }

    issues
}

fn check_references(invoice: &CanonicalInvoice, _: &RuleContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let refs = invoice.references.as_ref();

    if is_blank_opt(refs.and_then(|r| r.purchase_order.as_ref())) {
        issues.push(ValidationIssue::new(
            "REF-01",
            "references.purchaseOrder",
            "Purchase order reference is missing; include it if provided by buyer",
        ));
    }

    if is_blank_opt(refs.and_then(|r| r.contract.as_ref())) {
        issues.push(ValidationIssue::new(
            "REF-02",
            "references.contract",
            "Contract reference is recommended for contracted services",
        ));
    }

    issues
}

fn check_contact(invoice: &CanonicalInvoice, _: &RuleContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let contact = invoice.seller.contact.as_ref();

    if is_blank_opt(contact.and_then(|c| c.email.as_ref()))
        && is_blank_opt(contact.and_then(|c| c.phone.as_ref()))
    {
        issues.push(ValidationIssue::new(
            "CONT-01",
            "seller.contact",
            "Seller contact information (email/phone) is recommended for inquiries",
        ));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::*;

    fn ctx() -> RuleContext {
        RuleContext {
            today: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        }
    }

    fn codes(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.code.as_str()).collect()
    }

    fn invoice() -> CanonicalInvoice {
        InvoiceBuilder::new("RE-1", "2024-06-15")
            .seller(
                PartyBuilder::new("ACME GmbH", AddressBuilder::new("DE").build())
                    .vat_id("DE123456789")
                    .build(),
            )
            .buyer(PartyBuilder::new("Kunde AG", AddressBuilder::new("AT").build()).build())
            .add_line(LineItemBuilder::new("Hosting", dec!(1), dec!(100)).tax(dec!(19)).build())
            .build()
    }

    #[test]
    fn catalogue_severities() {
        let warn: Vec<_> = CATALOGUE
            .iter()
            .filter(|r| r.severity == Severity::Warn)
            .map(|r| r.name)
            .collect();
        assert_eq!(warn, ["payment", "references", "contact"]);
        assert_eq!(CATALOGUE.len(), 11);
    }

    #[test]
    fn blank_invoice_number() {
        let mut inv = invoice();
        inv.invoice_number = "   ".into();
        assert_eq!(codes(&check_invoice_number(&inv, &ctx())), ["INV-01"]);
    }

    #[test]
    fn missing_issue_date_skips_date_checks() {
        let mut inv = invoice();
        inv.issue_date = String::new();
        assert_eq!(codes(&check_issue_date(&inv, &ctx())), ["INV-02"]);
    }

    #[test]
    fn invalid_issue_date() {
        let mut inv = invoice();
        inv.issue_date = "2024-02-30".into();
        let issues = check_issue_date(&inv, &ctx());
        assert_eq!(codes(&issues), ["INV-03"]);
        assert_eq!(issues[0].value, Some(json!("2024-02-30")));
    }

    #[test]
    fn issue_date_today_is_accepted() {
        let mut inv = invoice();
        inv.issue_date = "2024-06-30".into();
        assert!(check_issue_date(&inv, &ctx()).is_empty());
        inv.issue_date = "2024-07-01".into();
        assert_eq!(codes(&check_issue_date(&inv, &ctx())), ["INV-03"]);
    }

    #[test]
    fn issue_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(parse_issue_date("2024-01-15"), expected);
        assert_eq!(parse_issue_date("20240115"), expected);
        assert_eq!(parse_issue_date("2024-01-15T10:30:00+01:00"), expected);
        assert_eq!(parse_issue_date("15.01.2024"), None);
    }

    #[test]
    fn currency_checks() {
        let mut inv = invoice();
        inv.currency = String::new();
        assert_eq!(codes(&check_currency(&inv, &ctx())), ["CUR-01"]);
        inv.currency = "XYZ".into();
        assert_eq!(codes(&check_currency(&inv, &ctx())), ["CUR-02"]);
        inv.currency = "chf".into();
        assert!(check_currency(&inv, &ctx()).is_empty());
        inv.currency = "JPY".into();
        let issues = check_currency(&inv, &ctx());
        assert_eq!(codes(&issues), ["CUR-02"]);
        assert_eq!(issues[0].value, Some(json!("JPY")));
    }

    #[test]
    fn missing_total_short_circuits() {
        let mut inv = invoice();
        inv.totals.gross = None;
        assert_eq!(codes(&check_totals(&inv, &ctx())), ["SUM-01"]);
    }

    #[test]
    fn gross_tolerance_boundary() {
        let mut inv = invoice();
        inv.totals = Totals::new(dec!(100.00), dec!(19.00), dec!(119.00));
        assert!(check_totals(&inv, &ctx()).is_empty());
        inv.totals.gross = Some(dec!(119.009));
        assert!(check_totals(&inv, &ctx()).is_empty());
        inv.totals.gross = Some(dec!(119.01));
        assert!(check_totals(&inv, &ctx()).is_empty());
        inv.totals.gross = Some(dec!(119.02));
        let issues = check_totals(&inv, &ctx());
        assert_eq!(codes(&issues), ["SUM-02"]);
        assert_eq!(issues[0].value.as_ref().unwrap()["calculated"], json!(dec!(119.00)));
    }

    #[test]
    fn negative_gross() {
        let mut inv = invoice();
        inv.totals = Totals::new(dec!(-100), dec!(-19), dec!(-119));
        assert_eq!(codes(&check_totals(&inv, &ctx())), ["SUM-03"]);
    }

    #[test]
    fn line_checks_accumulate() {
        let mut inv = invoice();
        let line = &mut inv.line_items[0];
        line.description = String::new();
        line.quantity = dec!(0);
        line.unit_price = dec!(-1);
        let issues = check_line_items(&inv, &ctx());
        assert_eq!(codes(&issues), ["LIN-02", "LIN-03", "LIN-04", "LIN-05"]);
        assert_eq!(issues[0].path.as_deref(), Some("lineItems[0].description"));
    }

    #[test]
    fn line_amount_mismatch_carries_values() {
        let mut inv = invoice();
        inv.line_items[0].quantity = dec!(10);
        inv.line_items[0].unit_price = dec!(10.00);
        inv.line_items[0].net_amount = dec!(100.00);
        assert!(check_line_items(&inv, &ctx()).is_empty());

        inv.line_items[0].net_amount = dec!(95.00);
        let issues = check_line_items(&inv, &ctx());
        assert_eq!(codes(&issues), ["LIN-05"]);
        assert_eq!(
            issues[0].value,
            Some(json!({ "calculated": dec!(100.00), "actual": dec!(95.00) }))
        );
    }

    #[test]
    fn no_lines_short_circuits() {
        let mut inv = invoice();
        inv.line_items.clear();
        assert_eq!(codes(&check_line_items(&inv, &ctx())), ["LIN-01"]);
    }

    #[test]
    fn party_checks() {
        let mut inv = invoice();
        inv.seller = PartyInfo::default();
        inv.buyer = PartyInfo::default();
        assert_eq!(
            codes(&check_seller(&inv, &ctx())),
            ["SELL-01", "SELL-02", "SELL-03"]
        );
        assert_eq!(codes(&check_buyer(&inv, &ctx())), ["BUY-01", "BUY-02"]);
    }

    #[test]
    fn blank_vat_id_counts_as_missing() {
        let mut inv = invoice();
        inv.seller.vat_id = Some(" ".into());
        assert_eq!(codes(&check_seller(&inv, &ctx())), ["SELL-03"]);
    }

    #[test]
    fn zero_tax_everywhere() {
        let mut inv = invoice();
        inv.line_items[0].tax_amount = dec!(0);
        inv.totals = Totals::new(dec!(100), dec!(0), dec!(100));
        assert_eq!(codes(&check_tax(&inv, &ctx())), ["TAX-01"]);
    }

    #[test]
    fn tax_sum_tolerance() {
        let mut inv = invoice();
        inv.totals.tax = Some(dec!(19.05));
        assert!(check_tax(&inv, &ctx()).is_empty());
        inv.totals.tax = Some(dec!(19.06));
        assert_eq!(codes(&check_tax(&inv, &ctx())), ["TAX-04"]);
    }

    #[test]
    fn overflowing_amounts_are_reported_not_panicking() {
        let mut inv = invoice();
        inv.line_items[0].quantity = Decimal::MAX;
        inv.line_items[0].unit_price = Decimal::MAX;
        inv.line_items[0].tax_amount = Decimal::MAX;
        inv.line_items.push(inv.line_items[0].clone());
        inv.totals = Totals::new(Decimal::MAX, Decimal::MAX, Decimal::MIN);

        let issues = check_line_items(&inv, &ctx());
        assert_eq!(codes(&issues), ["LIN-05", "LIN-05"]);
        assert_eq!(issues[0].value.as_ref().unwrap()["calculated"], json!(null));
        assert_eq!(codes(&check_totals(&inv, &ctx())), ["SUM-02", "SUM-03"]);
        assert_eq!(codes(&check_tax(&inv, &ctx())), ["TAX-04"]);
    }

    #[test]
    fn absent_header_tax_skips_tax_rules() {
        let mut inv = invoice();
        inv.totals.tax = None;
        inv.line_items[0].tax_amount = dec!(0);
        assert!(check_tax(&inv, &ctx()).is_empty());
    }

    #[test]
    fn warnings_for_bare_invoice() {
        let inv = invoice();
        assert_eq!(codes(&check_payment(&inv, &ctx())), ["PAY-01", "PAY-02"]);
        assert_eq!(codes(&check_references(&inv, &ctx())), ["REF-01", "REF-02"]);
        assert_eq!(codes(&check_contact(&inv, &ctx())), ["CONT-01"]);
    }

    #[test]
    fn payment_terms_text_satisfies_pay_01() {
        let mut inv = invoice();
        inv.payment_terms = Some(PaymentTerms {
            terms: Some("Zahlbar sofort".into()),
            ..PaymentTerms::default()
        });
        assert_eq!(codes(&check_payment(&inv, &ctx())), ["PAY-02"]);
    }

    #[test]
    fn phone_alone_satisfies_contact() {
        let mut inv = invoice();
        inv.seller.contact = Some(Contact {
            email: None,
            phone: Some("+49 30 1234".into()),
        });
        assert!(check_contact(&inv, &ctx()).is_empty());
    }
}

use rust_decimal::Decimal;
use tracing::debug;

use super::detect::is_ubl_root;
use super::fields::*;
use super::tree::{XmlDocument, XmlElement};
use crate::core::*;

/// Map an XRechnung UBL `Invoice` or `CreditNote` into a canonical invoice.
///
/// Fails only when the root, either party or the monetary total block is
/// missing. Every other absent field is defaulted and left for validation.
pub fn map_ubl(doc: &XmlDocument) -> Result<CanonicalInvoice, InvoiceError> {
    let root = doc.root();
    if !is_ubl_root(root) {
        return Err(InvoiceError::MissingRequiredStructure("Invoice"));
    }

    let seller = root
        .find("AccountingSupplierParty/Party")
        .ok_or(InvoiceError::MissingRequiredStructure("AccountingSupplierParty"))?;
    let buyer = root
        .find("AccountingCustomerParty/Party")
        .ok_or(InvoiceError::MissingRequiredStructure("AccountingCustomerParty"))?;
    let monetary_total = root
        .child("LegalMonetaryTotal")
        .ok_or(InvoiceError::MissingRequiredStructure("LegalMonetaryTotal"))?;

    let (line_tag, quantity_tag) = if root.local_name() == "CreditNote" {
        ("CreditNoteLine", "CreditedQuantity")
    } else {
        ("InvoiceLine", "InvoicedQuantity")
    };
    let line_items: Vec<LineItem> = root
        .children_named(line_tag)
        .enumerate()
        .map(|(index, line)| map_line(index, line, quantity_tag))
        .collect();

    let invoice = CanonicalInvoice {
        invoice_number: text(root, "ID").unwrap_or_default(),
        issue_date: root.find_text("IssueDate").map(date_only).unwrap_or_default(),
        currency: text(root, "DocumentCurrencyCode")
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        seller: map_party(seller),
        buyer: map_party(buyer),
        totals: map_totals(monetary_total),
        line_items,
        payment_terms: map_payment_terms(root),
        references: map_references(root),
    };

    debug!(
        number = %invoice.invoice_number,
        lines = invoice.line_items.len(),
        "mapped UBL invoice"
    );
    Ok(invoice)
}

fn map_party(party: &XmlElement) -> PartyInfo {
    PartyInfo {
        name: first_text(party, &["PartyName/Name", "PartyLegalEntity/RegistrationName"])
            .unwrap_or_default(),
        vat_id: text(party, "PartyTaxScheme/CompanyID"),
        address: Address {
            country: text(party, "PostalAddress/Country/IdentificationCode").unwrap_or_default(),
            city: text(party, "PostalAddress/CityName"),
            postal_code: text(party, "PostalAddress/PostalZone"),
            street: text(party, "PostalAddress/StreetName"),
        },
        contact: contact(
            text(party, "Contact/ElectronicMail"),
            text(party, "Contact/Telephone"),
        ),
    }
}

/// UBL carries no explicit header tax in the monetary total, so it is
/// derived as `TaxInclusiveAmount - TaxExclusiveAmount`.
fn map_totals(total: &XmlElement) -> Totals {
    let exclusive = optional_amount(total, "TaxExclusiveAmount");
    let inclusive = optional_amount(total, "TaxInclusiveAmount");
    let payable = optional_amount(total, "PayableAmount");

    let tax = inclusive.map(|incl| {
        incl.checked_sub(exclusive.unwrap_or_default())
            .unwrap_or(Decimal::ZERO)
    });

    Totals {
        net: exclusive,
        tax,
        gross: payable.or(inclusive),
    }
}

fn map_line(index: usize, line: &XmlElement, quantity_tag: &str) -> LineItem {
    let quantity = line.child(quantity_tag);
    let tax_total = line.child("TaxTotal");

    LineItem {
        id: (index + 1).to_string(),
        description: first_text(line, &["Item/Description", "Item/Name"]).unwrap_or_default(),
        quantity: amount(quantity.and_then(XmlElement::text)),
        unit: unit_code(quantity),
        unit_price: amount_at(line, "Price/PriceAmount"),
        net_amount: amount_at(line, "LineExtensionAmount"),
        tax_rate: first_amount(
            line,
            &[
                "TaxTotal/TaxSubtotal/TaxCategory/Percent",
                "TaxTotal/TaxSubtotal/Percent",
                "Item/ClassifiedTaxCategory/Percent",
            ],
        ),
        tax_amount: amount(tax_total.and_then(|t| t.find_text("TaxAmount"))),
    }
}

fn map_payment_terms(root: &XmlElement) -> Option<PaymentTerms> {
    let means = root.child("PaymentMeans");
    let terms = root.child("PaymentTerms");
    let due_date = first_text(root, &["PaymentTerms/PaymentDueDate", "DueDate"]);
    if means.is_none() && terms.is_none() && due_date.is_none() {
        return None;
    }

    let payment_means = means
        .and_then(|m| m.child("PayeeFinancialAccount"))
        .map(|account| PaymentMeans {
            iban: text(account, "ID"),
            bic: text(account, "FinancialInstitutionBranch/ID"),
            account_holder: text(account, "Name"),
        });

    Some(PaymentTerms {
        due_date: due_date.as_deref().map(date_only),
        payment_means,
        terms: terms.and_then(|t| text(t, "Note")),
    })
}

fn map_references(root: &XmlElement) -> Option<References> {
    let purchase_order = text(root, "OrderReference/ID");
    let contract = text(root, "ContractDocumentReference/ID");
    (purchase_order.is_some() || contract.is_some()).then_some(References {
        purchase_order,
        contract,
    })
}

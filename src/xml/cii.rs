use tracing::debug;

use super::fields::*;
use super::tree::{XmlDocument, XmlElement};
use crate::core::*;

/// Map a UN/CEFACT `CrossIndustryInvoice` (XRechnung CII, ZUGFeRD,
/// Factur-X) into a canonical invoice.
///
/// Fails only when the root, the trade transaction, either trade party or
/// the header monetary summation is missing.
pub fn map_cii(doc: &XmlDocument) -> Result<CanonicalInvoice, InvoiceError> {
    let root = doc.root();
    if !root.is("CrossIndustryInvoice") {
        return Err(InvoiceError::MissingRequiredStructure("CrossIndustryInvoice"));
    }

    let transaction = root
        .child("SupplyChainTradeTransaction")
        .ok_or(InvoiceError::MissingRequiredStructure("SupplyChainTradeTransaction"))?;
    let agreement = transaction.child("ApplicableHeaderTradeAgreement");
    let settlement = transaction.child("ApplicableHeaderTradeSettlement");

    let seller = agreement
        .and_then(|a| a.child("SellerTradeParty"))
        .ok_or(InvoiceError::MissingRequiredStructure("SellerTradeParty"))?;
    let buyer = agreement
        .and_then(|a| a.child("BuyerTradeParty"))
        .ok_or(InvoiceError::MissingRequiredStructure("BuyerTradeParty"))?;
    let summation = settlement
        .and_then(|s| s.child("SpecifiedTradeSettlementHeaderMonetarySummation"))
        .ok_or(InvoiceError::MissingRequiredStructure(
            "SpecifiedTradeSettlementHeaderMonetarySummation",
        ))?;

    let currency = settlement
        .and_then(|s| s.find_text("InvoiceCurrencyCode"))
        .or_else(|| agreement.and_then(|a| a.find_text("InvoiceCurrencyCode")))
        .unwrap_or(DEFAULT_CURRENCY)
        .to_string();

    let line_items: Vec<LineItem> = transaction
        .children_named("IncludedSupplyChainTradeLineItem")
        .enumerate()
        .map(|(index, line)| map_line(index, line))
        .collect();

    let invoice = CanonicalInvoice {
        invoice_number: text(root, "ExchangedDocument/ID").unwrap_or_default(),
        issue_date: root
            .find_text("ExchangedDocument/IssueDateTime/DateTimeString")
            .map(date_only)
            .unwrap_or_default(),
        currency,
        seller: map_party(seller),
        buyer: map_party(buyer),
        totals: Totals {
            net: optional_amount(summation, "TaxBasisTotalAmount"),
            tax: optional_amount(summation, "TaxTotalAmount"),
            gross: optional_amount(summation, "GrandTotalAmount"),
        },
        line_items,
        payment_terms: settlement.and_then(map_payment_terms),
        references: agreement.and_then(map_references),
    };

    debug!(
        number = %invoice.invoice_number,
        lines = invoice.line_items.len(),
        "mapped CII invoice"
    );
    Ok(invoice)
}

fn map_party(party: &XmlElement) -> PartyInfo {
    PartyInfo {
        name: text(party, "Name").unwrap_or_default(),
        vat_id: text(party, "SpecifiedTaxRegistration/ID"),
        address: Address {
            country: text(party, "PostalTradeAddress/CountryID").unwrap_or_default(),
            city: text(party, "PostalTradeAddress/CityName"),
            postal_code: text(party, "PostalTradeAddress/PostcodeCode"),
            street: text(party, "PostalTradeAddress/LineOne"),
        },
        contact: contact(
            first_text(
                party,
                &[
                    "DefinedTradeContact/EmailURIUniversalCommunication/URIID",
                    "DefinedTradeContact/EmailAddressURI",
                ],
            ),
            text(
                party,
                "DefinedTradeContact/TelephoneUniversalCommunication/CompleteNumber",
            ),
        ),
    }
}

// Line fields live in nested SpecifiedLineTrade* blocks; some producers emit
// them flat under the line, which is accepted as a fallback.
fn map_line(index: usize, line: &XmlElement) -> LineItem {
    let quantity = first_element(
        line,
        &["SpecifiedLineTradeDelivery/BilledQuantity", "BilledQuantity"],
    );
    let tax = first_element(
        line,
        &["SpecifiedLineTradeSettlement/ApplicableTradeTax", "ApplicableTradeTax"],
    );

    LineItem {
        id: (index + 1).to_string(),
        description: first_text(
            line,
            &["SpecifiedTradeProduct/Name", "SpecifiedTradeProduct/Description"],
        )
        .unwrap_or_default(),
        quantity: amount(quantity.and_then(XmlElement::text)),
        unit: unit_code(quantity),
        unit_price: first_amount(
            line,
            &[
                "SpecifiedLineTradeAgreement/NetPriceProductTradePrice/ChargeAmount",
                "NetPriceProductTradePrice/ChargeAmount",
            ],
        ),
        net_amount: first_amount(
            line,
            &[
                "SpecifiedLineTradeSettlement/SpecifiedTradeSettlementLineMonetarySummation/LineTotalAmount",
                "SpecifiedTradeSettlementLineMonetarySummation/LineTotalAmount",
                "LineTotalAmount",
            ],
        ),
        tax_rate: amount(tax.and_then(|t| t.find_text("RateApplicablePercent"))),
        tax_amount: amount(tax.and_then(|t| t.find_text("CalculatedAmount"))),
    }
}

// The creditor account carries no BIC in CII; it sits on a separate
// financial institution element and is not read.
fn map_payment_terms(settlement: &XmlElement) -> Option<PaymentTerms> {
    let terms = settlement.child("SpecifiedTradePaymentTerms");
    let means = settlement.child("SpecifiedTradeSettlementPaymentMeans");
    if terms.is_none() && means.is_none() {
        return None;
    }

    let payment_means = means
        .and_then(|m| m.child("PayeePartyCreditorFinancialAccount"))
        .map(|account| PaymentMeans {
            iban: text(account, "IBANID"),
            bic: None,
            account_holder: text(account, "AccountName"),
        });

    Some(PaymentTerms {
        due_date: terms
            .and_then(|t| t.find_text("DueDateDateTime/DateTimeString"))
            .map(date_only),
        payment_means,
        terms: terms.and_then(|t| text(t, "Description")),
    })
}

fn map_references(agreement: &XmlElement) -> Option<References> {
    let purchase_order = text(agreement, "BuyerOrderReferencedDocument/IssuerAssignedID");
    let contract = text(agreement, "ContractReferencedDocument/IssuerAssignedID");
    (purchase_order.is_some() || contract.is_some()).then_some(References {
        purchase_order,
        contract,
    })
}

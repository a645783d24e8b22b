use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::InvoiceError;

/// Currency assumed when a document does not state one.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// UN/CEFACT Rec 20 "one" (piece), assumed when a line carries no unit code.
pub const DEFAULT_UNIT_CODE: &str = "C62";

/// E-invoice dialect a document is written in.
///
/// The three CII-based dialects share one structure and differ only in the
/// guideline identifier they declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// XRechnung in UBL 2.1 syntax.
    #[serde(rename = "xrechnung_ubl")]
    UblXRechnung,
    /// XRechnung in UN/CEFACT CII syntax.
    #[serde(rename = "xrechnung_cii")]
    CiiXRechnung,
    /// ZUGFeRD (CII syntax).
    #[serde(rename = "zugferd_cii")]
    CiiZugferd,
    /// Factur-X (CII syntax).
    #[serde(rename = "facturx")]
    CiiFacturX,
    /// Not a recognised e-invoice.
    #[serde(rename = "unknown")]
    Unknown,
}

/// Structural family of a dialect. Selects the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    Ubl,
    Cii,
}

impl Dialect {
    /// All recognised dialects, in detection order.
    pub const KNOWN: [Dialect; 4] = [
        Self::UblXRechnung,
        Self::CiiXRechnung,
        Self::CiiZugferd,
        Self::CiiFacturX,
    ];

    /// Stable identifier, e.g. `"xrechnung_ubl"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UblXRechnung => "xrechnung_ubl",
            Self::CiiXRechnung => "xrechnung_cii",
            Self::CiiZugferd => "zugferd_cii",
            Self::CiiFacturX => "facturx",
            Self::Unknown => "unknown",
        }
    }

    /// Syntax family, or `None` for [`Dialect::Unknown`].
    pub fn syntax(&self) -> Option<Syntax> {
        match self {
            Self::UblXRechnung => Some(Syntax::Ubl),
            Self::CiiXRechnung | Self::CiiZugferd | Self::CiiFacturX => Some(Syntax::Cii),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.syntax().is_some()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = InvoiceError;

    /// Parse a stable identifier. Unrecognised strings are rejected rather
    /// than mapped to [`Dialect::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xrechnung_ubl" => Ok(Self::UblXRechnung),
            "xrechnung_cii" => Ok(Self::CiiXRechnung),
            "zugferd_cii" => Ok(Self::CiiZugferd),
            "facturx" => Ok(Self::CiiFacturX),
            "unknown" => Ok(Self::Unknown),
            _ => Err(InvoiceError::UnsupportedDialect(s.to_string())),
        }
    }
}

/// The normalized invoice every dialect is mapped into.
///
/// Absent fields are empty strings, zero amounts or `None`; a canonical
/// invoice never refuses to exist because a field is missing. Whether the
/// content is acceptable is decided by the validation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalInvoice {
    /// Invoice number (BT-1).
    pub invoice_number: String,
    /// Issue date as an ISO 8601 date string (BT-2).
    pub issue_date: String,
    /// ISO 4217 currency code (BT-5).
    pub currency: String,
    pub seller: PartyInfo,
    pub buyer: PartyInfo,
    pub totals: Totals,
    /// Lines in document order.
    pub line_items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<PaymentTerms>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<References>,
}

/// Seller or buyer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyInfo {
    pub name: String,
    /// VAT identifier or tax registration number; first entry when the
    /// document lists several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_id: Option<String>,
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
}

/// Postal address. Only the country is always carried.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// ISO 3166-1 alpha-2 country code, empty when absent.
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Document totals. `None` means the document did not carry the amount at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Total without VAT (BT-109).
    pub net: Option<Decimal>,
    /// Total VAT (BT-110).
    pub tax: Option<Decimal>,
    /// Total with VAT, or amount payable (BT-112 / BT-115).
    pub gross: Option<Decimal>,
}

impl Totals {
    pub fn new(net: Decimal, tax: Decimal, gross: Decimal) -> Self {
        Self {
            net: Some(net),
            tax: Some(tax),
            gross: Some(gross),
        }
    }
}

/// One invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// 1-based position in the document, independent of any line id the
    /// document itself carries.
    pub id: String,
    pub description: String,
    pub quantity: Decimal,
    /// UN/CEFACT Rec 20 unit code.
    pub unit: String,
    pub unit_price: Decimal,
    pub net_amount: Decimal,
    /// VAT rate in percent.
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTerms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_means: Option<PaymentMeans>,
    /// Free-text payment terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

/// Bank account the buyer should pay into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMeans {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_holder: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct References {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
}

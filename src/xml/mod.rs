//! XML side of the engine: a namespace-tolerant element tree, dialect
//! detection, and the UBL and CII mappers into [`CanonicalInvoice`].
//!
//! # Supported dialects
//!
//! - **XRechnung UBL**: OASIS UBL 2.1 `Invoice` / `CreditNote`
//! - **XRechnung CII**, **ZUGFeRD**, **Factur-X**: UN/CEFACT
//!   `CrossIndustryInvoice`, told apart by the guideline identifier (BT-24)
//!
//! # Example
//!
//! ```
//! use erechnung::core::Dialect;
//! use erechnung::xml::{XmlDocument, detect, map_ubl};
//!
//! let xml = br#"<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2">
//!   <ID>RE-1</ID>
//!   <AccountingSupplierParty><Party/></AccountingSupplierParty>
//!   <AccountingCustomerParty><Party/></AccountingCustomerParty>
//!   <LegalMonetaryTotal/>
//! </Invoice>"#;
//!
//! assert_eq!(detect(xml), Dialect::UblXRechnung);
//! let invoice = map_ubl(&XmlDocument::parse(xml).unwrap()).unwrap();
//! assert_eq!(invoice.invoice_number, "RE-1");
//! ```
//!
//! [`CanonicalInvoice`]: crate::core::CanonicalInvoice

mod cii;
mod detect;
pub(crate) mod fields;
mod tree;
mod ubl;

pub use cii::map_cii;
pub use detect::{detect, detect_document};
pub use tree::{MAX_DEPTH, XmlDocument, XmlElement};
pub use ubl::map_ubl;

/// XRechnung 3.0 specification identifier (BT-24).
pub const XRECHNUNG_CUSTOMIZATION_ID: &str =
    "urn:cen.eu:en16931:2017#compliant#urn:xeinkauf.de:kosit:xrechnung_3.0";

/// Namespace prefix shared by every UBL 2.x Invoice schema version.
pub const UBL_INVOICE_NS_STEM: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice";

/// Namespace prefix shared by every UBL 2.x CreditNote schema version.
pub const UBL_CREDIT_NOTE_NS_STEM: &str =
    "urn:oasis:names:specification:ubl:schema:xsd:CreditNote";

/// Location of the guideline identifier below a CII root.
pub(crate) const CII_GUIDELINE_PATH: &str =
    "ExchangedDocumentContext/GuidelineSpecifiedDocumentContextParameter/ID";

/// UBL 2.1 namespace URIs.
pub mod ubl_ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CREDIT_NOTE: &str = "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
}

/// CII namespace URIs.
pub mod cii_ns {
    pub const RSM: &str = "urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100";
    pub const RAM: &str =
        "urn:un:unece:uncefact:data:standard:ReusableAggregateBusinessInformationEntity:100";
    pub const UDT: &str = "urn:un:unece:uncefact:data:standard:UnqualifiedDataType:100";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_stems_prefix_the_versioned_uris() {
        assert!(ubl_ns::INVOICE.starts_with(UBL_INVOICE_NS_STEM));
        assert!(ubl_ns::CREDIT_NOTE.starts_with(UBL_CREDIT_NOTE_NS_STEM));
        assert!(XRECHNUNG_CUSTOMIZATION_ID.contains("xrechnung"));
    }
}

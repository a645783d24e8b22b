use tracing::debug;

use super::tree::{XmlDocument, XmlElement};
use super::{CII_GUIDELINE_PATH, UBL_CREDIT_NOTE_NS_STEM, UBL_INVOICE_NS_STEM};
use crate::core::Dialect;

type Predicate = fn(&XmlElement) -> bool;

/// Detection order. The first matching predicate wins, so a CII guideline
/// naming both XRechnung and ZUGFeRD is reported as XRechnung.
const PREDICATES: [(Dialect, Predicate); 4] = [
    (Dialect::UblXRechnung, is_xrechnung_ubl),
    (Dialect::CiiXRechnung, is_xrechnung_cii),
    (Dialect::CiiZugferd, is_zugferd_cii),
    (Dialect::CiiFacturX, is_facturx_cii),
];

/// Determine the dialect of raw document bytes.
///
/// Never fails: anything that is not well-formed XML, or matches no known
/// dialect, is [`Dialect::Unknown`].
pub fn detect(bytes: &[u8]) -> Dialect {
    match XmlDocument::parse(bytes) {
        Ok(doc) => detect_document(&doc),
        Err(err) => {
            debug!(error = %err, "document is not well-formed XML");
            Dialect::Unknown
        }
    }
}

/// Determine the dialect of an already parsed document.
pub fn detect_document(doc: &XmlDocument) -> Dialect {
    let root = doc.root();
    let dialect = PREDICATES
        .iter()
        .find(|(_, matches)| matches(root))
        .map_or(Dialect::Unknown, |(dialect, _)| *dialect);
    debug!(root = root.name(), %dialect, "detected invoice dialect");
    dialect
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(needle)
}

pub(crate) fn is_ubl_root(root: &XmlElement) -> bool {
    matches!(root.local_name(), "Invoice" | "CreditNote")
}

fn is_xrechnung_ubl(root: &XmlElement) -> bool {
    if !is_ubl_root(root) {
        return false;
    }
    let declares_ubl = root
        .namespace_declarations()
        .any(|ns| ns.contains(UBL_INVOICE_NS_STEM) || ns.contains(UBL_CREDIT_NOTE_NS_STEM));
    declares_ubl
        || root
            .find_text("CustomizationID")
            .is_some_and(|id| contains_ignore_case(id, "xrechnung"))
}

/// Guideline identifier (BT-24) of a CII document, `None` for other roots.
fn cii_guideline(root: &XmlElement) -> Option<&str> {
    if !root.is("CrossIndustryInvoice") {
        return None;
    }
    root.find_text(CII_GUIDELINE_PATH)
}

fn is_xrechnung_cii(root: &XmlElement) -> bool {
    cii_guideline(root).is_some_and(|id| contains_ignore_case(id, "xrechnung"))
}

// Profile tokens are matched case-sensitively: "urn:factur-x.eu:1p0:basic"
// is not ZUGFeRD, while "urn:factur-x.eu:1p0:BASIC" is.
fn is_zugferd_cii(root: &XmlElement) -> bool {
    cii_guideline(root).is_some_and(|id| {
        contains_ignore_case(id, "zugferd") || id.contains("BASIC") || id.contains("EN16931")
    })
}

fn is_facturx_cii(root: &XmlElement) -> bool {
    cii_guideline(root).is_some_and(|id| contains_ignore_case(id, "factur-x"))
}

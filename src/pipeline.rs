//! Document-level entry points: bytes in, canonical invoice and validation
//! result out.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::*;
use crate::xml::{XmlDocument, detect_document, map_cii, map_ubl};

/// A document that was detected, mapped and validated in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckedDocument {
    pub dialect: Dialect,
    pub invoice: CanonicalInvoice,
    pub validation: ValidationResult,
}

fn map_tree(doc: &XmlDocument, dialect: Dialect) -> Result<CanonicalInvoice, InvoiceError> {
    let result = match dialect.syntax() {
        Some(Syntax::Ubl) => map_ubl(doc),
        Some(Syntax::Cii) => map_cii(doc),
        None => Err(InvoiceError::UnsupportedDialect(dialect.to_string())),
    };
    if let Err(err) = &result {
        debug!(%dialect, error = %err, "mapping failed");
    }
    result
}

/// Map document bytes with the mapper for `dialect`.
///
/// [`Dialect::Unknown`] is rejected before the bytes are parsed.
pub fn map_document(bytes: &[u8], dialect: Dialect) -> Result<CanonicalInvoice, InvoiceError> {
    if !dialect.is_known() {
        return Err(InvoiceError::UnsupportedDialect(dialect.to_string()));
    }
    let doc = XmlDocument::parse(bytes)?;
    map_tree(&doc, dialect)
}

/// Map and validate a document, judging the issue date against today's
/// local date.
pub fn validate_document(
    bytes: &[u8],
    dialect: Dialect,
) -> Result<(CanonicalInvoice, ValidationResult), InvoiceError> {
    validate_document_at(bytes, dialect, Local::now().date_naive())
}

/// Map and validate a document as of `today`.
///
/// Errors are reserved for documents that cannot be mapped at all. A mapped
/// invoice always produces a result, however many rules it violates.
pub fn validate_document_at(
    bytes: &[u8],
    dialect: Dialect,
    today: NaiveDate,
) -> Result<(CanonicalInvoice, ValidationResult), InvoiceError> {
    let invoice = map_document(bytes, dialect)?;
    let result = validate_at(&invoice, today);
    log_result(dialect, &invoice, &result);
    Ok((invoice, result))
}

/// Detect, map and validate in one pass.
pub fn check_document(bytes: &[u8]) -> Result<CheckedDocument, InvoiceError> {
    check_document_at(bytes, Local::now().date_naive())
}

/// Like [`check_document`], as of `today`.
///
/// Malformed XML is reported as such rather than as an unknown dialect.
pub fn check_document_at(bytes: &[u8], today: NaiveDate) -> Result<CheckedDocument, InvoiceError> {
    let doc = XmlDocument::parse(bytes)?;
    let dialect = detect_document(&doc);
    let invoice = map_tree(&doc, dialect)?;
    let validation = validate_at(&invoice, today);
    log_result(dialect, &invoice, &validation);
    Ok(CheckedDocument {
        dialect,
        invoice,
        validation,
    })
}

fn log_result(dialect: Dialect, invoice: &CanonicalInvoice, result: &ValidationResult) {
    debug!(
        %dialect,
        number = %invoice.invoice_number,
        status = ?result.status,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validated invoice"
    );
}

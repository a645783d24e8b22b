//! # erechnung
//!
//! Validation engine for German and European structured e-invoices:
//! XRechnung (UBL and CII), ZUGFeRD and Factur-X.
//!
//! Documents are detected, mapped into one canonical invoice model and
//! checked against an EN 16931-style rule catalogue. All monetary values use
//! [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use erechnung::{Dialect, detect, validate_document_at};
//!
//! let xml = br#"<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2">
//!   <AccountingSupplierParty><Party/></AccountingSupplierParty>
//!   <AccountingCustomerParty><Party/></AccountingCustomerParty>
//!   <LegalMonetaryTotal/>
//! </Invoice>"#;
//!
//! let dialect = detect(xml);
//! assert_eq!(dialect, Dialect::UblXRechnung);
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
//! let (invoice, result) = validate_document_at(xml, dialect, today).unwrap();
//! assert_eq!(invoice.currency, "EUR");
//! assert!(!result.is_pass());
//! assert!(result.error_codes().contains(&"INV-01"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Canonical invoice model, builders, rule engine |
//! | `xml` (default) | Dialect detection, UBL/CII mapping, document pipeline |
//! | `cli` | The `erechnung` command-line tool |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "xml")]
mod pipeline;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

#[cfg(feature = "xml")]
pub use crate::pipeline::*;

#[cfg(feature = "xml")]
pub use crate::xml::{detect, detect_document};

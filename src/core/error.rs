use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort processing of a document.
///
/// Anything short of these is reported as a [`ValidationIssue`] instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvoiceError {
    /// The bytes could not be read as an XML element tree.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// Mapping was requested for `unknown` or an unrecognised dialect.
    #[error("unsupported invoice dialect: {0}")]
    UnsupportedDialect(String),

    /// A node the mapper cannot work without is absent.
    #[error("missing required structure: {0}")]
    MissingRequiredStructure(&'static str),
}

/// A single finding of the validation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Stable rule identifier (e.g. "SUM-02").
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// Canonical-model location (e.g. "lineItems[0].netAmount").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Diagnostic payload, e.g. the calculated and actual amounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] {}: {}", self.code, path, self.message)
        } else {
            write!(f, "[{}] {}", self.code, self.message)
        }
    }
}

impl ValidationIssue {
    /// Create an issue attached to a canonical-model path.
    pub fn new(
        code: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            path: Some(path.into()),
            value: None,
        }
    }

    /// Attach a diagnostic payload.
    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }
}

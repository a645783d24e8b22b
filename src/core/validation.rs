use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::ValidationIssue;
use super::rules::{CATALOGUE, RuleContext, Severity};
use super::types::CanonicalInvoice;

/// Overall verdict of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    Pass,
    Fail,
}

/// Outcome of validating one canonical invoice.
///
/// `status` is `Fail` exactly when `errors` is non-empty. Warnings are
/// advisory and never influence the status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new(errors: Vec<ValidationIssue>, warnings: Vec<ValidationIssue>) -> Self {
        let status = if errors.is_empty() {
            ValidationStatus::Pass
        } else {
            ValidationStatus::Fail
        };
        Self {
            status,
            errors,
            warnings,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == ValidationStatus::Pass
    }

    /// Codes of all errors, in catalogue order.
    pub fn error_codes(&self) -> Vec<&str> {
        self.errors.iter().map(|i| i.code.as_str()).collect()
    }

    /// Codes of all warnings, in catalogue order.
    pub fn warning_codes(&self) -> Vec<&str> {
        self.warnings.iter().map(|i| i.code.as_str()).collect()
    }
}

/// Validate an invoice against the rule catalogue, judging the issue date
/// against the local calendar date.
pub fn validate(invoice: &CanonicalInvoice) -> ValidationResult {
    validate_at(invoice, Local::now().date_naive())
}

/// Validate an invoice against the rule catalogue as of `today`.
///
/// Every rule runs regardless of the others' outcomes, so one pass reports
/// all problems. The result is a pure function of its inputs.
pub fn validate_at(invoice: &CanonicalInvoice, today: NaiveDate) -> ValidationResult {
    let ctx = RuleContext { today };
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for rule in CATALOGUE {
        let issues = (rule.check)(invoice, &ctx);
        match rule.severity {
            Severity::Fail => errors.extend(issues),
            Severity::Warn => warnings.extend(issues),
        }
    }

    ValidationResult::new(errors, warnings)
}

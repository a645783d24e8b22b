//! Validate command - detect, map and check a single document.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Args;
use tracing::info;

use erechnung::{CheckedDocument, Dialect, ValidationIssue, detect, validate_document_at};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Invoice XML file
    #[arg(required = true)]
    file: PathBuf,

    /// Skip detection and map as this dialect
    /// (xrechnung_ubl, xrechnung_cii, zugferd_cii, facturx)
    #[arg(short, long)]
    format: Option<Dialect>,

    /// Judge the issue date against this day instead of today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Print dialect, canonical invoice and result as JSON
    #[arg(long)]
    json: bool,
}

/// Exit status is success exactly when the invoice passes. `verbose` adds
/// the canonical path under each reported issue.
pub fn run(args: ValidateArgs, verbose: bool) -> anyhow::Result<ExitCode> {
    let bytes = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let dialect = args.format.unwrap_or_else(|| detect(&bytes));
    info!(file = %args.file.display(), %dialect, "validating");

    if !dialect.is_known() {
        eprintln!(
            "Unsupported invoice format: {} is not XRechnung, ZUGFeRD or Factur-X",
            args.file.display()
        );
        return Ok(ExitCode::FAILURE);
    }

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let (invoice, validation) = validate_document_at(&bytes, dialect, today)
        .with_context(|| format!("cannot read {} as {dialect}", args.file.display()))?;

    let checked = CheckedDocument {
        dialect,
        invoice,
        validation,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&checked)?);
    } else {
        print_report(&args.file, &checked, verbose);
    }

    Ok(if checked.validation.is_pass() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(file: &Path, checked: &CheckedDocument, verbose: bool) {
    let invoice = &checked.invoice;
    let result = &checked.validation;

    println!("File:    {}", file.display());
    println!("Format:  {}", checked.dialect);
    println!();
    println!("Invoice: {} ({})", invoice.invoice_number, invoice.issue_date);
    println!("Seller:  {}", invoice.seller.name);
    println!("Buyer:   {}", invoice.buyer.name);
    if let Some(gross) = invoice.totals.gross {
        println!("Total:   {gross} {}", invoice.currency);
    }
    println!("Lines:   {}", invoice.line_items.len());
    println!();

    if result.is_pass() {
        println!("PASS - invoice is valid");
    } else {
        println!("FAIL - invoice has {} error(s)", result.errors.len());
    }

    print_issues("Errors", &result.errors, verbose);
    print_issues("Warnings", &result.warnings, verbose);

    println!();
    println!(
        "Summary: {} error(s), {} warning(s)",
        result.errors.len(),
        result.warnings.len()
    );
}

fn print_issues(heading: &str, issues: &[ValidationIssue], verbose: bool) {
    if issues.is_empty() {
        return;
    }
    println!();
    println!("{heading}:");
    for (index, issue) in issues.iter().enumerate() {
        println!("  {}. {}: {}", index + 1, issue.code, issue.message);
        if let Some(path) = issue.path.as_deref().filter(|_| verbose) {
            println!("     Path: {path}");
        }
    }
}

//! Field extraction primitives shared by the UBL and CII mappers.
//!
//! Everything here is lenient: missing or unparsable values turn into
//! defaults so that the rule engine, not the mapper, reports them.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::tree::XmlElement;
use crate::core::{Contact, DEFAULT_UNIT_CODE};

/// Parse a decimal amount, defaulting to zero.
pub fn amount(text: Option<&str>) -> Decimal {
    text.and_then(|t| Decimal::from_str(t.trim()).ok())
        .unwrap_or(Decimal::ZERO)
}

pub fn amount_at(element: &XmlElement, path: &str) -> Decimal {
    amount(element.find_text(path))
}

/// Amount at the first of several alternative paths that is present.
///
/// Only that text is parsed; a malformed value there gives zero rather than
/// falling through to the next path.
pub fn first_amount(element: &XmlElement, paths: &[&str]) -> Decimal {
    amount(paths.iter().find_map(|p| element.find_text(p)))
}

/// Amount of an element that may be absent altogether.
///
/// `None` only when the element is missing. A present element with empty
/// or unparsable text yields zero.
pub fn optional_amount(element: &XmlElement, path: &str) -> Option<Decimal> {
    element.find(path).map(|e| amount(e.text()))
}

pub fn text(element: &XmlElement, path: &str) -> Option<String> {
    element.find_text(path).map(str::to_string)
}

/// Text of the first path that resolves to non-empty content.
pub fn first_text(element: &XmlElement, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .find_map(|p| element.find_text(p))
        .map(str::to_string)
}

pub fn first_element<'a>(element: &'a XmlElement, paths: &[&str]) -> Option<&'a XmlElement> {
    paths.iter().find_map(|p| element.find(p))
}

/// `unitCode` of a quantity element, falling back to `C62`.
pub fn unit_code(quantity: Option<&XmlElement>) -> String {
    quantity
        .and_then(|q| q.attr("unitCode"))
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .unwrap_or(DEFAULT_UNIT_CODE)
        .to_string()
}

/// Reduce a date or date-time to its date part.
///
/// `2024-01-15T10:00:00Z` and the zoned `xs:date` forms `2024-01-15Z` or
/// `2024-01-15+01:00` become `2024-01-15`, and the compact CII format
/// 102 (`20240115`) is rewritten as `2024-01-15`. Anything else passes
/// through trimmed, leaving it to the rule engine to reject.
pub fn date_only(raw: &str) -> String {
    let date = raw.trim();
    let date = date.split_once('T').map_or(date, |(day, _)| day);
    let date = strip_zone(date);
    if date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..])
    } else {
        date.to_string()
    }
}

/// Drop a trailing `Z` or `±hh:mm` zone from an ISO calendar date.
fn strip_zone(date: &str) -> &str {
    if let Some(day) = date.strip_suffix('Z') {
        return day;
    }
    match date.as_bytes() {
        [.., b'+' | b'-', h1, h2, b':', m1, m2]
            if date.len() == 16 && [h1, h2, m1, m2].iter().all(|b| b.is_ascii_digit()) =>
        {
            &date[..10]
        }
        _ => date,
    }
}

/// Contact details, `None` when neither channel is given.
pub fn contact(email: Option<String>, phone: Option<String>) -> Option<Contact> {
    (email.is_some() || phone.is_some()).then_some(Contact { email, phone })
}

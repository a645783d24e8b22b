//! Currency allow-list for CUR-02.
//!
//! A fixed subset of ISO 4217: the euro, the other European currencies an
//! invoice addressed to a German or EU recipient plausibly uses, and the
//! US dollar. Codes outside this set fail CUR-02 even when ISO 4217 knows
//! them.

/// Check whether `code` is on the allow-list. Matching is exact-case.
pub fn is_known_currency_code(code: &str) -> bool {
    ALLOWED_CURRENCIES.binary_search(&code).is_ok()
}

/// Sorted for binary search.
static ALLOWED_CURRENCIES: [&str; 19] = [
    "ALL", "BAM", "BGN", "CHF", "CZK", "DKK", "EUR", "GBP", "HRK", "HUF", "MDL", "MKD", "NOK",
    "PLN", "RON", "RSD", "SEK", "UAH", "USD",
];

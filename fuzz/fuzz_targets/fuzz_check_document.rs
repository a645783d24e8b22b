#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some(today) = NaiveDate::from_ymd_opt(2024, 6, 30) else {
        return;
    };
    if let Ok(checked) = erechnung::check_document_at(data, today) {
        assert_eq!(checked.validation.is_pass(), checked.validation.errors.is_empty());
    }
});

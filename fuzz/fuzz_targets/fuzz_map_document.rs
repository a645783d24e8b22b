#![no_main]

use libfuzzer_sys::fuzz_target;

use erechnung::Dialect;

fuzz_target!(|data: &[u8]| {
    // Both mappers on every input: errors are fine, panics are bugs.
    let _ = erechnung::map_document(data, Dialect::UblXRechnung);
    let _ = erechnung::map_document(data, Dialect::CiiXRechnung);
});

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must classify, never panic.
    let _ = erechnung::detect(data);
});

//! Fuzzing entry points for the srec-core readers
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_decode

use srec_core::{decoder, inspect, verify, Record};

pub fn fuzz_decode(data: &[u8]) {
    // Try to decode - should never panic
    let _ = decoder::decode_bytes(data);
    let mut sink = Vec::new();
    let _ = decoder::decode_reader(data, &mut sink);
}

pub fn fuzz_verify(data: &[u8]) {
    let _ = verify::verify_bytes(data);
}

pub fn fuzz_inspect(data: &[u8]) {
    let _ = inspect::inspect_bytes(data);
}

pub fn fuzz_parse(data: &[u8]) {
    if let Ok(line) = core::str::from_utf8(data) {
        if let Ok(record) = Record::parse(line) {
            // Anything that parses must serialize back to a parsable line
            let again = Record::parse(&record.serialize());
            assert_eq!(again.ok(), Some(record));
        }
    }
}

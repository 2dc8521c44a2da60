//! Fuzz target for the delimited reader.
//!
//! The reader must never panic on malformed input, whatever delimiter
//! detection and type inference decide.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tidyframe::Parser;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }
    let _ = Parser::new().parse_bytes(data);
});

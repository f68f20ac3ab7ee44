//! Fuzz target for the SPL parser.
//!
//! The parser must never panic on malformed or hostile XML: unbalanced
//! tags, unknown entities, missing sections and arbitrary bytes.

#![no_main]

use excipient::parse_spl;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 200_000 {
        return;
    }

    if let Ok(xml) = std::str::from_utf8(data) {
        if let Ok(doc) = parse_spl(xml) {
            // Inactive ingredients are unique and sorted
            assert!(doc.inactive.windows(2).all(|w| w[0] < w[1]));
        }
    }
});

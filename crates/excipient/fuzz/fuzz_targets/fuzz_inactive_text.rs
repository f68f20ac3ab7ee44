//! Fuzz target for splitting free-text inactive ingredient paragraphs.

#![no_main]

use excipient::spl::split_inactive_text;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    for name in split_inactive_text(text) {
        assert!(!name.is_empty());
        assert_eq!(name.trim(), name);
    }
});

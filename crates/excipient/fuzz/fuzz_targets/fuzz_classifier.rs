//! Fuzz target for classification.
//!
//! Checks the partition invariants on arbitrary records and selections.

#![no_main]

use arbitrary::Arbitrary;
use excipient::DrugRecord;
use excipient::classify::{Classifier, ExcipientSelection, MatchMode};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    records: Vec<Vec<String>>,
    selection: Vec<String>,
    contains: bool,
}

fuzz_target!(|input: Input| {
    let records: Vec<DrugRecord> = input
        .records
        .into_iter()
        .enumerate()
        .map(|(i, inactive)| DrugRecord::new(format!("Drug {}", i)).with_inactive(inactive))
        .collect();
    let total = records.len();

    let selection: ExcipientSelection = input.selection.into_iter().collect();
    let mode = if input.contains {
        MatchMode::Contains
    } else {
        MatchMode::Exact
    };

    let result = Classifier::new(selection.clone()).with_mode(mode).classify(records);

    assert_eq!(result.free.len() + result.containing.len(), total);
    assert!(result.free.iter().all(|r| r.matched_excipients.is_empty()));
    assert!(result.containing.iter().all(|r| !r.matched_excipients.is_empty()));
    if selection.is_empty() {
        assert!(result.containing.is_empty());
    }
});

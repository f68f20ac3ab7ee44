//! Excipient classification.
//!
//! Given the excipients a user wants to avoid and a set of drug records,
//! split the records into those free of every selected excipient and those
//! containing at least one, annotating which label ingredients matched.
//!
//! Comparison happens on a normalized form (trimmed, whitespace collapsed,
//! lowercased) while the original label text is kept for display.
//!
//! # Example
//!
//! ```
//! use excipient::classify::{classify, ExcipientSelection};
//! use excipient::DrugRecord;
//!
//! let records = vec![
//!     DrugRecord::new("DrugA").with_inactive(["Lactose", "Aspartame"]),
//!     DrugRecord::new("DrugB").with_inactive(["Corn Starch"]),
//! ];
//! let selection = ExcipientSelection::parse_list("aspartame");
//!
//! let classification = classify(&records, &selection);
//! assert_eq!(classification.free[0].record.name, "DrugB");
//! assert_eq!(classification.containing[0].matched_excipients, vec!["Aspartame"]);
//! ```

mod classifier;
mod normalize;
mod selection;

pub use classifier::{
    Category, Classification, ClassifiedResult, Classifier, IngredientFlag, MatchMode, classify,
};
pub use normalize::{normalize, title_case};
pub use selection::ExcipientSelection;

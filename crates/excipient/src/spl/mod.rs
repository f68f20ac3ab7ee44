//! Structured Product Labeling (SPL) parsing.
//!
//! DailyMed serves each drug label as an HL7 SPL XML document. This module
//! turns one document into an [`SplDocument`]: title, dosage form, route,
//! active ingredients with strengths, and inactive ingredients merged from
//! the structured product data and the free-text "Inactive ingredients"
//! section.

mod parser;
pub mod xml;

pub use parser::{
    INACTIVE_INGREDIENT_SECTION, PRODUCT_DATA_SECTION, SplDocument, parse_spl,
    split_inactive_text,
};

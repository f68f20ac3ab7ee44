//! Drug name autocomplete.
//!
//! Suggestions come from a [`DrugNameSource`]. [`RxTermsClient`] asks the NLM
//! RxTerms service; [`StaticDrugNames`] answers from a fixed list.

mod rxterms;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use rxterms::{RxTermsClient, parse_rxterms_response, split_route};

/// Queries shorter than this (after trimming) get no suggestions.
pub const MIN_QUERY_LEN: usize = 3;

/// Suggestions returned when the caller does not ask for a limit.
pub const DEFAULT_LIMIT: usize = 20;

/// Largest list RxTerms will return.
pub const MAX_LIST: usize = 500;

/// One autocomplete entry.
///
/// `name` is the full display string (`"Ibuprofen (Oral Pill)"`); the
/// secondary field carries the route and keeps its historical wire name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugSuggestion {
    pub name: String,
    pub manufacturer: String,
}

impl DrugSuggestion {
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
        }
    }
}

/// A source of drug name suggestions.
#[async_trait]
pub trait DrugNameSource: Send + Sync {
    /// Up to `limit` suggestions for a partial drug name.
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<DrugSuggestion>>;

    /// Name of this source (for logging).
    fn name(&self) -> &str;
}

/// Suggestions from a fixed list of display names, matched by
/// case-insensitive prefix.
#[derive(Debug, Clone, Default)]
pub struct StaticDrugNames {
    names: Vec<String>,
}

impl StaticDrugNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl DrugNameSource for StaticDrugNames {
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<DrugSuggestion>> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let mut seen = std::collections::HashSet::new();
        Ok(self
            .names
            .iter()
            .filter(|name| name.to_lowercase().starts_with(&query))
            .filter_map(|name| {
                let (base, route) = split_route(name);
                seen.insert(base.to_lowercase())
                    .then(|| DrugSuggestion::new(name.trim(), route))
            })
            .take(limit)
            .collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_names() {
        let source = StaticDrugNames::new([
            "Ibuprofen (Oral Pill)",
            "Ibuprofen (Oral Liquid)",
            "Ibandronate (Oral Pill)",
            "Acetaminophen (Oral Pill)",
        ]);

        let found = source.suggest("ibu", 10).await.unwrap();
        assert_eq!(found, vec![DrugSuggestion::new("Ibuprofen (Oral Pill)", "Oral Pill")]);

        assert!(source.suggest("IB", 10).await.unwrap().is_empty());
        assert_eq!(source.suggest("iba", 10).await.unwrap().len(), 1);
    }

    #[test]
    fn test_suggestion_wire_shape() {
        let json = serde_json::to_value(DrugSuggestion::new("Ibuprofen (Oral Pill)", "Oral Pill"))
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Ibuprofen (Oral Pill)", "manufacturer": "Oral Pill"})
        );
    }
}

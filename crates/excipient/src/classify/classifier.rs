//! Excipient-match classification of drug records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use super::normalize::normalize;
use super::selection::ExcipientSelection;
use crate::error::ExcipientError;
use crate::record::DrugRecord;

/// How a normalized ingredient is compared with the normalized selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The ingredient equals a selected excipient.
    #[default]
    Exact,
    /// Either string contains the other (`"red"` matches `"Fd&C Red No. 40"`).
    Contains,
}

impl FromStr for MatchMode {
    type Err = ExcipientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(MatchMode::Exact),
            "contains" | "partial" => Ok(MatchMode::Contains),
            other => Err(ExcipientError::Config(format!(
                "Unknown match mode: {}. Use exact or contains.",
                other
            ))),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Exact => write!(f, "exact"),
            MatchMode::Contains => write!(f, "contains"),
        }
    }
}

/// Which partition a record landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// No selected excipient was found.
    Free,
    /// At least one selected excipient was found.
    With,
}

/// An inactive ingredient flagged for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientFlag<'a> {
    pub name: &'a str,
    pub matched: bool,
}

/// A drug record annotated with the excipients it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedResult {
    pub record: DrugRecord,
    /// Original inactive-ingredient strings that matched, unique, in record order.
    pub matched_excipients: Vec<String>,
    pub is_free: bool,
}

impl ClassifiedResult {
    pub fn category(&self) -> Category {
        if self.is_free {
            Category::Free
        } else {
            Category::With
        }
    }

    /// Every inactive ingredient with its matched flag, in record order.
    pub fn flagged_inactive(&self) -> Vec<IngredientFlag<'_>> {
        self.record
            .inactive_ingredients
            .iter()
            .map(|name| IngredientFlag {
                name,
                matched: self.matched_excipients.contains(name),
            })
            .collect()
    }

    fn view(&self) -> ResultView<'_> {
        let r = &self.record;
        ResultView {
            set_id: &r.set_id,
            name: &r.name,
            dosage: &r.dosage,
            drug_type: &r.drug_type,
            route: &r.route,
            ndc: &r.ndc,
            packager: &r.packager,
            active_ingredients: &r.active_ingredients,
            inactive_ingredients: self.flagged_inactive(),
            matched_excipients: &self.matched_excipients,
            is_free: self.is_free,
            source_url: &r.source_url,
        }
    }
}

/// Presentation shape of a [`ClassifiedResult`].
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultView<'a> {
    set_id: &'a str,
    name: &'a str,
    dosage: &'a str,
    drug_type: &'a str,
    route: &'a str,
    ndc: &'a str,
    packager: &'a str,
    active_ingredients: &'a [String],
    inactive_ingredients: Vec<IngredientFlag<'a>>,
    matched_excipients: &'a [String],
    is_free: bool,
    source_url: &'a str,
}

impl Serialize for ClassifiedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.view().serialize(serializer)
    }
}

/// Records split by excipient content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Records containing none of the selected excipients, in input order.
    pub free: Vec<ClassifiedResult>,
    /// Records containing at least one selected excipient, in input order.
    pub containing: Vec<ClassifiedResult>,
}

impl Classification {
    pub fn total(&self) -> usize {
        self.free.len() + self.containing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Add a classified result to the matching partition.
    pub fn push(&mut self, result: ClassifiedResult) {
        if result.is_free {
            self.free.push(result);
        } else {
            self.containing.push(result);
        }
    }
}

/// Classifies drug records against an excipient selection.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    selection: ExcipientSelection,
    mode: MatchMode,
}

impl Classifier {
    pub fn new(selection: ExcipientSelection) -> Self {
        Self {
            selection,
            mode: MatchMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn selection(&self) -> &ExcipientSelection {
        &self.selection
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Classify a single record.
    pub fn classify_one(&self, record: DrugRecord) -> ClassifiedResult {
        let mut matched_excipients: Vec<String> = Vec::new();

        if !self.selection.is_empty() {
            for ingredient in &record.inactive_ingredients {
                if self.matches(&normalize(ingredient)) && !matched_excipients.contains(ingredient)
                {
                    matched_excipients.push(ingredient.clone());
                }
            }
        }

        let is_free = matched_excipients.is_empty();
        ClassifiedResult {
            record,
            matched_excipients,
            is_free,
        }
    }

    /// Classify records, keeping input order within each partition.
    pub fn classify<I>(&self, records: I) -> Classification
    where
        I: IntoIterator<Item = DrugRecord>,
    {
        let mut classification = Classification::default();
        for record in records {
            classification.push(self.classify_one(record));
        }
        classification
    }

    fn matches(&self, ingredient: &str) -> bool {
        if ingredient.is_empty() {
            return false;
        }

        match self.mode {
            MatchMode::Exact => self.selection.contains_normalized(ingredient),
            MatchMode::Contains => self
                .selection
                .normalized()
                .any(|wanted| ingredient.contains(wanted) || wanted.contains(ingredient)),
        }
    }
}

/// Partition `records` by overlap with `selection` using exact matching.
///
/// Inputs are not modified; the returned results own clones of the records.
pub fn classify(records: &[DrugRecord], selection: &ExcipientSelection) -> Classification {
    Classifier::new(selection.clone()).classify(records.iter().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, inactive: &[&str]) -> DrugRecord {
        DrugRecord::new(name).with_inactive(inactive.iter().copied())
    }

    #[test]
    fn test_exact_match_preserves_original_text() {
        let classifier = Classifier::new(ExcipientSelection::parse_list("aspartame"));
        let result = classifier.classify_one(record("DrugA", &["Lactose", " Aspartame "]));

        assert!(!result.is_free);
        assert_eq!(result.matched_excipients, vec![" Aspartame "]);
        assert_eq!(result.category(), Category::With);
    }

    #[test]
    fn test_exact_mode_ignores_substrings() {
        let classifier = Classifier::new(ExcipientSelection::parse_list("red"));
        let result = classifier.classify_one(record("DrugA", &["Fd&C Red No. 40"]));
        assert!(result.is_free);
    }

    #[test]
    fn test_contains_mode_matches_either_direction() {
        let classifier =
            Classifier::new(ExcipientSelection::parse_list("red, corn starch pregelatinized"))
                .with_mode(MatchMode::Contains);

        let result = classifier.classify_one(record("DrugA", &["Fd&C Red No. 40", "Corn Starch"]));
        assert_eq!(result.matched_excipients, vec!["Fd&C Red No. 40", "Corn Starch"]);
    }

    #[test]
    fn test_contains_mode_skips_blank_ingredients() {
        let classifier =
            Classifier::new(ExcipientSelection::parse_list("lactose")).with_mode(MatchMode::Contains);
        let result = classifier.classify_one(record("DrugA", &["  "]));
        assert!(result.is_free);
    }

    #[test]
    fn test_duplicate_ingredients_matched_once() {
        let classifier = Classifier::new(ExcipientSelection::parse_list("talc"));
        let result = classifier.classify_one(record("DrugA", &["Talc", "Talc"]));
        assert_eq!(result.matched_excipients, vec!["Talc"]);
    }

    #[test]
    fn test_flagged_inactive() {
        let classifier = Classifier::new(ExcipientSelection::parse_list("lactose"));
        let result = classifier.classify_one(record("DrugA", &["Lactose", "Talc"]));

        let flags = result.flagged_inactive();
        assert_eq!(flags.len(), 2);
        assert!(flags[0].matched);
        assert!(!flags[1].matched);
    }

    #[test]
    fn test_result_serialization_shape() {
        let classifier = Classifier::new(ExcipientSelection::parse_list("lactose"));
        let result = classifier.classify_one(record("DrugA", &["Lactose", "Talc"]));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["name"], "DrugA");
        assert_eq!(json["isFree"], false);
        assert_eq!(json["matchedExcipients"][0], "Lactose");
        assert_eq!(json["inactiveIngredients"][0]["name"], "Lactose");
        assert_eq!(json["inactiveIngredients"][0]["matched"], true);
        assert_eq!(json["inactiveIngredients"][1]["matched"], false);
        assert!(json.get("drugType").is_some());
    }

    #[test]
    fn test_match_mode_from_str() {
        assert_eq!("exact".parse::<MatchMode>().unwrap(), MatchMode::Exact);
        assert_eq!("Contains".parse::<MatchMode>().unwrap(), MatchMode::Contains);
        assert!("fuzzy".parse::<MatchMode>().is_err());
    }
}

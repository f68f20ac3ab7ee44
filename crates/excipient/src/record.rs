//! Drug product records built from parsed labels.

use serde::{Deserialize, Serialize};

use crate::spl::SplDocument;

/// Base URL of the human-readable DailyMed label page.
pub const DAILYMED_DRUG_INFO_URL: &str = "https://dailymed.nlm.nih.gov/dailymed/drugInfo.cfm";

/// Placeholder used for fields the label does not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Link to the canonical DailyMed page for a set id.
pub fn source_url(set_id: &str) -> String {
    format!("{}?setid={}", DAILYMED_DRUG_INFO_URL, set_id)
}

/// An active ingredient with its labeled strength.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveIngredient {
    /// Ingredient name, title-cased.
    pub name: String,
    /// Strength such as `"200 mg"`, or `"Strength not specified"`.
    pub strength: String,
}

impl ActiveIngredient {
    pub fn new(name: impl Into<String>, strength: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strength: strength.into(),
        }
    }
}

/// One labeled drug product.
///
/// Records are built once per fetch and never mutated by the classifier or
/// the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugRecord {
    /// SPL set id the record was built from.
    pub set_id: String,
    pub name: String,
    /// Active ingredients with strengths, e.g. `"Ibuprofen 200 mg"`.
    pub dosage: String,
    /// Dosage form, e.g. `"TABLET, FILM COATED"`.
    pub drug_type: String,
    pub route: String,
    pub ndc: String,
    pub packager: String,
    pub active_ingredients: Vec<String>,
    /// Inactive ingredients as extracted from the label.
    pub inactive_ingredients: Vec<String>,
    pub source_url: String,
}

impl DrugRecord {
    /// Create a record with only a name; every other field is empty or `N/A`.
    ///
    /// Mostly useful for tests and fixtures; real records come from
    /// [`DrugRecord::from_spl`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            set_id: String::new(),
            name: name.into(),
            dosage: NOT_AVAILABLE.to_string(),
            drug_type: NOT_AVAILABLE.to_string(),
            route: NOT_AVAILABLE.to_string(),
            ndc: NOT_AVAILABLE.to_string(),
            packager: NOT_AVAILABLE.to_string(),
            active_ingredients: Vec::new(),
            inactive_ingredients: Vec::new(),
            source_url: String::new(),
        }
    }

    /// Build a record from a parsed SPL document.
    ///
    /// `set_id` is the id the document was requested by; it is used when the
    /// document itself does not carry one.
    pub fn from_spl(set_id: &str, doc: &SplDocument) -> Self {
        let set_id = doc.set_id.as_deref().unwrap_or(set_id).to_string();

        Self {
            source_url: source_url(&set_id),
            set_id,
            name: doc.title.clone(),
            dosage: dosage_summary(&doc.active),
            drug_type: doc.form.clone(),
            route: doc.route.clone(),
            ndc: NOT_AVAILABLE.to_string(),
            packager: NOT_AVAILABLE.to_string(),
            active_ingredients: doc.active.iter().map(|a| a.name.clone()).collect(),
            inactive_ingredients: doc.inactive.clone(),
        }
    }

    /// Set the set id and the matching source URL.
    pub fn with_set_id(mut self, set_id: impl Into<String>) -> Self {
        self.set_id = set_id.into();
        self.source_url = source_url(&self.set_id);
        self
    }

    /// Set the inactive ingredients.
    pub fn with_inactive<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inactive_ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    /// Set the active ingredients.
    pub fn with_active<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    /// Set the NDC.
    pub fn with_ndc(mut self, ndc: impl Into<String>) -> Self {
        self.ndc = ndc.into();
        self
    }

    /// Set the packager (labeler) name.
    pub fn with_packager(mut self, packager: impl Into<String>) -> Self {
        self.packager = packager.into();
        self
    }
}

/// `"Name strength, Name strength"`, or `N/A` for no active ingredients.
fn dosage_summary(active: &[ActiveIngredient]) -> String {
    if active.is_empty() {
        return NOT_AVAILABLE.to_string();
    }

    active
        .iter()
        .map(|a| format!("{} {}", a.name, a.strength))
        .collect::<Vec<_>>()
        .join(", ")
}

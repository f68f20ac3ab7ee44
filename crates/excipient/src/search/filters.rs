//! Post-fetch filters over parsed labels.

use serde::{Deserialize, Serialize};

use crate::spl::SplDocument;

/// Keyword filters applied to each parsed label.
///
/// Every test is a case-insensitive substring test. An empty filter passes
/// every label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Must occur in the route of administration.
    pub route: Option<String>,
    /// At least one must occur in the dosage form.
    pub forms: Vec<String>,
    /// Each must occur in some active ingredient.
    pub include_active: Vec<String>,
    /// None may occur in any active ingredient.
    pub exclude_active: Vec<String>,
    /// Each must occur in some inactive ingredient.
    pub include_inactive: Vec<String>,
    /// None may occur in any inactive ingredient.
    pub exclude_inactive: Vec<String>,
    /// Every active ingredient must contain at least one of these.
    pub only_active: Vec<String>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no filter is set.
    pub fn is_empty(&self) -> bool {
        self.route.as_deref().is_none_or(|r| r.trim().is_empty())
            && self.forms.is_empty()
            && self.include_active.is_empty()
            && self.exclude_active.is_empty()
            && self.include_inactive.is_empty()
            && self.exclude_inactive.is_empty()
            && self.only_active.is_empty()
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn with_forms<I, S>(mut self, forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forms = forms.into_iter().map(Into::into).collect();
        self
    }

    pub fn include_active<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_active = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_active<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_active = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn include_inactive<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_inactive = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_inactive<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_inactive = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn only_active<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only_active = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a parsed label passes every filter.
    pub fn matches(&self, doc: &SplDocument) -> bool {
        if let Some(route) = self.route.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            if !doc.route.to_lowercase().contains(&route.to_lowercase()) {
                return false;
            }
        }

        let forms = lowered(&self.forms);
        if !forms.is_empty() {
            let form = doc.form.to_lowercase();
            if !forms.iter().any(|f| form.contains(f.as_str())) {
                return false;
            }
        }

        let active: Vec<String> = doc.active.iter().map(|a| a.name.to_lowercase()).collect();
        let inactive: Vec<String> = doc.inactive.iter().map(|i| i.to_lowercase()).collect();

        includes_all(&active, &lowered(&self.include_active))
            && excludes_all(&active, &lowered(&self.exclude_active))
            && includes_all(&inactive, &lowered(&self.include_inactive))
            && excludes_all(&inactive, &lowered(&self.exclude_inactive))
            && only_from(&active, &lowered(&self.only_active))
    }
}

fn lowered(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn any_contains(names: &[String], keyword: &str) -> bool {
    names.iter().any(|name| name.contains(keyword))
}

fn includes_all(names: &[String], keywords: &[String]) -> bool {
    keywords.iter().all(|k| any_contains(names, k))
}

fn excludes_all(names: &[String], keywords: &[String]) -> bool {
    !keywords.iter().any(|k| any_contains(names, k))
}

fn only_from(active: &[String], keywords: &[String]) -> bool {
    keywords.is_empty()
        || active
            .iter()
            .all(|name| keywords.iter().any(|k| name.contains(k.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ActiveIngredient;

    fn doc() -> SplDocument {
        SplDocument {
            set_id: None,
            title: "Combo".to_string(),
            form: "TABLET, FILM COATED".to_string(),
            route: "ORAL".to_string(),
            active: vec![
                ActiveIngredient::new("Acetaminophen", "325 mg"),
                ActiveIngredient::new("Diphenhydramine Hydrochloride", "25 mg"),
            ],
            inactive: vec!["Corn Starch".to_string(), "Povidone".to_string()],
        }
    }

    #[test]
    fn test_empty_filters_pass() {
        assert!(SearchFilters::new().is_empty());
        assert!(SearchFilters::new().matches(&doc()));
    }

    #[test]
    fn test_route_and_form() {
        assert!(SearchFilters::new().with_route("oral").matches(&doc()));
        assert!(!SearchFilters::new().with_route("topical").matches(&doc()));
        assert!(
            SearchFilters::new()
                .with_forms(["capsule", "tablet"])
                .matches(&doc())
        );
        assert!(!SearchFilters::new().with_forms(["capsule"]).matches(&doc()));
    }

    #[test]
    fn test_active_filters() {
        assert!(
            SearchFilters::new()
                .include_active(["acetaminophen", "diphenhydramine"])
                .matches(&doc())
        );
        assert!(
            !SearchFilters::new()
                .include_active(["acetaminophen", "ibuprofen"])
                .matches(&doc())
        );
        assert!(
            !SearchFilters::new()
                .exclude_active(["diphenhydramine"])
                .matches(&doc())
        );
    }

    #[test]
    fn test_inactive_filters() {
        assert!(
            SearchFilters::new()
                .include_inactive(["starch"])
                .matches(&doc())
        );
        assert!(
            !SearchFilters::new()
                .exclude_inactive(["POVIDONE"])
                .matches(&doc())
        );
    }

    #[test]
    fn test_only_active() {
        assert!(!SearchFilters::new().only_active(["acetaminophen"]).matches(&doc()));
        assert!(
            SearchFilters::new()
                .only_active(["acetaminophen", "diphenhydramine"])
                .matches(&doc())
        );
    }
}

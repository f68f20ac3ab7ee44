//! The set of excipients a user asked about.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::normalize::normalize;

/// User-chosen excipient names, deduplicated by normalized form.
///
/// The first spelling seen for each normalized name is kept for display.
/// Entries that normalize to the empty string are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcipientSelection {
    /// normalized -> original
    entries: IndexMap<String, String>,
}

impl ExcipientSelection {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list such as `"aspartame, lactose"`.
    pub fn parse_list(list: &str) -> Self {
        list.split(',').collect()
    }

    /// Add an excipient. Returns `false` if it was empty or already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let original = name.into();
        let key = normalize(&original);
        if key.is_empty() || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, original.trim().to_string());
        true
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether a normalized name is part of the selection.
    pub fn contains_normalized(&self, normalized: &str) -> bool {
        self.entries.contains_key(normalized)
    }

    /// Normalized names, in insertion order.
    pub fn normalized(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Names as the user typed them (trimmed), in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    /// Names as the user typed them, owned.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.values().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for ExcipientSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        for name in iter {
            selection.insert(name);
        }
        selection
    }
}

impl Serialize for ExcipientSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupes_by_normalized_form() {
        let selection: ExcipientSelection = ["Aspartame", " aspartame ", "ASPARTAME", "Lactose"]
            .into_iter()
            .collect();

        assert_eq!(selection.len(), 2);
        assert_eq!(selection.to_vec(), vec!["Aspartame", "Lactose"]);
        assert!(selection.contains_normalized("aspartame"));
        assert!(!selection.contains_normalized("Aspartame"));
    }

    #[test]
    fn test_parse_list_drops_blanks() {
        let selection = ExcipientSelection::parse_list("aspartame, ,lactose,,  ");
        assert_eq!(selection.to_vec(), vec!["aspartame", "lactose"]);
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(ExcipientSelection::parse_list("").is_empty());
    }

    #[test]
    fn test_insert_reports_duplicates() {
        let mut selection = ExcipientSelection::new();
        assert!(selection.insert("Gelatin"));
        assert!(!selection.insert("gelatin"));
        assert!(!selection.insert("   "));
    }

    #[test]
    fn test_serializes_as_list() {
        let selection = ExcipientSelection::parse_list("Red Dye, Gluten");
        let json = serde_json::to_string(&selection).unwrap();
        assert_eq!(json, r#"["Red Dye","Gluten"]"#);
    }
}

//! Excipient categories for the selection UI.
//!
//! The category table is a CSV export with (at least) an `INGREDIENT_NAME`
//! and a `Category` column. Ingredients are grouped per category and the
//! categories are ordered for display.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ExcipientError, Result};

/// Column holding the ingredient name.
pub const INGREDIENT_COLUMN: &str = "INGREDIENT_NAME";

/// Column holding the category name.
pub const CATEGORY_COLUMN: &str = "Category";

/// Display order of the known categories.
pub const CATEGORY_ORDER: [&str; 12] = [
    "Alcohols (Ethyl, Isopropyl, Benzyl, etc.)",
    "Anti-adherents / Lubricants / Glidants",
    "Antimicrobial Agents",
    "Binders / Fillers",
    "Coatings",
    "Colorants / Dyes",
    "Disintegrants",
    "Flavorings / Sweeteners",
    "Fragrances / Odorants",
    "Other-2",
    "Preservatives",
    "Solubilizing Agents",
];

/// One category with its ingredients, as served to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    /// 1-based position; categories outside [`CATEGORY_ORDER`] come after
    /// the known ones.
    pub display_order: usize,
    /// Sorted, unique ingredient names.
    pub ingredients: Vec<String>,
}

/// Ingredient names grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcipientCategories {
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl ExcipientCategories {
    /// A table with no categories.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the table from a CSV file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ExcipientError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let table = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            categories = table.len(),
            "Loaded excipient categories"
        );
        Ok(table)
    }

    /// Read the table from CSV data.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let (ingredient_idx, category_idx) = match (
            column(INGREDIENT_COLUMN),
            column(CATEGORY_COLUMN),
        ) {
            (Some(i), Some(c)) => (i, c),
            _ => {
                return Err(ExcipientError::Config(format!(
                    "Category table is missing required columns: {}, {}",
                    INGREDIENT_COLUMN, CATEGORY_COLUMN
                )));
            }
        };

        let mut table = Self::empty();
        let mut skipped = 0usize;
        for row in reader.records() {
            let row = row?;
            let ingredient = row.get(ingredient_idx).unwrap_or("");
            let category = row.get(category_idx).unwrap_or("");
            if !table.insert(category, ingredient) {
                skipped += 1;
            }
        }

        if skipped > 0 {
            debug!(skipped, "Skipped category rows without name or category");
        }
        Ok(table)
    }

    /// Add an ingredient to a category. Returns `false` if either is blank.
    pub fn insert(&mut self, category: &str, ingredient: &str) -> bool {
        let category = category.trim();
        let ingredient = ingredient.trim();
        if category.is_empty() || ingredient.is_empty() {
            return false;
        }

        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(ingredient.to_string());
        true
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Ingredients of one category, sorted.
    pub fn get(&self, category: &str) -> Option<Vec<&str>> {
        self.categories
            .get(category)
            .map(|set| set.iter().map(String::as_str).collect())
    }

    /// Categories containing an ingredient (case-insensitive).
    pub fn find_category(&self, ingredient: &str) -> Vec<&str> {
        let wanted = ingredient.trim().to_lowercase();
        self.categories
            .iter()
            .filter(|(_, names)| names.iter().any(|n| n.to_lowercase() == wanted))
            .map(|(category, _)| category.as_str())
            .collect()
    }

    /// Categories in display order.
    pub fn ordered(&self) -> Vec<CategoryEntry> {
        let mut entries: Vec<CategoryEntry> = self
            .categories
            .iter()
            .map(|(name, ingredients)| CategoryEntry {
                name: name.clone(),
                display_order: display_order(name),
                ingredients: ingredients.iter().cloned().collect(),
            })
            .collect();

        // BTreeMap iteration is alphabetical, so the sort keeps unknown
        // categories alphabetical among themselves.
        entries.sort_by_key(|e| e.display_order);
        entries
    }
}

fn display_order(category: &str) -> usize {
    CATEGORY_ORDER
        .iter()
        .position(|known| *known == category)
        .map(|idx| idx + 1)
        .unwrap_or(CATEGORY_ORDER.len() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
INGREDIENT_NAME,Category,UNII
Talc,Anti-adherents / Lubricants / Glidants,7SEV7J4R1U
Aspartame,Flavorings / Sweeteners,Z0H242BBR1
 Sucralose ,Flavorings / Sweeteners,
Aspartame,Flavorings / Sweeteners,Z0H242BBR1
Gelatin,,
,Coatings,
Ethanol,Alcohols (Ethyl, Isopropyl, Benzyl, etc.),
";

    #[test]
    fn test_groups_and_orders() {
        let csv = CSV.replace(
            "Alcohols (Ethyl, Isopropyl, Benzyl, etc.)",
            "\"Alcohols (Ethyl, Isopropyl, Benzyl, etc.)\"",
        );
        let table = ExcipientCategories::from_reader(csv.as_bytes()).unwrap();

        let ordered = table.ordered();
        let names: Vec<&str> = ordered.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Alcohols (Ethyl, Isopropyl, Benzyl, etc.)",
                "Anti-adherents / Lubricants / Glidants",
                "Flavorings / Sweeteners",
            ]
        );
        assert_eq!(ordered[0].display_order, 1);
        assert_eq!(ordered[2].ingredients, vec!["Aspartame", "Sucralose"]);
    }

    #[test]
    fn test_unknown_categories_sort_last() {
        let table = ExcipientCategories::from_reader(
            "INGREDIENT_NAME,Category\nX,Zeta\nY,Coatings\nZ,Alpha\n".as_bytes(),
        )
        .unwrap();

        let names: Vec<String> = table.ordered().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Coatings", "Alpha", "Zeta"]);
    }

    #[test]
    fn test_missing_columns() {
        let err = ExcipientCategories::from_reader("NAME,Category\nTalc,Coatings\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ExcipientError::Config(_)));
    }

    #[test]
    fn test_find_category() {
        let mut table = ExcipientCategories::empty();
        table.insert("Coatings", "Shellac");
        table.insert("Colorants / Dyes", "Shellac");
        assert_eq!(
            table.find_category("shellac"),
            vec!["Coatings", "Colorants / Dyes"]
        );
        assert!(table.find_category("talc").is_empty());
        assert_eq!(table.get("Coatings"), Some(vec!["Shellac"]));
    }
}

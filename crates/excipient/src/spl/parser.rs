//! Extraction of product data from SPL documents.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::xml::{Element, parse_document};
use crate::classify::title_case;
use crate::error::Result;
use crate::record::{ActiveIngredient, NOT_AVAILABLE};

/// LOINC code of the "SPL product data elements" section.
pub const PRODUCT_DATA_SECTION: &str = "48780-1";

/// LOINC code of the "inactive ingredient" section.
pub const INACTIVE_INGREDIENT_SECTION: &str = "51727-6";

/// Ingredient class codes for active ingredients (basis of strength, moiety,
/// reference).
const ACTIVE_CLASS_CODES: [&str; 3] = ["ACTIB", "ACTIM", "ACTIR"];

/// Ingredient class code for inactive ingredients.
const INACTIVE_CLASS_CODE: &str = "IACT";

const STRENGTH_NOT_SPECIFIED: &str = "Strength not specified";

/// Titles that name the label layout rather than the product.
const GENERIC_TITLES: [&str; 2] = ["drug facts", "drug facts label"];

static AND_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\sAND\s").expect("valid regex"));

/// The product data extracted from one SPL document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplDocument {
    pub set_id: Option<String>,
    pub title: String,
    /// Dosage form display name.
    pub form: String,
    /// Route of administration display name.
    pub route: String,
    pub active: Vec<ActiveIngredient>,
    /// Title-cased, deduplicated and sorted.
    pub inactive: Vec<String>,
}

/// Parse a raw SPL XML document.
pub fn parse_spl(xml: &str) -> Result<SplDocument> {
    let root = parse_document(xml)?;

    let set_id = root
        .descendants_named("setId")
        .find_map(|e| e.attr("root"))
        .map(str::to_string);

    let data_section = find_section(&root, PRODUCT_DATA_SECTION);
    let inactive_section = find_section(&root, INACTIVE_INGREDIENT_SECTION);

    let active = data_section.map(active_ingredients).unwrap_or_default();
    let title = document_title(&root, data_section, &active);

    let form = data_section
        .and_then(|s| s.find_child_of("manufacturedProduct", "formCode"))
        .and_then(|e| e.attr("displayName"))
        .unwrap_or(NOT_AVAILABLE)
        .to_string();

    let route = data_section
        .and_then(|s| s.find_child_of("substanceAdministration", "routeCode"))
        .and_then(|e| e.attr("displayName"))
        .unwrap_or(NOT_AVAILABLE)
        .to_string();

    let mut inactive: BTreeSet<String> = BTreeSet::new();
    if let Some(section) = data_section {
        inactive.extend(structured_inactive(section));
    }
    if let Some(section) = inactive_section {
        inactive.extend(split_inactive_text(&section_paragraph_text(section)));
    }

    let inactive: BTreeSet<String> = inactive.iter().map(|i| title_case(i)).collect();

    Ok(SplDocument {
        set_id,
        title,
        form,
        route,
        active,
        inactive: inactive.into_iter().collect(),
    })
}

/// First `section` whose direct `code` child carries the given code.
fn find_section<'a>(root: &'a Element, code: &str) -> Option<&'a Element> {
    root.descendants_named("section").find(|section| {
        section
            .child("code")
            .and_then(|c| c.attr("code"))
            .is_some_and(|c| c == code)
    })
}

fn document_title(
    root: &Element,
    data_section: Option<&Element>,
    active: &[ActiveIngredient],
) -> String {
    let product_name = |scope: &Element| {
        scope
            .find_child_of("manufacturedProduct", "name")
            .map(Element::collapsed_text)
            .filter(|name| !name.is_empty())
    };

    if let Some(name) = data_section.and_then(product_name) {
        return name;
    }

    let title = root
        .descendants_named("title")
        .next()
        .map(Element::collapsed_text)
        .filter(|t| !t.is_empty());

    match title {
        Some(t) if GENERIC_TITLES.contains(&t.to_lowercase().as_str()) => {
            let fallback = if data_section.is_some() {
                Some(active.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(" / "))
                    .filter(|joined| !joined.is_empty())
            } else {
                product_name(root)
            };
            fallback.unwrap_or(t)
        }
        Some(t) => t,
        None => NOT_AVAILABLE.to_string(),
    }
}

fn is_class(ingredient: &Element, codes: &[&str]) -> bool {
    ingredient
        .attr("classCode")
        .is_some_and(|code| codes.contains(&code))
}

fn active_ingredients(section: &Element) -> Vec<ActiveIngredient> {
    section
        .descendants_named("ingredient")
        .filter(|i| is_class(i, &ACTIVE_CLASS_CODES))
        .map(|ingredient| {
            let name = ingredient
                .find_child_of("ingredientSubstance", "name")
                .map(Element::collapsed_text)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unknown".to_string());

            let strength = ingredient
                .find_child_of("quantity", "numerator")
                .map(|numerator| {
                    let value = numerator.attr("value").unwrap_or(NOT_AVAILABLE);
                    let unit = numerator.attr("unit").unwrap_or("");
                    format!("{} {}", value, unit).trim().to_string()
                })
                .unwrap_or_else(|| STRENGTH_NOT_SPECIFIED.to_string());

            ActiveIngredient::new(title_case(&name), strength)
        })
        .collect()
}

/// Upper-cased names of the structured inactive ingredients.
fn structured_inactive(section: &Element) -> Vec<String> {
    section
        .descendants_named("ingredient")
        .filter(|i| is_class(i, &[INACTIVE_CLASS_CODE]))
        .filter_map(|i| i.find_child_of("ingredientSubstance", "name"))
        .map(|name| name.collapsed_text().to_uppercase())
        .filter(|name| !name.is_empty())
        .collect()
}

fn section_paragraph_text(section: &Element) -> String {
    section
        .descendants_named("paragraph")
        .map(|p| p.text().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split the human-readable inactive ingredient paragraph into upper-cased
/// ingredient names.
///
/// `"Inactive ingredients: corn starch, FD&C red no. 40 and talc."` yields
/// `CORN STARCH`, `FD&C RED NO. 40`, `TALC`.
pub fn split_inactive_text(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut body = lowered.trim();
    if let Some(rest) = body
        .strip_prefix("inactive ingredients")
        .or_else(|| body.strip_prefix("inactive ingredient"))
    {
        body = rest.trim();
    }
    let body = body.trim_matches(|c| c == '.' || c == ':' || c == ' ');

    let mut names = Vec::new();
    for item in body.split(',') {
        let item = item.trim().to_uppercase();
        if item.is_empty() {
            continue;
        }
        for part in AND_SEPARATOR.split(&item) {
            let part = part.trim();
            if !part.is_empty() {
                names.push(part.to_string());
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_inactive_text() {
        let names = split_inactive_text(
            "Inactive ingredients: corn starch, FD&C red no. 40 and talc, magnesium stearate.",
        );
        assert_eq!(
            names,
            vec!["CORN STARCH", "FD&C RED NO. 40", "TALC", "MAGNESIUM STEARATE"]
        );
    }

    #[test]
    fn test_split_inactive_text_without_heading() {
        assert_eq!(split_inactive_text("lactose"), vec!["LACTOSE"]);
        assert!(split_inactive_text("Inactive ingredients:").is_empty());
    }

    #[test]
    fn test_split_keeps_words_containing_and() {
        assert_eq!(split_inactive_text("sandalwood oil"), vec!["SANDALWOOD OIL"]);
    }

    #[test]
    fn test_find_section_by_code() {
        let root = parse_document(
            r#"<doc><section><code code="1"/></section><section><code code="48780-1"/><title>x</title></section></doc>"#,
        )
        .unwrap();
        let section = find_section(&root, PRODUCT_DATA_SECTION).unwrap();
        assert_eq!(section.child("title").unwrap().text(), "x");
    }
}

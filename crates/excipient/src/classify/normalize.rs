//! Canonical form used to compare ingredient names.

/// Normalize an ingredient or excipient name for comparison.
///
/// Trims the ends, collapses internal whitespace runs to a single space and
/// lowercases. Label text is free-form, so `" Corn  STARCH"` and
/// `"corn starch"` must compare equal.
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Python-style title casing used for ingredient display names.
///
/// A cased character is uppercased when the previous character is not a
/// letter and lowercased otherwise, so `"FD&C RED NO. 40"` becomes
/// `"Fd&C Red No. 40"`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut previous_is_letter = false;

    for c in name.chars() {
        if previous_is_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_folds() {
        assert_eq!(normalize(" Aspartame "), "aspartame");
        assert_eq!(normalize("CORN\tStarch"), "corn starch");
        assert_eq!(normalize("corn   starch\n"), "corn starch");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_normalize_unicode() {
        assert_eq!(normalize("ÉTHANOL"), "éthanol");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("MAGNESIUM STEARATE"), "Magnesium Stearate");
        assert_eq!(title_case("fd&c red no. 40"), "Fd&C Red No. 40");
        assert_eq!(title_case("d&c yellow #10"), "D&C Yellow #10");
        assert_eq!(title_case("polyethylene glycol 3350"), "Polyethylene Glycol 3350");
    }
}

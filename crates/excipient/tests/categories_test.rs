//! Integration tests for loading excipient category tables.

use std::io::Write;
use tempfile::NamedTempFile;

use excipient::{ExcipientCategories, ExcipientError};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

#[test]
fn test_load_from_file() {
    let file = create_test_file(
        "INGREDIENT_NAME,Category\n\
         Lactose Monohydrate,Binders / Fillers\n\
         Microcrystalline Cellulose,Binders / Fillers\n\
         Sodium Benzoate,Preservatives\n\
         Croscarmellose Sodium,Disintegrants\n",
    );

    let table = ExcipientCategories::load(file.path()).expect("table loads");
    assert_eq!(table.len(), 3);

    let ordered = table.ordered();
    let names: Vec<&str> = ordered.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Binders / Fillers", "Disintegrants", "Preservatives"]);
    assert_eq!(
        ordered[0].ingredients,
        vec!["Lactose Monohydrate", "Microcrystalline Cellulose"]
    );
    assert_eq!(ordered[0].display_order, 4);
    assert_eq!(ordered[1].display_order, 7);
    assert_eq!(ordered[2].display_order, 11);
}

#[test]
fn test_extra_columns_and_column_order() {
    let file = create_test_file(
        "UNII,Category,INGREDIENT_NAME\n\
         ZB0R3SL9IL,Colorants / Dyes,FD&C Red No. 40\n\
         15FIX9V2JP,Coatings,Titanium Dioxide\n",
    );

    let table = ExcipientCategories::load(file.path()).unwrap();
    assert_eq!(table.get("Colorants / Dyes"), Some(vec!["FD&C Red No. 40"]));
    assert_eq!(table.find_category("titanium dioxide"), vec!["Coatings"]);
}

#[test]
fn test_missing_file() {
    let err = ExcipientCategories::load("/nonexistent/excipient_categories.csv").unwrap_err();
    match err {
        ExcipientError::Io { path, .. } => {
            assert!(path.ends_with("excipient_categories.csv"));
        }
        other => panic!("expected IO error, got {:?}", other),
    }
}

#[test]
fn test_missing_columns() {
    let file = create_test_file("name,group\nTalc,Glidants\n");
    let err = ExcipientCategories::load(file.path()).unwrap_err();
    assert!(matches!(err, ExcipientError::Config(_)));
}

#[test]
fn test_serialized_entries() {
    let file = create_test_file("INGREDIENT_NAME,Category\nShellac,Coatings\nShellac,Zeta Group\n");
    let table = ExcipientCategories::load(file.path()).unwrap();

    let json = serde_json::to_value(table.ordered()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"name": "Coatings", "display_order": 5, "ingredients": ["Shellac"]},
            {"name": "Zeta Group", "display_order": 13, "ingredients": ["Shellac"]}
        ])
    );
}

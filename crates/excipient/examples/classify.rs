//! Example: Search and classify labels from an in-memory label source.
//!
//! Usage:
//!   cargo run --example classify -- [excipients]
//!
//! Example:
//!   cargo run --example classify -- "lactose monohydrate, fd&c red no. 40"

use std::env;
use std::sync::Arc;

use excipient::autocomplete::StaticDrugNames;
use excipient::source::{MockLabel, MockLabelSource};
use excipient::{ExcipientSelection, ExcipientService, SearchRequest, ServiceConfig};

#[tokio::main]
async fn main() -> excipient::Result<()> {
    let excipients = env::args()
        .nth(1)
        .unwrap_or_else(|| "lactose monohydrate".to_string());

    let labels = MockLabelSource::new()
        .with_label(
            MockLabel::new("demo-1", "Ibuprofen Tablets")
                .form("TABLET, FILM COATED")
                .route("ORAL")
                .active("IBUPROFEN", "200", "mg")
                .inactive(["LACTOSE MONOHYDRATE", "CORN STARCH", "FD&C RED NO. 40"])
                .ndc("0000-1111-22")
                .packager("Demo Labs"),
        )
        .with_label(
            MockLabel::new("demo-2", "Ibuprofen Oral Suspension")
                .form("SUSPENSION")
                .route("ORAL")
                .active("IBUPROFEN", "100", "mg")
                .inactive_text("Inactive ingredients: glycerin, sucrose and xanthan gum."),
        )
        .with_label(
            MockLabel::new("demo-3", "Ibuprofen Gel Caps")
                .form("CAPSULE, LIQUID FILLED")
                .route("ORAL")
                .active("IBUPROFEN", "200", "mg")
                .inactive(["GELATIN", "SORBITOL", "FD&C RED NO. 40"]),
        );

    let names = StaticDrugNames::new(["Ibuprofen (Oral Pill)", "Ibuprofen (Oral Liquid)"]);
    let config = ServiceConfig::default().with_enrichment(true);
    let service = ExcipientService::with_sources(config, Arc::new(labels), Arc::new(names));

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Excipient search: ibuprofen, avoiding [{}]", excipients);
    println!("{}", separator);
    println!();

    println!("## Suggestions for \"ibu\"");
    for suggestion in service.autocomplete("ibu", None).await {
        println!("  {} ({})", suggestion.name, suggestion.manufacturer);
    }
    println!();

    let selection = ExcipientSelection::parse_list(&excipients);
    let report = service
        .search(&SearchRequest::new("ibuprofen"), &selection)
        .await?;

    println!("## Free of selected excipients ({})", report.metadata.total_free);
    for result in &report.results_free {
        println!("  {} | {} | {}", result.record.name, result.record.dosage, result.record.ndc);
    }
    println!();

    println!("## Contains selected excipients ({})", report.metadata.total_with);
    for result in &report.results_with {
        println!(
            "  {} | matched: {}",
            result.record.name,
            result.matched_excipients.join(", ")
        );
    }
    println!();

    println!("## JSON report");
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

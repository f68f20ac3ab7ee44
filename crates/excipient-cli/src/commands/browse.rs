//! Browsing commands: SPL search and the DailyMed listings.

use colored::Colorize;
use excipient::source::{LabelSource, ListingKind, PageMetadata, SplQuery};

use super::{CommandResult, dailymed, print_next_page_hint, runtime};
use crate::cli::{PageArgs, ServiceArgs, SplQueryArgs};

pub fn search_spls(
    args: &ServiceArgs,
    query: SplQueryArgs,
    page: PageArgs,
    json: bool,
) -> CommandResult {
    let query = spl_query(query).with_page(page.page, page.pagesize);
    let client = dailymed(args)?;
    let results = runtime()?.block_on(client.search_spls(&query))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.data.is_empty() {
        println!("{}", "No labels found.".yellow());
        return Ok(());
    }

    for spl in &results.data {
        println!("{}  {}", spl.setid.dimmed(), spl.title);
        if let Some(published) = &spl.published_date {
            println!("    published {}", published);
        }
    }

    print_next_page_hint(&results.metadata);
    Ok(())
}

pub fn list(
    args: &ServiceArgs,
    kind: ListingKind,
    filters: Vec<(String, String)>,
    page: PageArgs,
) -> CommandResult {
    let client = dailymed(args)?;
    let value =
        runtime()?.block_on(client.listing(kind, page.page, page.pagesize, &filters))?;

    println!("{}", serde_json::to_string_pretty(&value)?);

    if let Some(metadata) = value.get("metadata") {
        match serde_json::from_value::<PageMetadata>(metadata.clone()) {
            Ok(metadata) => print_next_page_hint(&metadata),
            Err(e) => eprintln!("{} Could not read pagination: {}", "Warning:".yellow(), e),
        }
    }
    Ok(())
}

fn spl_query(args: SplQueryArgs) -> SplQuery {
    SplQuery {
        drug_name: args.drug_name,
        name_type: args.name_type,
        ndc: args.ndc,
        labeler: args.labeler,
        manufacturer: args.manufacturer,
        application_number: args.application_number,
        marketing_category_code: args.marketing_category_code,
        doctype: args.doctype,
        dea_schedule_code: args.dea_schedule_code,
        drug_class_code: args.drug_class_code,
        drug_class_coding_system: args.drug_class_coding_system,
        boxed_warning: args.boxed_warning,
        rxcui: args.rxcui,
        setid: args.setid,
        unii_code: args.unii_code,
        published_date: args.published_date,
        published_date_comparison: args.published_date_comparison,
        ..SplQuery::default()
    }
}

//! Search command - fetch labels for a drug and classify them by excipients.

use colored::Colorize;
use excipient::{ClassifiedResult, ExcipientSelection, ExcipientService, SearchFilters, SearchRequest};

use super::{CommandResult, print_next_page_hint, runtime, service_config};
use crate::cli::{FilterArgs, PageArgs, ServiceArgs};

pub fn run(
    args: &ServiceArgs,
    drug_name: String,
    excipients: Option<String>,
    filters: FilterArgs,
    page: PageArgs,
    json: bool,
) -> CommandResult {
    let selection = excipients
        .as_deref()
        .map(ExcipientSelection::parse_list)
        .unwrap_or_default();

    let request = SearchRequest::new(drug_name)
        .with_page(page.page)
        .with_pagesize(page.pagesize)
        .with_filters(search_filters(filters));
    request.validate()?;

    if !json {
        println!(
            "{} {} (page {}, up to {} labels)",
            "Searching".cyan().bold(),
            request.drug_name.white().bold(),
            request.page,
            request.pagesize
        );
        println!("Each label is fetched and parsed; this may take a moment.");
    }

    let config = service_config(args)?;
    let rt = runtime()?;
    let report = rt.block_on(async {
        let service = ExcipientService::new(config)?;
        service.search(&request, &selection).await
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let highlighted = !selection.is_empty();
    if highlighted {
        println!();
        println!(
            "{} {}",
            "Free of".green().bold(),
            report.excipients_highlighted.join(", ").white()
        );
    }
    for result in &report.results_free {
        print_result(result, highlighted);
    }

    if highlighted {
        println!();
        println!(
            "{} {}",
            "Containing".red().bold(),
            report.excipients_highlighted.join(", ").white()
        );
        for result in &report.results_with {
            print_result(result, highlighted);
        }
    }

    println!();
    println!(
        "Found {} products ({} free, {} with selected excipients)",
        report.metadata.total.to_string().white().bold(),
        report.metadata.total_free.to_string().green(),
        report.metadata.total_with.to_string().red()
    );
    if !report.skipped.is_empty() {
        println!(
            "{} {} labels could not be read",
            "Note:".yellow(),
            report.skipped.len()
        );
        for skipped in &report.skipped {
            println!("  {} {}", skipped.set_id.dimmed(), skipped.reason);
        }
    }

    print_next_page_hint(&report.page);
    Ok(())
}

fn search_filters(args: FilterArgs) -> SearchFilters {
    SearchFilters {
        route: args.route,
        forms: args.forms,
        include_active: args.include_active,
        exclude_active: args.exclude_active,
        include_inactive: args.include_inactive,
        exclude_inactive: args.exclude_inactive,
        only_active: args.only_active,
    }
}

fn print_result(result: &ClassifiedResult, highlighted: bool) {
    let record = &result.record;
    println!();
    println!("{}", "=".repeat(50).dimmed());
    println!("Drug:   {}", record.name.white().bold());
    println!("Dosage: {}", record.dosage);
    println!("Form:   {}", record.drug_type);
    println!("Route:  {}", record.route);
    if record.ndc != excipient::record::NOT_AVAILABLE {
        println!("NDC:    {}", record.ndc);
    }
    if record.packager != excipient::record::NOT_AVAILABLE {
        println!("Packager: {}", record.packager);
    }
    println!("Set ID: {}", record.set_id.dimmed());
    println!("Label:  {}", record.source_url);

    if record.inactive_ingredients.is_empty() {
        println!("No inactive ingredients found or parsed.");
        return;
    }

    println!("Inactive ingredients:");
    for flag in result.flagged_inactive() {
        if highlighted && flag.matched {
            println!("  - {}", flag.name.red().bold());
        } else {
            println!("  - {}", flag.name);
        }
    }
}

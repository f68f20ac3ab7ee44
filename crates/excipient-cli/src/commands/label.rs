//! Single-label commands: ingredients, raw XML, history, NDCs, packaging.

use colored::Colorize;
use excipient::parse_spl;
use excipient::source::LabelSource;

use super::{CommandResult, dailymed, runtime};
use crate::cli::ServiceArgs;

/// Parse one label and print its ingredients.
pub fn ingredients(args: &ServiceArgs, set_id: &str, json: bool) -> CommandResult {
    let client = dailymed(args)?;
    let xml = runtime()?.block_on(client.spl_document(set_id))?;
    let doc = parse_spl(&xml)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("Drug:  {}", doc.title.white().bold());
    println!("Form:  {}", doc.form);
    println!("Route: {}", doc.route);
    println!();

    if doc.active.is_empty() && doc.inactive.is_empty() {
        println!("{}", "No ingredient information could be parsed.".yellow());
        return Ok(());
    }

    println!("{}", "Active ingredients".cyan().bold());
    if doc.active.is_empty() {
        println!("  none found");
    }
    for active in &doc.active {
        println!("  - {} ({})", active.name, active.strength);
    }

    println!();
    println!("{}", "Inactive ingredients / excipients".cyan().bold());
    if doc.inactive.is_empty() {
        println!("  none found");
    }
    for name in &doc.inactive {
        println!("  - {}", name);
    }
    Ok(())
}

pub fn raw_xml(args: &ServiceArgs, set_id: &str) -> CommandResult {
    let client = dailymed(args)?;
    let xml = runtime()?.block_on(client.spl_document(set_id))?;
    println!("{}", xml);
    Ok(())
}

pub fn history(args: &ServiceArgs, set_id: &str) -> CommandResult {
    let client = dailymed(args)?;
    let value = runtime()?.block_on(client.spl_history(set_id))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub fn ndcs(args: &ServiceArgs, set_id: &str) -> CommandResult {
    let client = dailymed(args)?;
    let ndcs = runtime()?.block_on(client.spl_ndcs(set_id))?;

    if ndcs.is_empty() {
        println!("{}", "No NDCs listed.".yellow());
    }
    for ndc in ndcs {
        println!("{}", ndc);
    }
    Ok(())
}

pub fn packaging(args: &ServiceArgs, set_id: &str) -> CommandResult {
    let client = dailymed(args)?;
    let value = runtime()?.block_on(client.spl_packaging(set_id))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

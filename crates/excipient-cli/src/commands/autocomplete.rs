//! Autocomplete command - suggest drug names.

use colored::Colorize;
use excipient::autocomplete::{DrugNameSource, MIN_QUERY_LEN, RxTermsClient};

use super::{CommandResult, runtime, service_config};
use crate::cli::ServiceArgs;

pub fn run(args: &ServiceArgs, query: String, limit: usize) -> CommandResult {
    if query.trim().chars().count() < MIN_QUERY_LEN {
        return Err(format!("Query must be at least {} characters", MIN_QUERY_LEN).into());
    }

    let client = RxTermsClient::with_config(&service_config(args)?)?;
    let suggestions = runtime()?.block_on(client.suggest(&query, limit))?;

    if suggestions.is_empty() {
        println!("{}", "No suggestions found.".yellow());
        return Ok(());
    }

    for suggestion in suggestions {
        if suggestion.manufacturer.is_empty() {
            println!("{}", suggestion.name);
        } else {
            println!("{}  {}", suggestion.name, suggestion.manufacturer.dimmed());
        }
    }
    Ok(())
}

//! CLI command implementations.

pub mod autocomplete;
pub mod browse;
pub mod categories;
pub mod label;
pub mod search;
pub mod serve;

use std::time::Duration;

use colored::Colorize;
use excipient::ServiceConfig;
use excipient::source::{DailyMedClient, PageMetadata};
use tokio::runtime::Runtime;

use crate::cli::ServiceArgs;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Service configuration from the environment with CLI overrides applied.
pub fn service_config(args: &ServiceArgs) -> Result<ServiceConfig, Box<dyn std::error::Error>> {
    let mut config = ServiceConfig::from_env()?;

    if let Some(url) = &args.dailymed_url {
        config = config.with_dailymed_url(url.clone());
    }
    if let Some(secs) = args.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(n) = args.concurrency {
        config = config.with_fetch_concurrency(n);
    }
    if args.enrich {
        config = config.with_enrichment(true);
    }
    if let Some(mode) = args.match_mode {
        config = config.with_match_mode(mode);
    }

    config.validate()?;
    Ok(config)
}

/// DailyMed client for the configured base URL.
pub fn dailymed(args: &ServiceArgs) -> Result<DailyMedClient, Box<dyn std::error::Error>> {
    Ok(DailyMedClient::with_config(&service_config(args)?)?)
}

pub fn runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

/// Print the command for the next page when the upstream reports more pages.
pub fn print_next_page_hint(metadata: &PageMetadata) {
    let Some(next) = metadata.following_page() else {
        return;
    };

    let args: Vec<String> = std::env::args().collect();
    let command = next_page_command(&args, next);

    println!();
    println!("{}", "-".repeat(20).dimmed());
    println!(
        "More results available (page {} of {}).",
        metadata.current_page.unwrap_or(1),
        metadata.total_pages.unwrap_or(next)
    );
    println!("To get the next page, run:");
    println!("  {}", command.join(" ").cyan());
}

/// `args` with the `--page` value replaced by `next` (or appended).
fn next_page_command(args: &[String], next: u32) -> Vec<String> {
    let mut command: Vec<String> = args.iter().map(|a| shell_quote(a)).collect();

    if let Some(idx) = command.iter().position(|a| a == "--page") {
        if idx + 1 < command.len() {
            command[idx + 1] = next.to_string();
            return command;
        }
        command.truncate(idx);
    } else if let Some(idx) = command.iter().position(|a| a.starts_with("--page=")) {
        command[idx] = format!("--page={}", next);
        return command;
    }

    command.push("--page".to_string());
    command.push(next.to_string());
    command
}

fn shell_quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=./:,@".contains(c))
    {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

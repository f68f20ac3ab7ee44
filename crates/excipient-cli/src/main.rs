//! Excipient CLI - excipient-aware search over DailyMed drug labels.

mod cli;
mod commands;
mod server;
mod web;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "excipient=info,excipient_cli=info";

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("excipient=debug,excipient_cli=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let service = cli.service;
    let result = match cli.command {
        Commands::Serve {
            host,
            port,
            categories,
            open,
        } => commands::serve::run(&service, host, port, categories, open),

        Commands::Search {
            drug_name,
            excipients,
            filters,
            page,
            json,
        } => commands::search::run(&service, drug_name, excipients, filters, page, json),

        Commands::Autocomplete { query, limit } => {
            commands::autocomplete::run(&service, query, limit)
        }

        Commands::Ingredients { set_id, json } => {
            commands::label::ingredients(&service, &set_id, json)
        }
        Commands::Spl { set_id } => commands::label::raw_xml(&service, &set_id),
        Commands::SplHistory { set_id } => commands::label::history(&service, &set_id),
        Commands::SplNdcs { set_id } => commands::label::ndcs(&service, &set_id),
        Commands::SplPackaging { set_id } => commands::label::packaging(&service, &set_id),

        Commands::SearchSpls { query, page, json } => {
            commands::browse::search_spls(&service, query, page, json)
        }
        Commands::List {
            kind,
            filters,
            page,
        } => commands::browse::list(&service, kind, filters, page),

        Commands::Categories { file, json } => commands::categories::run(file, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

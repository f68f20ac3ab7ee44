//! Serve command - run the web front-end.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use excipient::{ExcipientCategories, ExcipientService};
use tracing::warn;

use super::{CommandResult, runtime, service_config};
use crate::cli::ServiceArgs;
use crate::server::{app, state::AppState};

pub fn run(
    args: &ServiceArgs,
    host: String,
    port: u16,
    categories: Option<PathBuf>,
    open_browser: bool,
) -> CommandResult {
    let config = service_config(args)?;
    let categories = load_categories(categories.as_ref());

    let url = format!("http://{}:{}", host, port);
    println!();
    println!(
        "{} {}",
        "Starting excipient server at".cyan().bold(),
        url.white().bold()
    );
    println!();
    println!("  DailyMed:   {}", config.dailymed_url);
    println!("  Match mode: {}", config.match_mode);
    println!("  Categories: {}", categories.len());
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    if open_browser {
        if let Err(e) = open::that(&url) {
            eprintln!("{} Could not open browser: {}", "Warning:".yellow(), e);
        }
    }

    let rt = runtime()?;
    rt.block_on(async {
        let service = ExcipientService::new(config)?;
        let state = AppState::new(Arc::new(service), Arc::new(categories));
        app::run_server(state, &host, port).await
    })?;

    println!("{}", "Server stopped.".yellow());
    Ok(())
}

/// Category table for the selection UI; a missing or unreadable file serves
/// an empty table.
fn load_categories(path: Option<&PathBuf>) -> ExcipientCategories {
    let Some(path) = path else {
        return ExcipientCategories::empty();
    };

    match ExcipientCategories::load(path) {
        Ok(table) => table,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not load excipient categories");
            ExcipientCategories::empty()
        }
    }
}

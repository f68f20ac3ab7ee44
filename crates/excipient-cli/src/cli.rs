//! CLI argument definitions using clap.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use excipient::MatchMode;
use excipient::source::{DateComparison, ListingKind};

/// Excipient: find drug products free of the excipients you need to avoid
#[derive(Parser)]
#[command(name = "excipient")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub service: ServiceArgs,
}

/// Overrides for the service configuration read from `EXCIPIENT_*`.
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// DailyMed API base URL
    #[arg(long, global = true, env = "EXCIPIENT_DAILYMED_URL")]
    pub dailymed_url: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Labels fetched concurrently per search
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Look up NDC and packager for every result (slower)
    #[arg(long, global = true)]
    pub enrich: bool,

    /// How ingredients are matched against excipients (exact, contains)
    #[arg(long, global = true)]
    pub match_mode: Option<MatchMode>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web front-end
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for web server
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Excipient category table (CSV with INGREDIENT_NAME and Category)
        #[arg(long, env = "EXCIPIENT_CATEGORIES")]
        categories: Option<PathBuf>,

        /// Open the front-end in a browser
        #[arg(long)]
        open: bool,
    },

    /// Search for a drug, fetch every label, and classify by excipients
    Search {
        /// Drug name to search for
        #[arg(value_name = "DRUG")]
        drug_name: String,

        /// Comma-separated excipients to check for
        #[arg(short, long)]
        excipients: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        page: PageArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest drug names
    Autocomplete {
        /// Partial drug name (at least 3 characters)
        #[arg(value_name = "QUERY")]
        query: String,

        /// Maximum number of suggestions
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show the ingredients parsed from one label
    Ingredients {
        /// SPL set id
        #[arg(value_name = "SET_ID")]
        set_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the raw SPL XML of a label
    Spl {
        /// SPL set id
        #[arg(value_name = "SET_ID")]
        set_id: String,
    },

    /// Show the version history of a label
    SplHistory {
        /// SPL set id
        #[arg(value_name = "SET_ID")]
        set_id: String,
    },

    /// List the NDCs of a label
    SplNdcs {
        /// SPL set id
        #[arg(value_name = "SET_ID")]
        set_id: String,
    },

    /// Show the packaging of a label
    SplPackaging {
        /// SPL set id
        #[arg(value_name = "SET_ID")]
        set_id: String,
    },

    /// Search SPL documents with the DailyMed filters
    SearchSpls {
        #[command(flatten)]
        query: SplQueryArgs,

        #[command(flatten)]
        page: PageArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse a DailyMed listing (drug-names, ndcs, drug-classes, uniis, rxcuis)
    List {
        /// Listing to browse
        #[arg(value_name = "KIND")]
        kind: ListingKind,

        /// Listing filter as key=value (repeatable)
        #[arg(short, long = "filter", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        filters: Vec<(String, String)>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show an excipient category table
    Categories {
        /// CSV file with INGREDIENT_NAME and Category columns
        #[arg(value_name = "CSV")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Results per page (max 100)
    #[arg(long, default_value = "25")]
    pub pagesize: u32,
}

/// Post-fetch keyword filters.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Route of administration must contain this
    #[arg(long)]
    pub route: Option<String>,

    /// Dosage form must contain one of these (repeatable)
    #[arg(long = "form")]
    pub forms: Vec<String>,

    /// Every keyword must appear in an active ingredient
    #[arg(long, value_delimiter = ',')]
    pub include_active: Vec<String>,

    /// No active ingredient may contain these
    #[arg(long, value_delimiter = ',')]
    pub exclude_active: Vec<String>,

    /// Every keyword must appear in an inactive ingredient
    #[arg(long, value_delimiter = ',')]
    pub include_inactive: Vec<String>,

    /// No inactive ingredient may contain these
    #[arg(long, value_delimiter = ',')]
    pub exclude_inactive: Vec<String>,

    /// Every active ingredient must match one of these
    #[arg(long, value_delimiter = ',')]
    pub only_active: Vec<String>,
}

/// Filters of the SPL search endpoint.
#[derive(Args, Debug, Clone, Default)]
pub struct SplQueryArgs {
    /// Drug name
    #[arg(long)]
    pub drug_name: Option<String>,

    /// Name type: g (generic), b (brand)
    #[arg(long)]
    pub name_type: Option<String>,

    #[arg(long)]
    pub ndc: Option<String>,

    #[arg(long)]
    pub labeler: Option<String>,

    #[arg(long)]
    pub manufacturer: Option<String>,

    #[arg(long)]
    pub application_number: Option<String>,

    #[arg(long)]
    pub marketing_category_code: Option<String>,

    /// Document type code
    #[arg(long)]
    pub doctype: Option<String>,

    #[arg(long)]
    pub dea_schedule_code: Option<String>,

    #[arg(long)]
    pub drug_class_code: Option<String>,

    #[arg(long)]
    pub drug_class_coding_system: Option<String>,

    /// Only labels with (true) or without (false) a boxed warning
    #[arg(long)]
    pub boxed_warning: Option<bool>,

    #[arg(long)]
    pub rxcui: Option<String>,

    #[arg(long)]
    pub setid: Option<String>,

    #[arg(long)]
    pub unii_code: Option<String>,

    /// Published date (YYYY-MM-DD)
    #[arg(long)]
    pub published_date: Option<NaiveDate>,

    /// Comparison for --published-date (lt, lte, gt, gte, eq)
    #[arg(long)]
    pub published_date_comparison: Option<DateComparison>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("labeler=Acme Inc").unwrap(),
            ("labeler".to_string(), "Acme Inc".to_string())
        );
        assert!(parse_key_value("labeler").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_search_args() {
        let cli = Cli::try_parse_from([
            "excipient",
            "search",
            "ibuprofen",
            "--excipients",
            "lactose,aspartame",
            "--route",
            "oral",
            "--exclude-inactive",
            "gelatin,talc",
            "--page",
            "2",
            "--match-mode",
            "contains",
        ])
        .unwrap();

        assert_eq!(cli.service.match_mode, Some(MatchMode::Contains));
        match cli.command {
            Commands::Search {
                drug_name,
                excipients,
                filters,
                page,
                ..
            } => {
                assert_eq!(drug_name, "ibuprofen");
                assert_eq!(excipients.as_deref(), Some("lactose,aspartame"));
                assert_eq!(filters.route.as_deref(), Some("oral"));
                assert_eq!(filters.exclude_inactive, vec!["gelatin", "talc"]);
                assert_eq!(page.page, 2);
                assert_eq!(page.pagesize, 25);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_list_args() {
        let cli = Cli::try_parse_from([
            "excipient",
            "list",
            "drug-classes",
            "-f",
            "class_name=Analgesic",
        ])
        .unwrap();
        match cli.command {
            Commands::List { kind, filters, .. } => {
                assert_eq!(kind, ListingKind::DrugClasses);
                assert_eq!(filters[0].0, "class_name");
            }
            _ => panic!("expected list"),
        }
    }
}

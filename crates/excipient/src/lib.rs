//! Excipient: excipient-aware search over DailyMed drug labels.
//!
//! Search DailyMed for a drug, parse every listed Structured Product Label,
//! and split the products into those free of a user's excipients and those
//! containing at least one of them.
//!
//! # Core Principles
//!
//! - **Pure classification**: [`classify`](classify::classify) never touches
//!   the network and never mutates its input
//! - **Explicit handles**: API clients are constructed once and passed to
//!   whoever needs them
//! - **Partial failure is not failure**: a label that cannot be fetched or
//!   parsed is skipped and reported, never fatal to the search
//!
//! # Example
//!
//! ```no_run
//! use excipient::{ExcipientSelection, ExcipientService, SearchRequest, ServiceConfig};
//!
//! # async fn run() -> excipient::Result<()> {
//! let service = ExcipientService::new(ServiceConfig::from_env()?)?;
//! let report = service
//!     .search(
//!         &SearchRequest::new("ibuprofen"),
//!         &ExcipientSelection::parse_list("lactose, aspartame"),
//!     )
//!     .await?;
//!
//! println!("Free: {}", report.metadata.total_free);
//! println!("With: {}", report.metadata.total_with);
//! # Ok(())
//! # }
//! ```

pub mod autocomplete;
pub mod categories;
pub mod classify;
pub mod config;
pub mod error;
pub mod record;
pub mod search;
pub mod source;
pub mod spl;

mod service;

#[cfg(test)]
mod http_stub;

pub use crate::service::{ExcipientService, SearchEvent, SearchReport, SearchTotals};
pub use autocomplete::{DrugNameSource, DrugSuggestion};
pub use categories::{CategoryEntry, ExcipientCategories};
pub use classify::{Category, Classification, ClassifiedResult, ExcipientSelection, MatchMode};
pub use config::ServiceConfig;
pub use error::{ExcipientError, Result};
pub use record::{ActiveIngredient, DrugRecord};
pub use search::{SearchFilters, SearchRequest, SkippedLabel};
pub use source::{DailyMedClient, LabelSource};
pub use spl::{SplDocument, parse_spl};

//! Label sources: where SPL documents come from.
//!
//! [`LabelSource`] is the seam between the search pipeline and the DailyMed
//! REST API. The production implementation is [`DailyMedClient`];
//! [`MockLabelSource`] serves labels from memory for tests and offline use.
//!
//! # Example
//!
//! ```no_run
//! use excipient::source::{DailyMedClient, LabelSource, SplQuery};
//!
//! # async fn run() -> excipient::Result<()> {
//! let client = DailyMedClient::new()?;
//! let page = client.search_spls(&SplQuery::drug_name("ibuprofen")).await?;
//! for spl in &page.data {
//!     println!("{} {}", spl.setid, spl.title);
//! }
//! # Ok(())
//! # }
//! ```

mod dailymed;
mod mock;
mod provider;

pub use dailymed::{DailyMedClient, ListingKind, extract_ndcs, extract_packager};
pub use mock::{MockLabel, MockLabelSource};
pub use provider::{
    DateComparison, LabelSource, MAX_PAGE_SIZE, PageMetadata, SplQuery, SplSearchPage, SplSummary,
    validate_set_id,
};

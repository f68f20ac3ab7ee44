//! Drug search: query DailyMed, fetch each listed label, filter, and build
//! [`DrugRecord`](crate::DrugRecord)s.

mod fetcher;
mod filters;

pub use fetcher::{
    DEFAULT_PAGE_SIZE, FetchEvent, FetchOutcome, RecordFetcher, SearchRequest, SkippedLabel,
};
pub use filters::SearchFilters;

//! Search-then-fetch pipeline producing drug records.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::MAX_FETCH_CONCURRENCY;
use crate::error::{ExcipientError, Result};
use crate::record::{DrugRecord, NOT_AVAILABLE};
use crate::source::{LabelSource, MAX_PAGE_SIZE, PageMetadata, SplQuery, SplSummary};
use crate::spl::parse_spl;

use super::filters::SearchFilters;

/// Default number of labels requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// A drug search: one page of upstream results plus post-fetch filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub drug_name: String,
    pub page: u32,
    pub pagesize: u32,
    #[serde(default)]
    pub filters: SearchFilters,
}

impl SearchRequest {
    pub fn new(drug_name: impl Into<String>) -> Self {
        Self {
            drug_name: drug_name.into(),
            page: 1,
            pagesize: DEFAULT_PAGE_SIZE,
            filters: SearchFilters::default(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_pagesize(mut self, pagesize: u32) -> Self {
        self.pagesize = pagesize;
        self
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Reject requests that cannot be sent upstream.
    pub fn validate(&self) -> Result<()> {
        if self.drug_name.trim().is_empty() {
            return Err(ExcipientError::InvalidRequest(
                "drug name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The upstream SPL query for this request.
    pub fn to_query(&self) -> SplQuery {
        SplQuery::drug_name(self.drug_name.trim())
            .with_page(self.page.max(1), self.pagesize.clamp(1, MAX_PAGE_SIZE))
    }
}

/// A listed label that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedLabel {
    pub set_id: String,
    pub reason: String,
}

/// Everything one fetch produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Records in upstream listing order.
    pub records: Vec<DrugRecord>,
    /// Pagination of the upstream search.
    pub page: PageMetadata,
    pub skipped: Vec<SkippedLabel>,
    /// Labels parsed successfully but rejected by the filters.
    pub filtered_out: usize,
}

/// Progress of a streamed fetch.
#[derive(Debug)]
pub enum FetchEvent {
    /// The upstream search succeeded; labels follow.
    Started { page: PageMetadata },
    Record(DrugRecord),
    Skipped(SkippedLabel),
    /// Every listed label has been handled.
    Finished { filtered_out: usize },
    /// The upstream search failed; nothing follows.
    Failed(ExcipientError),
}

enum LabelOutcome {
    Record(DrugRecord),
    Filtered,
    Skipped(SkippedLabel),
}

/// Runs a search against a [`LabelSource`] and builds drug records.
///
/// Label documents are fetched with bounded concurrency; output keeps the
/// upstream listing order regardless of completion order.
#[derive(Clone)]
pub struct RecordFetcher {
    source: Arc<dyn LabelSource>,
    concurrency: usize,
    enrich: bool,
}

impl RecordFetcher {
    pub fn new(source: Arc<dyn LabelSource>) -> Self {
        Self {
            source,
            concurrency: 4,
            enrich: false,
        }
    }

    /// Maximum number of labels fetched at once, clamped to
    /// `1..=MAX_FETCH_CONCURRENCY`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_FETCH_CONCURRENCY);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Also fetch NDC and packager for every record.
    pub fn with_enrichment(mut self, enrich: bool) -> Self {
        self.enrich = enrich;
        self
    }

    pub fn source(&self) -> &Arc<dyn LabelSource> {
        &self.source
    }

    /// Fetch every record of the requested page.
    ///
    /// Fails only when the upstream search itself fails; labels that cannot
    /// be fetched or parsed are reported in [`FetchOutcome::skipped`].
    pub async fn fetch(&self, request: &SearchRequest) -> Result<FetchOutcome> {
        let (page, listed) = self.search(request).await?;

        let outcomes: Vec<LabelOutcome> = stream::iter(listed)
            .map(|summary| self.load_label(summary, &request.filters))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut outcome = FetchOutcome {
            page,
            ..FetchOutcome::default()
        };
        for label in outcomes {
            match label {
                LabelOutcome::Record(record) => outcome.records.push(record),
                LabelOutcome::Filtered => outcome.filtered_out += 1,
                LabelOutcome::Skipped(skipped) => outcome.skipped.push(skipped),
            }
        }

        info!(
            drug = %request.drug_name,
            records = outcome.records.len(),
            skipped = outcome.skipped.len(),
            filtered_out = outcome.filtered_out,
            "Fetch complete"
        );
        Ok(outcome)
    }

    /// Fetch the requested page, sending events as records become available.
    ///
    /// The work runs on a spawned task. Dropping the receiver stops it before
    /// the next label is handed over.
    pub fn stream(&self, request: SearchRequest) -> mpsc::Receiver<FetchEvent> {
        let (tx, rx) = mpsc::channel(self.concurrency.saturating_mul(2));
        let fetcher = self.clone();

        tokio::spawn(async move {
            let (page, listed) = match fetcher.search(&request).await {
                Ok(found) => found,
                Err(err) => {
                    let _ = tx.send(FetchEvent::Failed(err)).await;
                    return;
                }
            };

            if tx.send(FetchEvent::Started { page }).await.is_err() {
                return;
            }

            let mut labels = stream::iter(listed)
                .map(|summary| fetcher.load_label(summary, &request.filters))
                .buffered(fetcher.concurrency);

            let mut filtered_out = 0;
            while let Some(label) = labels.next().await {
                let event = match label {
                    LabelOutcome::Record(record) => FetchEvent::Record(record),
                    LabelOutcome::Skipped(skipped) => FetchEvent::Skipped(skipped),
                    LabelOutcome::Filtered => {
                        filtered_out += 1;
                        continue;
                    }
                };
                if tx.send(event).await.is_err() {
                    debug!(drug = %request.drug_name, "Receiver dropped, stopping fetch");
                    return;
                }
            }

            let _ = tx.send(FetchEvent::Finished { filtered_out }).await;
        });

        rx
    }

    async fn search(&self, request: &SearchRequest) -> Result<(PageMetadata, Vec<SplSummary>)> {
        request.validate()?;

        let query = request.to_query();
        debug!(source = self.source.name(), ?query, "Searching labels");

        let page = self.source.search_spls(&query).await.map_err(|err| {
            warn!(drug = %request.drug_name, error = %err, "Label search failed");
            err
        })?;

        let listed: Vec<SplSummary> = page
            .data
            .into_iter()
            .filter(|s| !s.setid.trim().is_empty())
            .collect();
        Ok((page.metadata, listed))
    }

    async fn load_label(&self, summary: SplSummary, filters: &SearchFilters) -> LabelOutcome {
        let set_id = summary.setid.trim().to_string();

        let parsed = match self.source.spl_document(&set_id).await {
            Ok(xml) => parse_spl(&xml),
            Err(err) => Err(err),
        };

        let doc = match parsed {
            Ok(doc) => doc,
            Err(err) => {
                warn!(%set_id, error = %err, "Skipping label");
                return LabelOutcome::Skipped(SkippedLabel {
                    set_id,
                    reason: err.to_string(),
                });
            }
        };

        if !filters.matches(&doc) {
            debug!(%set_id, "Label rejected by filters");
            return LabelOutcome::Filtered;
        }

        let mut record = DrugRecord::from_spl(&set_id, &doc);
        if self.enrich {
            self.enrich_record(&mut record).await;
        }
        LabelOutcome::Record(record)
    }

    async fn enrich_record(&self, record: &mut DrugRecord) {
        let set_id = record.set_id.clone();
        let (ndcs, packager) = futures::join!(
            self.source.spl_ndcs(&set_id),
            self.source.spl_packager(&set_id)
        );

        record.ndc = match ndcs {
            Ok(ndcs) => ndcs.into_iter().next(),
            Err(err) => {
                debug!(%set_id, error = %err, "NDC lookup failed");
                None
            }
        }
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        record.packager = match packager {
            Ok(packager) => packager,
            Err(err) => {
                debug!(%set_id, error = %err, "Packager lookup failed");
                None
            }
        }
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    }
}

//! The search service: autocomplete, classified search and streaming search
//! behind one handle.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::autocomplete::{DrugNameSource, DrugSuggestion, RxTermsClient};
use crate::classify::{Category, ClassifiedResult, Classifier, ExcipientSelection};
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::search::{FetchEvent, RecordFetcher, SearchRequest, SkippedLabel};
use crate::source::{DailyMedClient, LabelSource, PageMetadata};

/// Running counts of classified results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchTotals {
    pub total_free: usize,
    pub total_with: usize,
    pub total: usize,
}

impl SearchTotals {
    fn record(&mut self, category: Category) {
        match category {
            Category::Free => self.total_free += 1,
            Category::With => self.total_with += 1,
        }
        self.total += 1;
    }
}

/// Result of a complete (non-streaming) search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub results_free: Vec<ClassifiedResult>,
    pub results_with: Vec<ClassifiedResult>,
    pub metadata: SearchTotals,
    /// Upstream pagination of the drug search.
    pub page: PageMetadata,
    pub excipients_highlighted: Vec<String>,
    pub skipped: Vec<SkippedLabel>,
}

/// One event of a streamed search, serialized as one NDJSON line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchEvent {
    /// Always first.
    Init { excipients_highlighted: Vec<String> },
    /// One classified record, with totals so far.
    Result {
        category: Category,
        result: Box<ClassifiedResult>,
        metadata: SearchTotals,
    },
    /// Every record has been sent.
    Complete {
        metadata: SearchTotals,
        page: PageMetadata,
        skipped: Vec<SkippedLabel>,
    },
    /// The search failed; nothing follows.
    Error { error: String },
}

/// Search service shared by every request handler.
#[derive(Clone)]
pub struct ExcipientService {
    config: ServiceConfig,
    fetcher: RecordFetcher,
    names: Arc<dyn DrugNameSource>,
}

impl ExcipientService {
    /// Create a service talking to DailyMed and RxTerms.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        let labels: Arc<dyn LabelSource> = Arc::new(DailyMedClient::with_config(&config)?);
        let names: Arc<dyn DrugNameSource> = Arc::new(RxTermsClient::with_config(&config)?);
        Ok(Self::with_sources(config, labels, names))
    }

    /// Create a service over explicit sources.
    pub fn with_sources(
        config: ServiceConfig,
        labels: Arc<dyn LabelSource>,
        names: Arc<dyn DrugNameSource>,
    ) -> Self {
        let fetcher = RecordFetcher::new(labels)
            .with_concurrency(config.fetch_concurrency)
            .with_enrichment(config.enrich_records);

        Self {
            config,
            fetcher,
            names,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Classifier for a selection using the configured match mode.
    pub fn classifier(&self, selection: ExcipientSelection) -> Classifier {
        Classifier::new(selection).with_mode(self.config.match_mode)
    }

    /// Drug name suggestions. Failures are logged and yield no suggestions.
    pub async fn autocomplete(&self, query: &str, limit: Option<usize>) -> Vec<DrugSuggestion> {
        let limit = limit.unwrap_or(self.config.autocomplete_limit);
        match self.names.suggest(query, limit).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                warn!(source = self.names.name(), query, error = %err, "Autocomplete failed");
                Vec::new()
            }
        }
    }

    /// Search, fetch and classify one page of results.
    pub async fn search(
        &self,
        request: &SearchRequest,
        selection: &ExcipientSelection,
    ) -> Result<SearchReport> {
        let outcome = self.fetcher.fetch(request).await?;
        let classification = self.classifier(selection.clone()).classify(outcome.records);

        let metadata = SearchTotals {
            total_free: classification.free.len(),
            total_with: classification.containing.len(),
            total: classification.total(),
        };
        info!(
            drug = %request.drug_name,
            free = metadata.total_free,
            with = metadata.total_with,
            "Search classified"
        );

        Ok(SearchReport {
            results_free: classification.free,
            results_with: classification.containing,
            metadata,
            page: outcome.page,
            excipients_highlighted: selection.to_vec(),
            skipped: outcome.skipped,
        })
    }

    /// Search and classify, sending each result as soon as it is ready.
    ///
    /// Dropping the receiver cancels the remaining work.
    pub fn search_stream(
        &self,
        request: SearchRequest,
        selection: ExcipientSelection,
    ) -> mpsc::Receiver<SearchEvent> {
        let (tx, rx) = mpsc::channel(self.fetcher.concurrency().saturating_mul(2));
        let classifier = self.classifier(selection);
        let mut fetched = self.fetcher.stream(request);

        tokio::spawn(async move {
            let init = SearchEvent::Init {
                excipients_highlighted: classifier.selection().to_vec(),
            };
            if tx.send(init).await.is_err() {
                return;
            }

            let mut totals = SearchTotals::default();
            let mut page = PageMetadata::default();
            let mut skipped = Vec::new();

            while let Some(event) = fetched.recv().await {
                let outgoing = match event {
                    FetchEvent::Started { page: p } => {
                        page = p;
                        continue;
                    }
                    FetchEvent::Skipped(label) => {
                        skipped.push(label);
                        continue;
                    }
                    FetchEvent::Record(record) => {
                        let result = classifier.classify_one(record);
                        let category = result.category();
                        totals.record(category);
                        SearchEvent::Result {
                            category,
                            result: Box::new(result),
                            metadata: totals,
                        }
                    }
                    FetchEvent::Finished { .. } => SearchEvent::Complete {
                        metadata: totals,
                        page: std::mem::take(&mut page),
                        skipped: std::mem::take(&mut skipped),
                    },
                    FetchEvent::Failed(err) => SearchEvent::Error {
                        error: err.to_string(),
                    },
                };

                if tx.send(outgoing).await.is_err() {
                    return;
                }
            }
        });

        rx
    }
}

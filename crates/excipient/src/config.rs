//! Service configuration.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::classify::MatchMode;
use crate::error::{ExcipientError, Result};

/// DailyMed REST API (v2) base URL.
pub const DEFAULT_DAILYMED_URL: &str = "https://dailymed.nlm.nih.gov/dailymed/services/v2";

/// RxTerms autocomplete endpoint.
pub const DEFAULT_RXTERMS_URL: &str = "https://clinicaltables.nlm.nih.gov/api/rxterms/v3/search";

/// Upper bound on concurrent label fetches per search.
pub const MAX_FETCH_CONCURRENCY: usize = 64;

/// Configuration for the search service and its upstream clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL of the DailyMed API.
    pub dailymed_url: String,
    /// RxTerms search endpoint used for autocomplete.
    pub rxterms_url: String,
    /// Timeout for each upstream HTTP request.
    pub request_timeout: Duration,
    /// Page size used when a request does not give one.
    pub default_pagesize: u32,
    /// Number of SPL documents fetched concurrently per search.
    pub fetch_concurrency: usize,
    /// Whether to fetch NDC and packager for every record.
    pub enrich_records: bool,
    /// Matching rule used by the classifier.
    pub match_mode: MatchMode,
    /// Suggestions returned when a request does not give a limit.
    pub autocomplete_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            dailymed_url: DEFAULT_DAILYMED_URL.to_string(),
            rxterms_url: DEFAULT_RXTERMS_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            default_pagesize: 25,
            fetch_concurrency: 4,
            enrich_records: false,
            match_mode: MatchMode::Exact,
            autocomplete_limit: 20,
        }
    }
}

impl ServiceConfig {
    /// Defaults overlaid with `EXCIPIENT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    ///
    /// Recognised keys: `EXCIPIENT_DAILYMED_URL`, `EXCIPIENT_RXTERMS_URL`,
    /// `EXCIPIENT_TIMEOUT_SECS`, `EXCIPIENT_PAGESIZE`,
    /// `EXCIPIENT_FETCH_CONCURRENCY`, `EXCIPIENT_ENRICH`,
    /// `EXCIPIENT_MATCH_MODE`, `EXCIPIENT_AUTOCOMPLETE_LIMIT`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("EXCIPIENT_DAILYMED_URL") {
            config.dailymed_url = url;
        }
        if let Some(url) = lookup("EXCIPIENT_RXTERMS_URL") {
            config.rxterms_url = url;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "EXCIPIENT_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = parse_var(&lookup, "EXCIPIENT_PAGESIZE")? {
            config.default_pagesize = size;
        }
        if let Some(n) = parse_var(&lookup, "EXCIPIENT_FETCH_CONCURRENCY")? {
            config.fetch_concurrency = n;
        }
        if let Some(enrich) = parse_var(&lookup, "EXCIPIENT_ENRICH")? {
            config.enrich_records = enrich;
        }
        if let Some(mode) = parse_var(&lookup, "EXCIPIENT_MATCH_MODE")? {
            config.match_mode = mode;
        }
        if let Some(limit) = parse_var(&lookup, "EXCIPIENT_AUTOCOMPLETE_LIMIT")? {
            config.autocomplete_limit = limit;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.fetch_concurrency == 0 {
            return Err(ExcipientError::Config(
                "fetch concurrency must be at least 1".to_string(),
            ));
        }
        if self.fetch_concurrency > MAX_FETCH_CONCURRENCY {
            return Err(ExcipientError::Config(format!(
                "fetch concurrency must be at most {}, got {}",
                MAX_FETCH_CONCURRENCY, self.fetch_concurrency
            )));
        }
        if self.default_pagesize == 0 {
            return Err(ExcipientError::Config(
                "default page size must be at least 1".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ExcipientError::Config(
                "request timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_dailymed_url(mut self, url: impl Into<String>) -> Self {
        self.dailymed_url = url.into();
        self
    }

    pub fn with_rxterms_url(mut self, url: impl Into<String>) -> Self {
        self.rxterms_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_fetch_concurrency(mut self, n: usize) -> Self {
        self.fetch_concurrency = n;
        self
    }

    pub fn with_enrichment(mut self, enrich: bool) -> Self {
        self.enrich_records = enrich;
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => {
            debug!("{key} set to {raw}");
            raw.trim()
                .parse()
                .map(Some)
                .map_err(|e| ExcipientError::Config(format!("Invalid {}: {}", key, e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.match_mode, MatchMode::Exact);
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("EXCIPIENT_DAILYMED_URL", "http://localhost:9000/v2"),
            ("EXCIPIENT_TIMEOUT_SECS", "30"),
            ("EXCIPIENT_FETCH_CONCURRENCY", " 8 "),
            ("EXCIPIENT_ENRICH", "true"),
            ("EXCIPIENT_MATCH_MODE", "contains"),
        ]))
        .unwrap();

        assert_eq!(config.dailymed_url, "http://localhost:9000/v2");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.fetch_concurrency, 8);
        assert!(config.enrich_records);
        assert_eq!(config.match_mode, MatchMode::Contains);
    }

    #[test]
    fn test_invalid_values() {
        let err = ServiceConfig::from_lookup(lookup(&[("EXCIPIENT_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("EXCIPIENT_TIMEOUT_SECS"));

        assert!(
            ServiceConfig::from_lookup(lookup(&[("EXCIPIENT_FETCH_CONCURRENCY", "0")])).is_err()
        );
    }

    #[test]
    fn test_fetch_concurrency_upper_bound() {
        let huge = (usize::MAX / 2).to_string();
        let err = ServiceConfig::from_lookup(lookup(&[("EXCIPIENT_FETCH_CONCURRENCY", huge.as_str())]))
            .unwrap_err();
        assert!(matches!(err, ExcipientError::Config(_)));
        assert!(err.to_string().contains("at most 64"));

        let at_limit = ServiceConfig::default().with_fetch_concurrency(MAX_FETCH_CONCURRENCY);
        assert!(at_limit.validate().is_ok());
        let over = ServiceConfig::default().with_fetch_concurrency(MAX_FETCH_CONCURRENCY + 1);
        assert!(over.validate().is_err());
    }
}

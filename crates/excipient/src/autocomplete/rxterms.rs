//! RxTerms (NLM Clinical Table Search Service) client.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::{ExcipientError, Result, truncate_body};

use super::{DrugNameSource, DrugSuggestion, MAX_LIST, MIN_QUERY_LEN};

const SERVICE_NAME: &str = "RxTerms";

/// Drug name suggestions from the RxTerms autocomplete API.
#[derive(Debug, Clone)]
pub struct RxTermsClient {
    http: Client,
    url: String,
}

impl RxTermsClient {
    pub fn new() -> Result<Self> {
        Self::with_config(&ServiceConfig::default())
    }

    pub fn with_config(config: &ServiceConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("excipient/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExcipientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: config.rxterms_url.clone(),
        })
    }
}

#[async_trait]
impl DrugNameSource for RxTermsClient {
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<DrugSuggestion>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN || limit == 0 {
            return Ok(Vec::new());
        }

        let max_list = limit.min(MAX_LIST).to_string();
        let response = self
            .http
            .get(&self.url)
            .query(&[("terms", query), ("maxList", max_list.as_str()), ("df", "DISPLAY_NAME")])
            .send()
            .await
            .map_err(|source| ExcipientError::Http {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ExcipientError::Http {
            url: self.url.clone(),
            source,
        })?;

        if !status.is_success() {
            warn!(url = %self.url, status = status.as_u16(), "RxTerms returned an error status");
            return Err(ExcipientError::Upstream {
                url: self.url.clone(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| ExcipientError::UnexpectedResponse {
                service: SERVICE_NAME.to_string(),
                message: format!("invalid JSON: {} ({})", e, truncate_body(&body)),
            })?;

        let suggestions = parse_rxterms_response(&value, limit)?;
        debug!(query, found = suggestions.len(), "RxTerms autocomplete");
        Ok(suggestions)
    }

    fn name(&self) -> &str {
        SERVICE_NAME
    }
}

/// Turn an RxTerms response into unique suggestions.
///
/// The response is `[total, codes, extra, display_strings, ...]`, where each
/// display entry is either a string or a one-element array of strings.
/// Suggestions are unique by lowercase drug name without the route.
pub fn parse_rxterms_response(value: &Value, limit: usize) -> Result<Vec<DrugSuggestion>> {
    let items = value
        .as_array()
        .filter(|items| items.len() >= 4)
        .ok_or_else(|| {
            warn!("Unexpected RxTerms response shape");
            ExcipientError::UnexpectedResponse {
                service: SERVICE_NAME.to_string(),
                message: "expected an array of at least four elements".to_string(),
            }
        })?;

    let Some(display_strings) = items[3].as_array().filter(|_| limit > 0) else {
        return Ok(Vec::new());
    };

    let mut seen = HashSet::new();
    let mut suggestions = Vec::new();

    for entry in display_strings {
        let full_name = match entry {
            Value::String(s) => s.as_str(),
            Value::Array(parts) => match parts.first() {
                Some(Value::String(s)) => s.as_str(),
                _ => continue,
            },
            _ => continue,
        };

        let full_name = full_name.trim();
        if full_name.is_empty() {
            continue;
        }

        let (name, route) = split_route(full_name);
        if seen.insert(name.to_lowercase()) {
            suggestions.push(DrugSuggestion {
                name: full_name.to_string(),
                manufacturer: route.to_string(),
            });
            if suggestions.len() >= limit {
                break;
            }
        }
    }

    Ok(suggestions)
}

/// Split `"NAME (Route)"` into `("NAME", "Route")`.
///
/// Uses the last parenthesised group; names without one get an empty route.
pub fn split_route(display: &str) -> (&str, &str) {
    let display = display.trim();
    match (display.rfind('('), display.rfind(')')) {
        (Some(open), Some(close)) if open < close => {
            (display[..open].trim(), display[open + 1..close].trim())
        }
        _ => (display, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_route() {
        assert_eq!(
            split_route("Ibuprofen (Oral Pill)"),
            ("Ibuprofen", "Oral Pill")
        );
        assert_eq!(split_route("Ibuprofen"), ("Ibuprofen", ""));
        assert_eq!(split_route("odd ) name ("), ("odd ) name (", ""));
    }

    #[test]
    fn test_parse_dedupes_by_name_without_route() {
        let value = json!([
            4,
            ["1", "2", "3", "4"],
            null,
            [
                ["Ibuprofen (Oral Pill)"],
                ["IBUPROFEN (Oral Liquid)"],
                "Ibuprofen/Famotidine (Oral Pill)",
                [""]
            ]
        ]);

        let suggestions = parse_rxterms_response(&value, 20).unwrap();
        assert_eq!(
            suggestions,
            vec![
                DrugSuggestion::new("Ibuprofen (Oral Pill)", "Oral Pill"),
                DrugSuggestion::new("Ibuprofen/Famotidine (Oral Pill)", "Oral Pill"),
            ]
        );
    }

    #[test]
    fn test_parse_respects_limit() {
        let value = json!([3, [], null, [["A (Oral)"], ["B (Oral)"], ["C (Oral)"]]]);
        assert_eq!(parse_rxterms_response(&value, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_rejects_bad_shape() {
        assert!(parse_rxterms_response(&json!({"error": "x"}), 5).is_err());
        assert!(parse_rxterms_response(&json!([0, []]), 5).is_err());
        assert!(parse_rxterms_response(&json!([0, [], null, null]), 5).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_short_query_skips_request() {
        let config = ServiceConfig::default().with_rxterms_url("http://127.0.0.1:9/unreachable");
        let client = RxTermsClient::with_config(&config).unwrap();
        assert!(client.suggest(" ib ", 10).await.unwrap().is_empty());
    }

    async fn client_for(status: &'static str, body: &str) -> RxTermsClient {
        let url = crate::http_stub::serve(status, body).await;
        RxTermsClient::with_config(&ServiceConfig::default().with_rxterms_url(url)).unwrap()
    }

    #[tokio::test]
    async fn test_suggest_from_server() {
        let client = client_for(
            "200 OK",
            r#"[2, ["A", "B"], null, [["Advil (Oral Pill)"], ["Advil (Oral Liquid)"]]]"#,
        )
        .await;

        let suggestions = client.suggest("advil", 10).await.unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].name, "Advil (Oral Pill)");
    }

    #[tokio::test]
    async fn test_invalid_json_is_unexpected_response() {
        let client = client_for("200 OK", "<html>busy</html>").await;
        let err = client.suggest("advil", 10).await.unwrap_err();

        assert!(err.is_upstream());
        assert!(matches!(
            err,
            ExcipientError::UnexpectedResponse { ref service, ref message }
                if service == "RxTerms" && message.contains("busy")
        ));
    }

    #[tokio::test]
    async fn test_error_status_body_is_truncated() {
        let body = "e".repeat(400);
        let client = client_for("500 Internal Server Error", &body).await;
        let err = client.suggest("advil", 10).await.unwrap_err();

        match err {
            ExcipientError::Upstream { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, format!("{}...", "e".repeat(200)));
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }
}

//! Drug search handlers: NDJSON stream and complete JSON report.

use std::convert::Infallible;

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Query, State},
    http::{
        HeaderName,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use excipient::{ExcipientSelection, SearchEvent, SearchFilters, SearchReport, SearchRequest};
use serde::Deserialize;
use tokio_stream::{StreamExt, wrappers::ReceiverStream};
use tracing::{error, info};

use crate::server::error::ApiError;
use crate::server::state::AppState;

const NDJSON: &str = "application/x-ndjson";

/// Query parameters shared by both search endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub drug: String,
    /// Comma-separated excipient names.
    #[serde(default)]
    pub excipients: String,
    /// Page number; empty means the first page.
    pub page: Option<String>,
    /// Results per page; empty means the configured default.
    pub pagesize: Option<String>,
    pub route: Option<String>,
    /// Comma-separated dosage form keywords.
    pub form: Option<String>,
}

impl SearchParams {
    fn into_request(self, default_pagesize: u32) -> Result<(SearchRequest, ExcipientSelection), ApiError> {
        let drug = self.drug.trim();
        if drug.is_empty() {
            return Err(ApiError::BadRequest("Drug name is required".to_string()));
        }

        let mut filters = SearchFilters::new();
        if let Some(route) = self.route.filter(|r| !r.trim().is_empty()) {
            filters = filters.with_route(route);
        }
        if let Some(form) = self.form {
            filters = filters.with_forms(
                form.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string),
            );
        }

        let page = parse_number("page", self.page.as_deref())?.unwrap_or(1);
        let pagesize =
            parse_number("pagesize", self.pagesize.as_deref())?.unwrap_or(default_pagesize);

        let request = SearchRequest::new(drug)
            .with_page(page)
            .with_pagesize(pagesize)
            .with_filters(filters);
        let selection = ExcipientSelection::parse_list(&self.excipients);

        Ok((request, selection))
    }
}

/// Parse an optional numeric query parameter. Blank values count as absent.
fn parse_number(name: &str, raw: Option<&str>) -> Result<Option<u32>, ApiError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Invalid {}: {}", name, value))),
    }
}

/// Stream classified results as NDJSON, one event per line.
pub async fn search_stream(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let (request, selection) = params.into_request(state.service.config().default_pagesize)?;
    info!(
        drug = %request.drug_name,
        page = request.page,
        excipients = selection.len(),
        "Streaming search"
    );

    let events = state.service.search_stream(request, selection);
    let body = ReceiverStream::new(events).map(|event| Ok::<_, Infallible>(ndjson_line(&event)));

    Ok((
        [
            (CONTENT_TYPE, NDJSON),
            (CACHE_CONTROL, "no-cache"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Body::from_stream(body),
    )
        .into_response())
}

/// Run the whole search and answer with one JSON report.
pub async fn search_results(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchReport>, ApiError> {
    let (request, selection) = params.into_request(state.service.config().default_pagesize)?;
    let report = state.service.search(&request, &selection).await?;
    Ok(Json(report))
}

fn ndjson_line(event: &SearchEvent) -> Bytes {
    let mut line = match serde_json::to_vec(event) {
        Ok(line) => line,
        Err(e) => {
            error!(error = %e, "Failed to serialize search event");
            serde_json::json!({"type": "error", "error": e.to_string()})
                .to_string()
                .into_bytes()
        }
    };
    line.push(b'\n');
    Bytes::from(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_into_request() {
        let params = SearchParams {
            drug: " advil ".to_string(),
            excipients: "Lactose, ,aspartame".to_string(),
            page: Some(" 2 ".to_string()),
            pagesize: Some(String::new()),
            route: Some("oral".to_string()),
            form: Some("tablet, capsule".to_string()),
        };

        let (request, selection) = params.into_request(25).unwrap();
        assert_eq!(request.drug_name, "advil");
        assert_eq!(request.page, 2);
        assert_eq!(request.pagesize, 25);
        assert_eq!(request.filters.forms, vec!["tablet", "capsule"]);
        assert_eq!(selection.to_vec(), vec!["Lactose", "aspartame"]);
    }

    #[test]
    fn test_missing_drug_is_bad_request() {
        let params = SearchParams {
            drug: "   ".to_string(),
            ..SearchParams::default()
        };
        assert!(matches!(
            params.into_request(25),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_malformed_numbers_are_bad_requests() {
        for (page, pagesize) in [(Some("abc"), None), (None, Some("-1")), (Some("1.5"), Some("10"))] {
            let params = SearchParams {
                drug: "advil".to_string(),
                page: page.map(str::to_string),
                pagesize: pagesize.map(str::to_string),
                ..SearchParams::default()
            };
            assert!(matches!(
                params.into_request(25),
                Err(ApiError::BadRequest(_))
            ));
        }

        let err = parse_number("page", Some("abc")).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(m) if m == "Invalid page: abc"));
        assert_eq!(parse_number("page", Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_ndjson_line() {
        let line = ndjson_line(&SearchEvent::Error {
            error: "boom".to_string(),
        });
        assert_eq!(&line[..], b"{\"type\":\"error\",\"error\":\"boom\"}\n");
    }
}

//! API error types and handling.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use excipient::ExcipientError;
use serde::Serialize;
use tracing::warn;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from client.
    BadRequest(String),
    /// DailyMed or RxTerms could not be used.
    Upstream(String),
    /// Error from the excipient library.
    Excipient(ExcipientError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Upstream(msg) => {
                warn!(%msg, "Upstream service unavailable");
                (StatusCode::BAD_GATEWAY, "upstream_unavailable", msg)
            }
            ApiError::Excipient(e) => match e {
                ExcipientError::InvalidRequest(msg) => {
                    (StatusCode::BAD_REQUEST, "bad_request", msg)
                }
                ExcipientError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
                e => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    e.to_string(),
                ),
            },
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<ExcipientError> for ApiError {
    fn from(err: ExcipientError) -> Self {
        if err.is_upstream() {
            ApiError::Upstream(format!("Search service unavailable: {}", err))
        } else {
            ApiError::Excipient(err)
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            ApiError::Excipient(e) => write!(f, "Excipient error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let upstream: ApiError = ExcipientError::Upstream {
            url: "http://x".to_string(),
            status: 503,
            body: String::new(),
        }
        .into();
        assert_eq!(upstream.into_response().status(), StatusCode::BAD_GATEWAY);

        let invalid: ApiError = ExcipientError::InvalidRequest("drug".to_string()).into();
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        let config: ApiError = ExcipientError::Config("x".to_string()).into();
        assert_eq!(
            config.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

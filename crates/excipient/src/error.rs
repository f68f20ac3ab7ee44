//! Error types for the excipient library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for excipient operations.
#[derive(Debug, Error)]
pub enum ExcipientError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP request could not be sent or its body could not be read.
    #[error("Request to '{url}' failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream API answered with a non-success status.
    #[error("Upstream error ({status}) from '{url}': {body}")]
    Upstream { url: String, status: u16, body: String },

    /// The upstream API answered with a body we could not interpret.
    #[error("Unexpected response from {service}: {message}")]
    UnexpectedResponse { service: String, message: String },

    /// XML tokenizer error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Well-formed XML that is not a usable SPL document.
    #[error("Malformed SPL document: {0}")]
    MalformedSpl(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller supplied an unusable request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Maximum number of response body characters kept in error messages.
pub(crate) const ERROR_BODY_LIMIT: usize = 200;

/// Cut an upstream response body down to `ERROR_BODY_LIMIT` characters.
pub(crate) fn truncate_body(text: &str) -> String {
    match text.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

impl ExcipientError {
    /// Whether this error means the upstream service could not be used.
    ///
    /// Presentation layers report these as "search service unavailable"
    /// rather than as a problem with the user's request.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ExcipientError::Http { .. }
                | ExcipientError::Upstream { .. }
                | ExcipientError::UnexpectedResponse { .. }
        )
    }
}

impl From<quick_xml::events::attributes::AttrError> for ExcipientError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ExcipientError::Xml(quick_xml::Error::from(err))
    }
}

/// Result type alias for excipient operations.
pub type Result<T> = std::result::Result<T, ExcipientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short"), "short");

        let long = "é".repeat(ERROR_BODY_LIMIT + 50);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), ERROR_BODY_LIMIT + 3);
    }
}

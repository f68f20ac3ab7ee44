//! Drug name autocomplete handler.

use axum::{
    Json,
    extract::{Query, State},
};
use excipient::DrugSuggestion;
use serde::Deserialize;

use crate::server::state::AppState;

/// Query parameters of the autocomplete endpoint.
#[derive(Debug, Deserialize)]
pub struct AutocompleteParams {
    /// Partial drug name.
    #[serde(default)]
    pub q: String,
    /// Maximum number of suggestions; unparsable values fall back to the
    /// configured default.
    pub limit: Option<String>,
}

/// Suggest drug names. Always answers with a JSON array, empty on failure.
pub async fn drug_autocomplete(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> Json<Vec<DrugSuggestion>> {
    let limit = params
        .limit
        .as_deref()
        .and_then(|l| l.trim().parse::<usize>().ok());

    Json(state.service.autocomplete(params.q.trim(), limit).await)
}

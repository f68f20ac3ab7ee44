//! Excipient category handler.

use axum::{Json, extract::State};
use excipient::CategoryEntry;

use crate::server::state::AppState;

/// Categories with their ingredients, in display order.
pub async fn excipient_categories(State(state): State<AppState>) -> Json<Vec<CategoryEntry>> {
    Json(state.categories.ordered())
}

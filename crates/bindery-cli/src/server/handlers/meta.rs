//! Filter options and statistics handlers.

use axum::{extract::State, Json};

use crate::server::query::{self, CollectionStats, FilterOptions};
use crate::server::state::AppState;

/// GET /api/filters
pub async fn get_filter_options(State(state): State<AppState>) -> Json<FilterOptions> {
    let library = state.library.read().await;
    Json(query::filter_options(&library))
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<CollectionStats> {
    let library = state.library.read().await;
    Json(query::collection_stats(&library))
}

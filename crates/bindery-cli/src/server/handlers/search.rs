//! Search handler.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::server::query::{self, SearchHit, SEARCH_DEFAULT_LIMIT, SEARCH_MAX_LIMIT};
use crate::server::state::AppState;

/// Query parameters for `GET /api/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Search text. Blank or missing yields no results.
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

/// Response for a search request.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub results: Vec<SearchHit>,
}

/// GET /api/search
pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let limit = params
        .limit
        .unwrap_or(SEARCH_DEFAULT_LIMIT)
        .min(SEARCH_MAX_LIMIT);

    let library = state.library.read().await;
    let results = query::search_records(&library, &params.q, limit);

    Json(SearchResponse {
        query: params.q,
        count: results.len(),
        results,
    })
}

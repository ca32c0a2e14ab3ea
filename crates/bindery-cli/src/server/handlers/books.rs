//! Book listing and lookup handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use bindery::Record;

use crate::server::error::ApiError;
use crate::server::query::{self, BookFilter, SortField, SortOrder, DEFAULT_LIMIT, MAX_LIMIT};
use crate::server::state::AppState;

/// Query parameters for `GET /api/books`.
#[derive(Debug, Default, Deserialize)]
pub struct BooksQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub read_status: Option<String>,
    pub genre: Option<String>,
    pub tag: Option<String>,
    pub has_rating: Option<bool>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// Response for the book listing.
#[derive(Debug, Serialize)]
pub struct BooksResponse {
    pub books: Vec<Record>,
    /// Matching records before pagination.
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// GET /api/books
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<BooksQuery>,
) -> Result<Json<BooksResponse>, ApiError> {
    let sort: SortField = match params.sort.as_deref() {
        Some(raw) => raw.parse().map_err(ApiError::BadRequest)?,
        None => SortField::default(),
    };
    let order: SortOrder = match params.order.as_deref() {
        Some(raw) => raw.parse().map_err(ApiError::BadRequest)?,
        None => SortOrder::default(),
    };

    let filter = BookFilter {
        read_status: params.read_status,
        genre: params.genre,
        tag: params.tag,
        has_rating: params.has_rating,
    };
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let offset = params.offset.unwrap_or(0);

    let library = state.library.read().await;
    let mut selected = query::filter_records(&library, &filter);
    query::sort_records(&mut selected, sort, order);

    let total = selected.len();
    let books: Vec<Record> = selected
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    Ok(Json(BooksResponse {
        books,
        total,
        limit,
        offset,
    }))
}

/// GET /api/books/:work_id
pub async fn get_book(
    State(state): State<AppState>,
    Path(work_id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let library = state.library.read().await;
    library
        .iter()
        .find(|record| record.work_id.as_deref() == Some(work_id.as_str()))
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Book with work_id '{}' not found", work_id)))
}

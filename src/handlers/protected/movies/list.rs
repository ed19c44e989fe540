// handlers/protected/movies/list.rs - GET /api/movies handler

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension,
};
use serde::Serialize;

use crate::app::AppState;
use crate::database::models::Movie;
use crate::database::Pagination;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::ListMoviesQuery;

#[derive(Debug, Serialize)]
pub struct MovieListPayload {
    pub movies: Vec<Movie>,
    pub pagination: Pagination,
}

/// Filtered, paginated listing of the caller's movies, newest first
pub async fn movies_get(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    query: Result<Query<ListMoviesQuery>, QueryRejection>,
) -> ApiResult<MovieListPayload> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let (filter, page) = query.into_parts(state.config.api.default_page_size, state.config.api.max_page_size)?;

    let result = state.store.list_movies(user.id, &filter, page).await?;
    let pagination = Pagination::new(page, result.movies.len(), result.total);

    Ok(ApiResponse::success(MovieListPayload {
        movies: result.movies,
        pagination,
    }))
}

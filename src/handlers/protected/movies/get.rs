// handlers/protected/movies/get.rs - GET /api/movies/:id handler

use axum::{
    extract::{Path, State},
    Extension,
};

use super::{movie_not_found, parse_movie_id, MoviePayload};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

pub async fn movie_get(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<MoviePayload> {
    let id = parse_movie_id(&id)?;
    let movie = state.store.find_movie(user.id, id).await?.ok_or_else(movie_not_found)?;

    Ok(ApiResponse::success(MoviePayload { message: None, movie }))
}

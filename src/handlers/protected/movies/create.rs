// handlers/protected/movies/create.rs - POST /api/movies handler

use axum::{extract::State, Extension};

use super::MoviePayload;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::WatchlistAction;
use crate::validation::{CreateMovieRequest, ValidatedJson};

pub async fn movie_post(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateMovieRequest>,
) -> ApiResult<MoviePayload> {
    let new_movie = payload.into_new_movie()?;
    let movie = state.store.create_movie(user.id, new_movie).await?;

    tracing::debug!("User {} added movie {}", user.id, movie.id);
    state.notifier.watchlist_update(&user, &movie, WatchlistAction::Added);

    Ok(ApiResponse::created(MoviePayload {
        message: Some("Movie added to watchlist successfully"),
        movie,
    }))
}

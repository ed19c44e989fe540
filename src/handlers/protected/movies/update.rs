// handlers/protected/movies/update.rs - PUT /api/movies/:id handler

use axum::{
    extract::{Path, State},
    Extension,
};

use super::{movie_not_found, parse_movie_id, MoviePayload};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::classify_update;
use crate::validation::{UpdateMovieRequest, ValidatedJson};

/// Partial update. The notification kind is derived from what actually changed:
/// status first, then rating, otherwise a generic update.
pub async fn movie_put(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateMovieRequest>,
) -> ApiResult<MoviePayload> {
    let id = parse_movie_id(&id)?;
    let patch = payload.into_patch()?;

    let before = state.store.find_movie(user.id, id).await?.ok_or_else(movie_not_found)?;
    let movie = state
        .store
        .update_movie(user.id, id, &patch)
        .await?
        .ok_or_else(movie_not_found)?;

    let action = classify_update(&before, &movie);
    tracing::debug!("User {} updated movie {} ({})", user.id, movie.id, action.as_str());
    state.notifier.watchlist_update(&user, &movie, action);

    Ok(ApiResponse::success(MoviePayload {
        message: Some("Movie updated successfully"),
        movie,
    }))
}

// handlers/protected/movies/stats.rs - GET /api/movies/stats handler

use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::database::MovieStats;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

pub async fn stats_get(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> ApiResult<MovieStats> {
    let stats = state.store.movie_stats(user.id).await?;
    Ok(ApiResponse::success(stats))
}

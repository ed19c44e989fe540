// handlers/protected/movies/delete.rs - DELETE /api/movies/:id handler

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Serialize;

use super::{movie_not_found, parse_movie_id};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
pub struct DeletedPayload {
    pub message: &'static str,
}

pub async fn movie_delete(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<DeletedPayload> {
    let id = parse_movie_id(&id)?;

    if !state.store.delete_movie(user.id, id).await? {
        return Err(movie_not_found());
    }

    tracing::debug!("User {} deleted movie {}", user.id, id);
    Ok(ApiResponse::success(DeletedPayload {
        message: "Movie deleted successfully",
    }))
}

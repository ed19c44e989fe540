// handlers/protected/movies/mod.rs - Watchlist CRUD and aggregates
//
// Ownership is enforced in the store queries themselves. A movie that does not
// exist and one that belongs to someone else produce the identical 404.

use serde::Serialize;
use uuid::Uuid;

use crate::database::models::Movie;
use crate::error::ApiError;

pub mod create; // POST   /api/movies
pub mod delete; // DELETE /api/movies/:id
pub mod get;    // GET    /api/movies/:id
pub mod list;   // GET    /api/movies
pub mod stats;  // GET    /api/movies/stats
pub mod update; // PUT    /api/movies/:id

pub use create::movie_post;
pub use delete::movie_delete;
pub use get::movie_get;
pub use list::movies_get;
pub use stats::stats_get;
pub use update::movie_put;

#[derive(Debug, Serialize)]
pub struct MoviePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub movie: Movie,
}

pub(crate) fn movie_not_found() -> ApiError {
    ApiError::not_found("Movie not found")
}

/// Ids that are not UUIDs cannot name a movie, so they are reported like any missing movie
pub(crate) fn parse_movie_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| movie_not_found())
}

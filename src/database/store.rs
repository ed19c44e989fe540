use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Movie, MoviePatch, NewMovie, NewUser, User};
use crate::database::pagination::PageRequest;
use crate::types::{Genre, WatchStatus};

/// Account persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// Fails with `DatabaseError::Conflict` when the email is already registered
    async fn create_user(&self, new_user: NewUser) -> Result<User, DatabaseError>;
}

/// Watchlist persistence. Every method takes the owning user id and applies it as a filter,
/// so a movie owned by someone else behaves exactly like a missing one.
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn create_movie(&self, owner: Uuid, movie: NewMovie) -> Result<Movie, DatabaseError>;

    async fn list_movies(&self, owner: Uuid, filter: &MovieFilter, page: PageRequest) -> Result<MoviePage, DatabaseError>;

    async fn find_movie(&self, owner: Uuid, id: Uuid) -> Result<Option<Movie>, DatabaseError>;

    async fn update_movie(&self, owner: Uuid, id: Uuid, patch: &MoviePatch) -> Result<Option<Movie>, DatabaseError>;

    /// Returns false when nothing matched
    async fn delete_movie(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError>;

    async fn movie_stats(&self, owner: Uuid) -> Result<MovieStats, DatabaseError>;
}

/// Everything the HTTP layer needs from a backing store
#[async_trait]
pub trait Datastore: UserStore + MovieStore {
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Optional list filters; all present conditions must hold
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    pub status: Option<WatchStatus>,
    pub genre: Option<Genre>,
    pub min_rating: Option<Decimal>,
    pub search: Option<String>,
}

impl MovieFilter {
    /// In-process evaluation of the filter, equivalent to the SQL predicate
    pub fn matches(&self, movie: &Movie) -> bool {
        if let Some(status) = self.status {
            if movie.watch_status != status {
                return false;
            }
        }
        if let Some(genre) = self.genre {
            if movie.genre != genre {
                return false;
            }
        }
        if let Some(min) = self.min_rating {
            match movie.rating {
                Some(rating) if rating >= min => {}
                _ => return false,
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_title = movie.title.to_lowercase().contains(&needle);
            let in_director = movie
                .director
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_director {
                return false;
            }
        }
        true
    }
}

/// One page of movies plus the total number of matches across all pages
#[derive(Debug, Clone)]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub watch_status: WatchStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreCount {
    pub genre: Genre,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieStats {
    pub total_movies: i64,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub average_rating: Option<Decimal>,
    pub status_breakdown: Vec<StatusCount>,
    pub genre_breakdown: Vec<GenreCount>,
}

impl MovieStats {
    /// Builds stats from raw aggregates, applying the breakdown ordering and rating rounding
    pub fn from_parts(
        total_movies: i64,
        average_rating: Option<Decimal>,
        mut status_breakdown: Vec<StatusCount>,
        mut genre_breakdown: Vec<GenreCount>,
    ) -> Self {
        status_breakdown.sort_by_key(|s| s.watch_status);
        genre_breakdown.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.as_str().cmp(b.genre.as_str())));

        Self {
            total_movies,
            average_rating: average_rating.map(round_rating),
            status_breakdown,
            genre_breakdown,
        }
    }
}

/// Ratings are reported with one decimal place, halves rounded away from zero
pub fn round_rating(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Escapes LIKE wildcards so the search term is matched literally
pub fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

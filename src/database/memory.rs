//! In-process store with the same ownership and ordering semantics as the
//! PostgreSQL store. Used by the test harness and for running the API
//! without a database.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Movie, MoviePatch, NewMovie, NewUser, User};
use crate::database::pagination::PageRequest;
use crate::database::store::{
    Datastore, GenreCount, MovieFilter, MoviePage, MovieStats, MovieStore, StatusCount, UserStore,
};

#[derive(Default)]
struct State {
    users: Vec<User>,
    // Insertion order; newest last
    movies: Vec<Movie>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users, regardless of owner
    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::Conflict("User already exists with this email".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            email_notifications: new_user.email_notifications,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl MovieStore for MemoryStore {
    async fn create_movie(&self, owner: Uuid, movie: NewMovie) -> Result<Movie, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.users.iter().any(|u| u.id == owner) {
            return Err(DatabaseError::InvalidRow(format!("movie owner {} does not exist", owner)));
        }

        let now = Utc::now();
        let movie = Movie {
            id: Uuid::new_v4(),
            title: movie.title,
            genre: movie.genre,
            rating: movie.rating,
            watch_status: movie.watch_status.unwrap_or_default(),
            personal_notes: movie.personal_notes,
            release_year: movie.release_year,
            director: movie.director,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        state.movies.push(movie.clone());
        Ok(movie)
    }

    async fn list_movies(&self, owner: Uuid, filter: &MovieFilter, page: PageRequest) -> Result<MoviePage, DatabaseError> {
        let state = self.state.read().await;

        // Newest first; reverse insertion order breaks timestamp ties
        let mut matching: Vec<&Movie> = state
            .movies
            .iter()
            .rev()
            .filter(|m| m.user_id == owner && filter.matches(m))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let movies = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();

        Ok(MoviePage { movies, total })
    }

    async fn find_movie(&self, owner: Uuid, id: Uuid) -> Result<Option<Movie>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.movies.iter().find(|m| m.id == id && m.user_id == owner).cloned())
    }

    async fn update_movie(&self, owner: Uuid, id: Uuid, patch: &MoviePatch) -> Result<Option<Movie>, DatabaseError> {
        let mut state = self.state.write().await;
        let Some(movie) = state.movies.iter_mut().find(|m| m.id == id && m.user_id == owner) else {
            return Ok(None);
        };

        patch.apply_to(movie);
        movie.updated_at = Utc::now();
        Ok(Some(movie.clone()))
    }

    async fn delete_movie(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        let before = state.movies.len();
        state.movies.retain(|m| !(m.id == id && m.user_id == owner));
        Ok(state.movies.len() < before)
    }

    async fn movie_stats(&self, owner: Uuid) -> Result<MovieStats, DatabaseError> {
        let state = self.state.read().await;
        let owned: Vec<&Movie> = state.movies.iter().filter(|m| m.user_id == owner).collect();

        let mut status_breakdown: Vec<StatusCount> = Vec::new();
        let mut genre_breakdown: Vec<GenreCount> = Vec::new();
        for movie in &owned {
            match status_breakdown.iter_mut().find(|s| s.watch_status == movie.watch_status) {
                Some(entry) => entry.count += 1,
                None => status_breakdown.push(StatusCount { watch_status: movie.watch_status, count: 1 }),
            }
            match genre_breakdown.iter_mut().find(|g| g.genre == movie.genre) {
                Some(entry) => entry.count += 1,
                None => genre_breakdown.push(GenreCount { genre: movie.genre, count: 1 }),
            }
        }

        let ratings: Vec<Decimal> = owned.iter().filter_map(|m| m.rating).collect();
        let average = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().copied().sum::<Decimal>() / Decimal::from(ratings.len()))
        };

        Ok(MovieStats::from_parts(owned.len() as i64, average, status_breakdown, genre_breakdown))
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

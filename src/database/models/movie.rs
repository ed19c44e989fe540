use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Genre, WatchStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub genre: Genre,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub rating: Option<Decimal>,
    pub watch_status: WatchStatus,
    pub personal_notes: Option<String>,
    pub release_year: Option<i32>,
    pub director: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when a movie is added to a watchlist
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub genre: Genre,
    pub rating: Option<Decimal>,
    pub watch_status: Option<WatchStatus>,
    pub personal_notes: Option<String>,
    pub release_year: Option<i32>,
    pub director: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub genre: Option<Genre>,
    pub rating: Option<Decimal>,
    pub watch_status: Option<WatchStatus>,
    pub personal_notes: Option<String>,
    pub release_year: Option<i32>,
    pub director: Option<String>,
}

impl MoviePatch {
    pub fn apply_to(&self, movie: &mut Movie) {
        if let Some(title) = &self.title {
            movie.title = title.clone();
        }
        if let Some(genre) = self.genre {
            movie.genre = genre;
        }
        if let Some(rating) = self.rating {
            movie.rating = Some(rating);
        }
        if let Some(status) = self.watch_status {
            movie.watch_status = status;
        }
        if let Some(notes) = &self.personal_notes {
            movie.personal_notes = Some(notes.clone());
        }
        if let Some(year) = self.release_year {
            movie.release_year = Some(year);
        }
        if let Some(director) = &self.director {
            movie.director = Some(director.clone());
        }
    }
}

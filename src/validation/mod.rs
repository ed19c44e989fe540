//! Request schemas and the extractor that enforces them before a handler runs.
//!
//! Each schema reports only the first violated constraint, in field
//! declaration order, as a single human-readable message.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Utc};
use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde::{de::DeserializeOwned, Deserialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::database::models::{MoviePatch, NewMovie};
use crate::database::store::round_rating;
use crate::database::{MovieFilter, PageRequest};
use crate::error::ApiError;
use crate::types::{Genre, WatchStatus};

pub const MIN_RELEASE_YEAR: i32 = 1888;

/// A validated payload with a fixed reporting order for its fields
pub trait Schema: Validate {
    const FIELDS: &'static [&'static str];
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100, message = "\"name\" length must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "\"email\" must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "\"password\" length must be at least 6 characters long"))]
    pub password: String,
    pub email_notifications: Option<bool>,
}

impl Schema for RegisterRequest {
    const FIELDS: &'static [&'static str] = &["name", "email", "password", "email_notifications"];
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(email(message = "\"email\" must be a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "\"password\" is not allowed to be empty"))]
    pub password: String,
}

impl Schema for LoginRequest {
    const FIELDS: &'static [&'static str] = &["email", "password"];
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateMovieRequest {
    #[validate(length(min = 1, max = 255, message = "\"title\" length must be between 1 and 255 characters"))]
    pub title: String,
    #[validate(custom(function = "validate_genre"))]
    pub genre: String,
    #[validate(range(min = 0.0, max = 10.0, message = "\"rating\" must be between 0 and 10"))]
    pub rating: Option<f64>,
    #[validate(custom(function = "validate_watch_status"))]
    pub watch_status: Option<String>,
    pub personal_notes: Option<String>,
    #[validate(custom(function = "validate_release_year"))]
    pub release_year: Option<i32>,
    pub director: Option<String>,
}

impl Schema for CreateMovieRequest {
    const FIELDS: &'static [&'static str] =
        &["title", "genre", "rating", "watch_status", "personal_notes", "release_year", "director"];
}

impl CreateMovieRequest {
    pub fn into_new_movie(self) -> Result<NewMovie, ApiError> {
        Ok(NewMovie {
            title: self.title,
            genre: self.genre.parse::<Genre>().map_err(ApiError::validation_error)?,
            rating: self.rating.map(to_rating).transpose()?,
            watch_status: self
                .watch_status
                .map(|s| s.parse::<WatchStatus>())
                .transpose()
                .map_err(ApiError::validation_error)?,
            personal_notes: self.personal_notes,
            release_year: self.release_year,
            director: self.director,
        })
    }
}

/// Partial movie update; same constraints as creation, every field optional
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateMovieRequest {
    #[validate(length(min = 1, max = 255, message = "\"title\" length must be between 1 and 255 characters"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_genre"))]
    pub genre: Option<String>,
    #[validate(range(min = 0.0, max = 10.0, message = "\"rating\" must be between 0 and 10"))]
    pub rating: Option<f64>,
    #[validate(custom(function = "validate_watch_status"))]
    pub watch_status: Option<String>,
    pub personal_notes: Option<String>,
    #[validate(custom(function = "validate_release_year"))]
    pub release_year: Option<i32>,
    pub director: Option<String>,
}

impl Schema for UpdateMovieRequest {
    const FIELDS: &'static [&'static str] = CreateMovieRequest::FIELDS;
}

impl UpdateMovieRequest {
    pub fn into_patch(self) -> Result<MoviePatch, ApiError> {
        Ok(MoviePatch {
            title: self.title,
            genre: self
                .genre
                .map(|g| g.parse::<Genre>())
                .transpose()
                .map_err(ApiError::validation_error)?,
            rating: self.rating.map(to_rating).transpose()?,
            watch_status: self
                .watch_status
                .map(|s| s.parse::<WatchStatus>())
                .transpose()
                .map_err(ApiError::validation_error)?,
            personal_notes: self.personal_notes,
            release_year: self.release_year,
            director: self.director,
        })
    }
}

/// Raw list query; values arrive as strings and empty values count as absent
#[derive(Debug, Default, Deserialize)]
pub struct ListMoviesQuery {
    pub status: Option<String>,
    pub genre: Option<String>,
    pub rating: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListMoviesQuery {
    pub fn into_parts(self, default_limit: u32, max_limit: u32) -> Result<(MovieFilter, PageRequest), ApiError> {
        let status = present(self.status)
            .map(|s| s.parse::<WatchStatus>())
            .transpose()
            .map_err(ApiError::validation_error)?;
        let genre = present(self.genre)
            .map(|g| g.parse::<Genre>())
            .transpose()
            .map_err(ApiError::validation_error)?;
        let min_rating = present(self.rating)
            .map(|r| {
                r.trim()
                    .parse::<Decimal>()
                    .map_err(|_| ApiError::validation_error("\"rating\" must be a number"))
            })
            .transpose()?;

        let page = parse_positive(present(self.page), "page")?.unwrap_or(1);
        let limit = parse_positive(present(self.limit), "limit")?
            .unwrap_or(default_limit)
            .min(max_limit);

        let filter = MovieFilter { status, genre, min_rating, search: present(self.search) };
        Ok((filter, PageRequest::new(page, limit)))
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_positive(value: Option<String>, field: &str) -> Result<Option<u32>, ApiError> {
    value
        .map(|v| {
            v.trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| ApiError::validation_error(format!("\"{}\" must be a positive integer", field)))
        })
        .transpose()
}

fn to_rating(value: f64) -> Result<Decimal, ApiError> {
    Decimal::from_f64(value)
        .map(round_rating)
        .ok_or_else(|| ApiError::validation_error("\"rating\" must be a number"))
}

fn validate_genre(value: &str) -> Result<(), ValidationError> {
    value.parse::<Genre>().map(|_| ()).map_err(|msg| with_message("genre", msg))
}

fn validate_watch_status(value: &str) -> Result<(), ValidationError> {
    value.parse::<WatchStatus>().map(|_| ()).map_err(|msg| with_message("watch_status", msg))
}

fn validate_release_year(year: i32) -> Result<(), ValidationError> {
    let max = Utc::now().year() + 5;
    if year < MIN_RELEASE_YEAR {
        return Err(with_message(
            "release_year",
            format!("\"releaseYear\" must be greater than or equal to {}", MIN_RELEASE_YEAR),
        ));
    }
    if year > max {
        return Err(with_message("release_year", format!("\"releaseYear\" must be less than or equal to {}", max)));
    }
    Ok(())
}

fn with_message(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn normalize(name: &str) -> String {
    name.chars().filter(|c| *c != '_').flat_map(char::to_lowercase).collect()
}

/// Message for the first failing field in `fields` order
pub fn first_error(errors: &ValidationErrors, fields: &[&str]) -> String {
    let field_errors = errors.field_errors();
    let mut failing: Vec<(usize, &str, &ValidationError)> = Vec::new();

    for (key, list) in field_errors.iter() {
        let name: &str = key;
        let Some(first) = list.first() else { continue };
        let position = fields
            .iter()
            .position(|f| normalize(f) == normalize(name))
            .unwrap_or(fields.len());
        failing.push((position, name, first));
    }

    failing.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    match failing.first() {
        Some((_, name, error)) => error
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("\"{}\" is invalid", name)),
        None => "Validation failed".to_string(),
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::payload_too_large("Request body is too large"),
        StatusCode::UNPROCESSABLE_ENTITY => ApiError::validation_error(data_error_message(&rejection.body_text())),
        _ => ApiError::bad_request(rejection.body_text()),
    }
}

/// Rewrites serde's missing/unknown field errors in the schema message style
fn data_error_message(text: &str) -> String {
    if let Some(field) = backticked_after(text, "missing field `") {
        return format!("\"{}\" is required", field);
    }
    if let Some(field) = backticked_after(text, "unknown field `") {
        return format!("\"{}\" is not allowed", field);
    }
    text.to_string()
}

fn backticked_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let rest = &text[text.find(marker)? + marker.len()..];
    rest.find('`').map(|end| &rest[..end])
}

/// JSON body extractor that rejects malformed or invalid payloads with a 400
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Schema,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await.map_err(json_rejection)?;

        payload
            .validate()
            .map_err(|errors| ApiError::validation_error(first_error(&errors, T::FIELDS)))?;

        Ok(Self(payload))
    }
}

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Movie, MoviePatch, NewMovie, NewUser, User};
use crate::database::pagination::PageRequest;
use crate::database::store::{
    like_pattern, Datastore, GenreCount, MovieFilter, MoviePage, MovieStats, MovieStore, StatusCount, UserStore,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, email_notifications, created_at, updated_at";

const MOVIE_COLUMNS: &str =
    "id, title, genre, rating, watch_status, personal_notes, release_year, director, user_id, created_at, updated_at";

/// PostgreSQL-backed store sharing one connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn movie_from_row(row: &PgRow) -> Result<Movie, DatabaseError> {
    let genre: String = row.try_get("genre")?;
    let watch_status: String = row.try_get("watch_status")?;

    Ok(Movie {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        genre: genre.parse().map_err(DatabaseError::InvalidRow)?,
        rating: row.try_get("rating")?,
        watch_status: watch_status.parse().map_err(DatabaseError::InvalidRow)?,
        personal_notes: row.try_get("personal_notes")?,
        release_year: row.try_get("release_year")?,
        director: row.try_get("director")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Appends the ownership predicate and any list filters
fn push_movie_conditions(qb: &mut QueryBuilder<'_, Postgres>, owner: Uuid, filter: &MovieFilter) {
    qb.push(" WHERE user_id = ").push_bind(owner);

    if let Some(status) = filter.status {
        qb.push(" AND watch_status = ").push_bind(status.as_str());
    }
    if let Some(genre) = filter.genre {
        qb.push(" AND genre = ").push_bind(genre.as_str());
    }
    if let Some(min_rating) = filter.min_rating {
        qb.push(" AND rating >= ").push_bind(min_rating);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR director ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let query = format!(
            "INSERT INTO users (id, name, email, password_hash, email_notifications) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&new_user.name)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(new_user.email_notifications)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DatabaseError::Conflict("User already exists with this email".to_string())
                } else {
                    DatabaseError::Sqlx(e)
                }
            })
    }
}

#[async_trait]
impl MovieStore for PgStore {
    async fn create_movie(&self, owner: Uuid, movie: NewMovie) -> Result<Movie, DatabaseError> {
        let query = format!(
            "INSERT INTO movies (id, title, genre, rating, watch_status, personal_notes, release_year, director, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            MOVIE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&movie.title)
            .bind(movie.genre.as_str())
            .bind(movie.rating)
            .bind(movie.watch_status.unwrap_or_default().as_str())
            .bind(&movie.personal_notes)
            .bind(movie.release_year)
            .bind(&movie.director)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;

        movie_from_row(&row)
    }

    async fn list_movies(&self, owner: Uuid, filter: &MovieFilter, page: PageRequest) -> Result<MoviePage, DatabaseError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS count FROM movies");
        push_movie_conditions(&mut count_qb, owner, filter);
        let total: i64 = count_qb.build().fetch_one(&self.pool).await?.try_get("count")?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM movies", MOVIE_COLUMNS));
        push_movie_conditions(&mut qb, owner, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let movies = rows.iter().map(movie_from_row).collect::<Result<Vec<_>, _>>()?;

        Ok(MoviePage { movies, total })
    }

    async fn find_movie(&self, owner: Uuid, id: Uuid) -> Result<Option<Movie>, DatabaseError> {
        let query = format!("SELECT {} FROM movies WHERE id = $1 AND user_id = $2", MOVIE_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(movie_from_row).transpose()
    }

    async fn update_movie(&self, owner: Uuid, id: Uuid, patch: &MoviePatch) -> Result<Option<Movie>, DatabaseError> {
        let query = format!(
            "UPDATE movies SET \
                title = COALESCE($1, title), \
                genre = COALESCE($2, genre), \
                rating = COALESCE($3, rating), \
                watch_status = COALESCE($4, watch_status), \
                personal_notes = COALESCE($5, personal_notes), \
                release_year = COALESCE($6, release_year), \
                director = COALESCE($7, director), \
                updated_at = NOW() \
             WHERE id = $8 AND user_id = $9 RETURNING {}",
            MOVIE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(&patch.title)
            .bind(patch.genre.map(|g| g.as_str()))
            .bind(patch.rating)
            .bind(patch.watch_status.map(|s| s.as_str()))
            .bind(&patch.personal_notes)
            .bind(patch.release_year)
            .bind(&patch.director)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(movie_from_row).transpose()
    }

    async fn delete_movie(&self, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn movie_stats(&self, owner: Uuid) -> Result<MovieStats, DatabaseError> {
        let totals = sqlx::query("SELECT COUNT(*) AS total, AVG(rating) AS average FROM movies WHERE user_id = $1")
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = totals.try_get("total")?;
        let average: Option<Decimal> = totals.try_get("average")?;

        let status_rows = sqlx::query(
            "SELECT watch_status, COUNT(*) AS count FROM movies WHERE user_id = $1 GROUP BY watch_status",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let mut status_breakdown = Vec::with_capacity(status_rows.len());
        for row in &status_rows {
            let status: String = row.try_get("watch_status")?;
            status_breakdown.push(StatusCount {
                watch_status: status.parse().map_err(DatabaseError::InvalidRow)?,
                count: row.try_get("count")?,
            });
        }

        let genre_rows = sqlx::query(
            "SELECT genre, COUNT(*) AS count FROM movies WHERE user_id = $1 \
             GROUP BY genre ORDER BY count DESC, genre ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let mut genre_breakdown = Vec::with_capacity(genre_rows.len());
        for row in &genre_rows {
            let genre: String = row.try_get("genre")?;
            genre_breakdown.push(GenreCount {
                genre: genre.parse().map_err(DatabaseError::InvalidRow)?,
                count: row.try_get("count")?,
            });
        }

        Ok(MovieStats::from_parts(total, average, status_breakdown, genre_breakdown))
    }
}

#[async_trait]
impl Datastore for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Statements applied by `migrate`; each is idempotent
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        email_notifications BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS movies (
        id UUID PRIMARY KEY,
        title VARCHAR(255) NOT NULL CHECK (char_length(title) >= 1),
        genre TEXT NOT NULL CHECK (genre IN (
            'Action', 'Comedy', 'Drama', 'Horror', 'Romance', 'Sci-Fi',
            'Thriller', 'Adventure', 'Animation', 'Documentary', 'Fantasy', 'Mystery'
        )),
        rating NUMERIC(3, 1) CHECK (rating >= 0 AND rating <= 10),
        watch_status TEXT NOT NULL DEFAULT 'want_to_watch'
            CHECK (watch_status IN ('want_to_watch', 'watching', 'watched')),
        personal_notes TEXT,
        release_year INTEGER CHECK (release_year >= 1888),
        director TEXT,
        user_id UUID NOT NULL REFERENCES users (id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS movies_user_id_idx ON movies (user_id)",
    "CREATE INDEX IF NOT EXISTS movies_genre_idx ON movies (genre)",
    "CREATE INDEX IF NOT EXISTS movies_watch_status_idx ON movies (watch_status)",
];

/// Builds the shared connection pool once at process start
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        info!("Database connection established (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Creates tables and indexes if they do not exist
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}

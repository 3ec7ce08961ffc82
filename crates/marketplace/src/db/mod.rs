//! Database operations for the marketplace `PostgreSQL` instance.
//!
//! # Tables
//!
//! - `users` / `user_passwords` - Accounts and password hashes
//! - `businesses`, `products`, `services` - The browsable catalog, each row
//!   carrying its own `rating_sum` / `review_count` aggregate
//! - `favorites` - Per-user saved items, unique per (user, kind, item)
//! - `conversations` / `messages` - Customer-business threads
//! - `orders`, `bookings` - Pickup orders and service appointments
//! - `reviews` - One review per (target, author)
//! - `sessions` - tower-sessions storage
//!
//! # Migrations
//!
//! Migrations live in `crates/marketplace/migrations/` and run via:
//! ```bash
//! cargo run -p townsquare-cli -- migrate
//! ```
//!
//! All queries bind at runtime (`sqlx::query` / `query_as` with `FromRow`
//! row types) and convert rows into the domain models in [`crate::models`].

pub mod bookings;
pub mod businesses;
pub mod catalog;
pub mod conversations;
pub mod favorites;
pub mod orders;
pub mod reviews;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Error type for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a status-ish string column into its enum, flagging bad rows.
pub(crate) fn parse_column<T>(raw: &str, column: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid {column} in database: {e}"))
    })
}

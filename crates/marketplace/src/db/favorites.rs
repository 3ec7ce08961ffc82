//! Favorites repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use townsquare_core::{FavoriteId, TargetKind, UserId};

use super::{RepositoryError, parse_column};
use crate::models::favorite::Favorite;

const FAVORITE_COLUMNS: &str = "id, user_id, kind, item_id, name, image_url, price, created_at";

#[derive(Debug, sqlx::FromRow)]
struct FavoriteRow {
    id: i32,
    user_id: i32,
    kind: String,
    item_id: i32,
    name: String,
    image_url: Option<String>,
    price: Option<Decimal>,
    created_at: DateTime<Utc>,
}

impl FavoriteRow {
    fn into_favorite(self) -> Result<Favorite, RepositoryError> {
        let kind: TargetKind = parse_column(&self.kind, "favorite kind")?;
        Ok(Favorite {
            id: FavoriteId::new(self.id),
            user_id: UserId::new(self.user_id),
            kind,
            item_id: self.item_id,
            name: self.name,
            image_url: self.image_url,
            price: self.price,
            created_at: self.created_at,
        })
    }
}

/// Display snapshot stored alongside a favorite.
#[derive(Debug, Clone)]
pub struct FavoriteSnapshot {
    pub name: String,
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
}

/// Repository for favorites.
pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a favorite. Idempotent: re-adding an existing (user, kind, item)
    /// returns the original row unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add(
        &self,
        user_id: UserId,
        kind: TargetKind,
        item_id: i32,
        snapshot: &FavoriteSnapshot,
    ) -> Result<Favorite, RepositoryError> {
        let inserted = sqlx::query_as::<_, FavoriteRow>(&format!(
            "INSERT INTO favorites (user_id, kind, item_id, name, image_url, price) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (user_id, kind, item_id) DO NOTHING \
             RETURNING {FAVORITE_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(kind.as_str())
        .bind(item_id)
        .bind(&snapshot.name)
        .bind(snapshot.image_url.as_deref())
        .bind(snapshot.price)
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = inserted {
            return row.into_favorite();
        }

        // Conflict path: the favorite already exists, return it.
        let existing = sqlx::query_as::<_, FavoriteRow>(&format!(
            "SELECT {FAVORITE_COLUMNS} FROM favorites \
             WHERE user_id = $1 AND kind = $2 AND item_id = $3"
        ))
        .bind(user_id.as_i32())
        .bind(kind.as_str())
        .bind(item_id)
        .fetch_one(self.pool)
        .await?;

        existing.into_favorite()
    }

    /// Remove a favorite. Returns whether a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        kind: TargetKind,
        item_id: i32,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND kind = $2 AND item_id = $3")
                .bind(user_id.as_i32())
                .bind(kind.as_str())
                .bind(item_id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List a user's favorites, newest first, optionally scoped to one kind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        kind: Option<TargetKind>,
    ) -> Result<Vec<Favorite>, RepositoryError> {
        let rows = sqlx::query_as::<_, FavoriteRow>(&format!(
            "SELECT {FAVORITE_COLUMNS} FROM favorites \
             WHERE user_id = $1 AND ($2::TEXT IS NULL OR kind = $2) \
             ORDER BY created_at DESC"
        ))
        .bind(user_id.as_i32())
        .bind(kind.map(|k| k.as_str()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(FavoriteRow::into_favorite).collect()
    }

    /// Whether the user has favorited the given target.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains(
        &self,
        user_id: UserId,
        kind: TargetKind,
        item_id: i32,
    ) -> Result<bool, RepositoryError> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS( \
                SELECT 1 FROM favorites \
                WHERE user_id = $1 AND kind = $2 AND item_id = $3)",
        )
        .bind(user_id.as_i32())
        .bind(kind.as_str())
        .bind(item_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists.0)
    }
}

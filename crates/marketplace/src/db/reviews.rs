//! Review repository.
//!
//! Every review write also moves the target row's `rating_sum` and
//! `review_count` counters, in the same transaction, so the listed average
//! never drifts from the stored reviews.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use townsquare_core::{Rating, ReviewId, TargetKind, UserId};

use super::{RepositoryError, parse_column};
use crate::models::review::Review;

const REVIEW_COLUMNS: &str = "id, kind, item_id, user_id, user_name, rating, comment, \
     response, visible, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    kind: String,
    item_id: i32,
    user_id: i32,
    user_name: String,
    rating: i16,
    comment: String,
    response: Option<String>,
    visible: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Result<Review, RepositoryError> {
        let kind: TargetKind = parse_column(&self.kind, "review kind")?;
        let rating = Rating::new(self.rating).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid rating in database: {e}"))
        })?;

        Ok(Review {
            id: ReviewId::new(self.id),
            kind,
            item_id: self.item_id,
            user_id: UserId::new(self.user_id),
            user_name: self.user_name,
            rating,
            comment: self.comment,
            response: self.response,
            visible: self.visible,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List visible reviews for a target, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_target(
        &self,
        kind: TargetKind,
        item_id: i32,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE kind = $1 AND item_id = $2 AND visible \
             ORDER BY created_at DESC"
        ))
        .bind(kind.as_str())
        .bind(item_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ReviewRow::into_review).collect()
    }

    /// Get a review by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(ReviewRow::into_review).transpose()
    }

    /// The signed-in user's review of a target, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_author(
        &self,
        kind: TargetKind,
        item_id: i32,
        user_id: UserId,
    ) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE kind = $1 AND item_id = $2 AND user_id = $3"
        ))
        .bind(kind.as_str())
        .bind(item_id)
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(ReviewRow::into_review).transpose()
    }

    /// Create a review and add it to the target's aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed this
    /// target, or `RepositoryError::NotFound` if the target doesn't exist.
    pub async fn create(
        &self,
        kind: TargetKind,
        item_id: i32,
        user_id: UserId,
        user_name: &str,
        rating: Rating,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "INSERT INTO reviews (kind, item_id, user_id, user_name, rating, comment) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(kind.as_str())
        .bind(item_id)
        .bind(user_id.as_i32())
        .bind(user_name)
        .bind(rating.value())
        .bind(comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("target already reviewed".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        apply_rating_delta(&mut tx, kind, item_id, i64::from(rating.value()), 1).await?;

        tx.commit().await?;

        row.into_review()
    }

    /// Rewrite the author's review and replace its rating in the aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist or
    /// isn't the user's.
    pub async fn update(
        &self,
        id: ReviewId,
        user_id: UserId,
        rating: Rating,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<(String, i32, i16)> = sqlx::query_as(
            "SELECT kind, item_id, rating FROM reviews \
             WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let Some((raw_kind, item_id, old_rating)) = previous else {
            return Err(RepositoryError::NotFound);
        };
        let kind: TargetKind = parse_column(&raw_kind, "review kind")?;

        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE reviews SET rating = $2, comment = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(rating.value())
        .bind(comment)
        .fetch_one(&mut *tx)
        .await?;

        let delta = i64::from(rating.value()) - i64::from(old_rating);
        apply_rating_delta(&mut tx, kind, item_id, delta, 0).await?;

        tx.commit().await?;

        row.into_review()
    }

    /// Delete the author's review and remove it from the aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist or
    /// isn't the user's.
    pub async fn delete(&self, id: ReviewId, user_id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deleted: Option<(String, i32, i16)> = sqlx::query_as(
            "DELETE FROM reviews WHERE id = $1 AND user_id = $2 \
             RETURNING kind, item_id, rating",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let Some((raw_kind, item_id, rating)) = deleted else {
            return Err(RepositoryError::NotFound);
        };
        let kind: TargetKind = parse_column(&raw_kind, "review kind")?;

        apply_rating_delta(&mut tx, kind, item_id, -i64::from(rating), -1).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Attach or replace the business's response to a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn respond(
        &self,
        id: ReviewId,
        response: &str,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE reviews SET response = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(response)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => r.into_review(),
            None => Err(RepositoryError::NotFound),
        }
    }
}

/// Shift the target row's rating counters inside the caller's transaction.
///
/// `sum_delta` moves `rating_sum`; `count_delta` moves `review_count`. Both
/// floor at zero so a stray repeat can't drive the counters negative.
async fn apply_rating_delta(
    tx: &mut Transaction<'_, Postgres>,
    kind: TargetKind,
    item_id: i32,
    sum_delta: i64,
    count_delta: i64,
) -> Result<(), RepositoryError> {
    let table = kind.table();

    let updated = sqlx::query(&format!(
        "UPDATE {table} SET \
            rating_sum = GREATEST(rating_sum + $2, 0), \
            review_count = GREATEST(review_count + $3, 0), \
            updated_at = NOW() \
         WHERE id = $1"
    ))
    .bind(item_id)
    .bind(sum_delta)
    .bind(count_delta)
    .execute(&mut **tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

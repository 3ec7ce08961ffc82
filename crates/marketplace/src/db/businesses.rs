//! Business repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use townsquare_core::{BusinessId, Email, RatingSummary};

use super::RepositoryError;
use crate::models::business::Business;

const BUSINESS_COLUMNS: &str = "id, owner_email, name, business_type, description, \
     city_code, city_name, state_code, state_name, address, logo_url, verified, \
     hours, rating_sum, review_count, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct BusinessRow {
    id: i32,
    owner_email: String,
    name: String,
    business_type: String,
    description: String,
    city_code: Option<String>,
    city_name: Option<String>,
    state_code: Option<String>,
    state_name: Option<String>,
    address: Option<String>,
    logo_url: Option<String>,
    verified: bool,
    hours: Option<serde_json::Value>,
    rating_sum: i64,
    review_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BusinessRow {
    fn into_business(self) -> Result<Business, RepositoryError> {
        let owner_email = Email::parse(&self.owner_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid owner email in database: {e}"))
        })?;
        let summary = RatingSummary::from_parts(self.rating_sum, self.review_count);

        Ok(Business {
            id: BusinessId::new(self.id),
            owner_email,
            name: self.name,
            business_type: self.business_type,
            description: self.description,
            city_code: self.city_code,
            city_name: self.city_name,
            state_code: self.state_code,
            state_name: self.state_name,
            address: self.address,
            logo_url: self.logo_url,
            verified: self.verified,
            hours: self.hours,
            rating: summary.average(),
            review_count: self.review_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Default page size for business listings.
const DEFAULT_PAGE_SIZE: i64 = 50;

/// Largest accepted page size.
const MAX_PAGE_SIZE: i64 = 200;

/// Filters for listing businesses.
#[derive(Debug, Clone, Default)]
pub struct BusinessFilter {
    /// Exact match on the business type.
    pub business_type: Option<String>,
    /// Exact match on the city code.
    pub city_code: Option<String>,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    /// Page size, clamped to [`MAX_PAGE_SIZE`].
    pub limit: Option<i64>,
    /// Rows to skip.
    pub offset: Option<i64>,
}

impl BusinessFilter {
    fn page(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// Repository for business database operations.
pub struct BusinessRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BusinessRepository<'a> {
    /// Create a new business repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List businesses matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &BusinessFilter) -> Result<Vec<Business>, RepositoryError> {
        let (limit, offset) = filter.page();

        let rows = sqlx::query_as::<_, BusinessRow>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses \
             WHERE ($1::TEXT IS NULL OR business_type = $1) \
               AND ($2::TEXT IS NULL OR city_code = $2) \
               AND ($3::TEXT IS NULL OR name ILIKE '%' || $3 || '%') \
             ORDER BY created_at DESC \
             LIMIT $4 OFFSET $5"
        ))
        .bind(filter.business_type.as_deref())
        .bind(filter.city_code.as_deref())
        .bind(filter.search.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(BusinessRow::into_business).collect()
    }

    /// Get a business by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BusinessId) -> Result<Option<Business>, RepositoryError> {
        let row = sqlx::query_as::<_, BusinessRow>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(BusinessRow::into_business).transpose()
    }

    /// Get a business by its owner's email.
    ///
    /// Conversations address the business side by this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_owner_email(
        &self,
        owner_email: &Email,
    ) -> Result<Option<Business>, RepositoryError> {
        let row = sqlx::query_as::<_, BusinessRow>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE owner_email = $1"
        ))
        .bind(owner_email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(BusinessRow::into_business).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let filter = BusinessFilter::default();
        assert_eq!(filter.page(), (DEFAULT_PAGE_SIZE, 0));
    }

    #[test]
    fn test_page_clamps_out_of_range_values() {
        let filter = BusinessFilter {
            limit: Some(10_000),
            offset: Some(-5),
            ..BusinessFilter::default()
        };
        assert_eq!(filter.page(), (MAX_PAGE_SIZE, 0));

        let filter = BusinessFilter {
            limit: Some(0),
            offset: Some(20),
            ..BusinessFilter::default()
        };
        assert_eq!(filter.page(), (1, 20));
    }
}

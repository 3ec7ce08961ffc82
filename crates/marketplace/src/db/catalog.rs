//! Product and service repositories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use townsquare_core::{BusinessId, ProductId, RatingSummary, ServiceId};

use super::RepositoryError;
use crate::models::catalog::{Product, Service};

const PRODUCT_COLUMNS: &str = "id, business_id, name, description, price, image_urls, \
     in_stock, rating_sum, review_count, created_at, updated_at";

const SERVICE_COLUMNS: &str = "id, business_id, name, description, price, \
     duration_minutes, active, rating_sum, review_count, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    business_id: i32,
    name: String,
    description: String,
    price: Decimal,
    image_urls: Vec<String>,
    in_stock: bool,
    rating_sum: i64,
    review_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Product {
        let summary = RatingSummary::from_parts(self.rating_sum, self.review_count);
        Product {
            id: ProductId::new(self.id),
            business_id: BusinessId::new(self.business_id),
            name: self.name,
            description: self.description,
            price: self.price,
            image_urls: self.image_urls,
            in_stock: self.in_stock,
            rating: summary.average(),
            review_count: self.review_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: i32,
    business_id: i32,
    name: String,
    description: String,
    price: Decimal,
    duration_minutes: i32,
    active: bool,
    rating_sum: i64,
    review_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServiceRow {
    fn into_service(self) -> Service {
        let summary = RatingSummary::from_parts(self.rating_sum, self.review_count);
        Service {
            id: ServiceId::new(self.id),
            business_id: BusinessId::new(self.business_id),
            name: self.name,
            description: self.description,
            price: self.price,
            duration_minutes: self.duration_minutes,
            active: self.active,
            rating: summary.average(),
            review_count: self.review_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for product and service reads.
///
/// Catalog rows are written by the owner dashboard; the marketplace only
/// reads them (review writes touch the aggregate counters separately).
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a business's products, in-stock first, newest first within each
    /// partition.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(
        &self,
        business_id: BusinessId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE business_id = $1 \
             ORDER BY in_stock DESC, created_at DESC"
        ))
        .bind(business_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ProductRow::into_product))
    }

    /// List a business's services, active first, newest first within each
    /// partition.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_services(
        &self,
        business_id: BusinessId,
    ) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services \
             WHERE business_id = $1 \
             ORDER BY active DESC, created_at DESC"
        ))
        .bind(business_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ServiceRow::into_service).collect())
    }

    /// Get a service by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_service(&self, id: ServiceId) -> Result<Option<Service>, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ServiceRow::into_service))
    }
}

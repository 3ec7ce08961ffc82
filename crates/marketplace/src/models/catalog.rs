//! Product and service domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use townsquare_core::{BusinessId, ProductId, ServiceId};

/// A product offered for pickup.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub business_id: BusinessId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_urls: Vec<String>,
    /// The available/unavailable partition.
    pub in_stock: bool,
    pub rating: Option<Decimal>,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// First image, used for denormalized snapshots.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }
}

/// A bookable service.
#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: ServiceId,
    pub business_id: BusinessId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub duration_minutes: i32,
    /// The active/inactive partition.
    pub active: bool,
    pub rating: Option<Decimal>,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

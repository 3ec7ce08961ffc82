//! Business domain type.
//!
//! Businesses are created and edited by the owner dashboard; the marketplace
//! reads them and maintains their rating aggregate through review writes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use townsquare_core::{BusinessId, Email};

/// A business listed on the marketplace.
#[derive(Debug, Clone, Serialize)]
pub struct Business {
    pub id: BusinessId,
    /// Owner's email; addresses the business in conversations.
    pub owner_email: Email,
    pub name: String,
    pub business_type: String,
    pub description: String,
    pub city_code: Option<String>,
    pub city_name: Option<String>,
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub verified: bool,
    /// Opening hours, free-form per weekday.
    pub hours: Option<serde_json::Value>,
    /// Mean review rating rounded to one decimal, if any reviews exist.
    pub rating: Option<Decimal>,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

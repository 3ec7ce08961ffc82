//! Favorite domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use townsquare_core::{FavoriteId, TargetKind, UserId};

/// A saved reference to a business, product, or service.
///
/// Display fields are a snapshot taken at favorite-time, so a renamed or
/// deleted target still renders in the favorites list.
#[derive(Debug, Clone, Serialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub kind: TargetKind,
    /// Id of the favorited row in the table for `kind`.
    pub item_id: i32,
    pub name: String,
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

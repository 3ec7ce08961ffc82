//! Review domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use townsquare_core::{Rating, ReviewId, TargetKind, UserId};

/// A customer review of a business, product, or service.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub kind: TargetKind,
    /// Id of the reviewed row in the table for `kind`.
    pub item_id: i32,
    pub user_id: UserId,
    /// Author display name, denormalized at write time.
    pub user_name: String,
    pub rating: Rating,
    pub comment: String,
    /// The business's reply, if any.
    pub response: Option<String>,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//! Session models.
//!
//! The session stores a compact view of the signed-in account; handlers that
//! need the full profile re-read it from the database.

use serde::{Deserialize, Serialize};

use townsquare_core::{Email, UserId, UserKind};

/// Session storage keys.
pub mod session_keys {
    /// The signed-in user ([`super::CurrentUser`]).
    pub const CURRENT_USER: &str = "current_user";
}

/// The signed-in account as stored in the session cookie's backing row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub kind: UserKind,
}

impl CurrentUser {
    /// Build the session view of a user.
    #[must_use]
    pub fn new(id: UserId, email: Email, name: String, kind: UserKind) -> Self {
        Self {
            id,
            email,
            name,
            kind,
        }
    }
}

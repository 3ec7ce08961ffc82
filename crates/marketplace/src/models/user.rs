//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use townsquare_core::{AuthProvider, Email, UserId, UserKind};

/// A marketplace account (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address (identity key).
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// City code + display name from the geo lookup API.
    pub city_code: Option<String>,
    pub city_name: Option<String>,
    /// State code + display name from the geo lookup API.
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub address: Option<String>,
    /// Public URL of the uploaded profile photo.
    pub photo_url: Option<String>,
    pub kind: UserKind,
    pub auth_provider: AuthProvider,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name for denormalized copies (conversations, reviews).
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let trimmed = full.trim();
        if trimmed.is_empty() {
            self.email.local_part().to_owned()
        } else {
            trimmed.to_owned()
        }
    }
}

/// Fields a profile edit may change. `None` leaves the column untouched
/// (merge semantics, like the original's write-with-merge).
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub city_code: Option<String>,
    pub city_name: Option<String>,
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("jo@example.com").unwrap(),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            phone: None,
            city_code: None,
            city_name: None,
            state_code: None,
            state_name: None,
            address: None,
            photo_url: None,
            kind: UserKind::Customer,
            auth_provider: AuthProvider::Password,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_joins_parts() {
        assert_eq!(user("Jo", "Smith").display_name(), "Jo Smith");
        assert_eq!(user("Jo", "").display_name(), "Jo");
    }

    #[test]
    fn test_display_name_falls_back_to_email_local_part() {
        assert_eq!(user("", "").display_name(), "jo");
    }
}

//! Authentication error types.

use thiserror::Error;

use townsquare_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email format is invalid.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password doesn't meet requirements.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Email/password combination is wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User doesn't exist.
    #[error("User not found")]
    UserNotFound,

    /// Email is already registered.
    #[error("User already exists")]
    UserAlreadyExists,

    /// The email was provisioned through Google sign-in and has no password.
    #[error("Account uses Google sign-in")]
    GoogleAccount,

    /// The email is registered with a password; Google sign-in is refused.
    #[error("Account uses password sign-in")]
    PasswordAccount,

    /// Password hashing failed.
    #[error("Password hashing failed")]
    PasswordHash,

    /// Google OAuth exchange or profile fetch failed.
    #[error("Google OAuth error: {0}")]
    Google(String),

    /// Database operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

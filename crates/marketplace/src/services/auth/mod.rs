//! Authentication service.
//!
//! Provides password and Google sign-in. An email belongs to exactly one
//! provider: password accounts can't be taken over through Google sign-in and
//! Google-provisioned accounts never have a password to guess.

mod error;
mod google;

pub use error::AuthError;
pub use google::{GoogleOAuth, GoogleProfile};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use townsquare_core::{AuthProvider, Email, UserId, UserKind};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::GoogleAccount` if the email was provisioned via Google.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register_with_password(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        kind: UserKind,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        if let Some(existing) = self.users.get_by_email(&email).await? {
            return Err(registration_conflict(existing.auth_provider));
        }

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_password(&email, first_name, last_name, kind, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::GoogleAccount` if the account has no password
    /// because it was provisioned via Google.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let Some(user) = self.users.get_by_email(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if user.auth_provider == AuthProvider::Google {
            return Err(AuthError::GoogleAccount);
        }

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Sign in with a verified Google profile, provisioning the account on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordAccount` if the email is already
    /// registered with a password; the caller should sign in with that
    /// instead.
    pub async fn login_with_google(
        &self,
        profile: &GoogleProfile,
        kind: UserKind,
    ) -> Result<User, AuthError> {
        let email = Email::parse(&profile.email)?;

        if let Some(existing) = self.users.get_by_email(&email).await? {
            return match google_sign_in_conflict(existing.auth_provider) {
                Some(err) => Err(err),
                None => Ok(existing),
            };
        }

        let user = self
            .users
            .create(
                &email,
                profile.given_name.as_deref().unwrap_or_default(),
                profile.family_name.as_deref().unwrap_or_default(),
                kind,
                AuthProvider::Google,
            )
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent first sign-in; re-read.
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// How a password registration collides with an existing account.
const fn registration_conflict(existing: AuthProvider) -> AuthError {
    match existing {
        AuthProvider::Google => AuthError::GoogleAccount,
        AuthProvider::Password => AuthError::UserAlreadyExists,
    }
}

/// Whether an existing account blocks a Google sign-in. A Google-provisioned
/// account simply signs in again; a password account is refused so it can't
/// be taken over through OAuth.
const fn google_sign_in_conflict(existing: AuthProvider) -> Option<AuthError> {
    match existing {
        AuthProvider::Google => None,
        AuthProvider::Password => Some(AuthError::PasswordAccount),
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_ok() {
        assert!(validate_password("long-enough-password").is_ok());
    }

    #[test]
    fn test_registration_refused_per_existing_provider() {
        assert!(matches!(
            registration_conflict(AuthProvider::Google),
            AuthError::GoogleAccount
        ));
        assert!(matches!(
            registration_conflict(AuthProvider::Password),
            AuthError::UserAlreadyExists
        ));
    }

    #[test]
    fn test_google_sign_in_rejects_password_accounts_only() {
        assert!(google_sign_in_conflict(AuthProvider::Google).is_none());
        assert!(matches!(
            google_sign_in_conflict(AuthProvider::Password),
            Some(AuthError::PasswordAccount)
        ));
    }

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery").expect("hashing failed");
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}

//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use townsquare_core::{AuthProvider, Email, UserId, UserKind};

use super::{RepositoryError, parse_column};
use crate::models::user::{ProfileUpdate, User};

/// Columns selected for every user read.
const USER_COLUMNS: &str = "id, email, first_name, last_name, phone, \
     city_code, city_name, state_code, state_name, address, photo_url, \
     kind, auth_provider, created_at, updated_at";

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    city_code: Option<String>,
    city_name: Option<String>,
    state_code: Option<String>,
    state_name: Option<String>,
    address: Option<String>,
    photo_url: Option<String>,
    kind: String,
    auth_provider: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let kind: UserKind = parse_column(&self.kind, "user kind")?;
        let auth_provider: AuthProvider = parse_column(&self.auth_provider, "auth provider")?;

        Ok(User {
            id: UserId::new(self.id),
            email,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            city_code: self.city_code,
            city_name: self.city_name,
            state_code: self.state_code,
            state_name: self.state_name,
            address: self.address,
            photo_url: self.photo_url,
            kind,
            auth_provider,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create a new user without credentials (OAuth sign-ins).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(
        &self,
        email: &Email,
        first_name: &str,
        last_name: &str,
        kind: UserKind,
        auth_provider: AuthProvider,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (email, first_name, last_name, kind, auth_provider) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(first_name)
        .bind(last_name)
        .bind(kind.to_string())
        .bind(auth_provider.to_string())
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.into_user()
    }

    /// Create a new user with email and password hash.
    ///
    /// The user row and the password row are written in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create_with_password(
        &self,
        email: &Email,
        first_name: &str,
        last_name: &str,
        kind: UserKind,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (email, first_name, last_name, kind, auth_provider) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(first_name)
        .bind(last_name)
        .bind(kind.to_string())
        .bind(AuthProvider::Password.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        let user = row.into_user()?;

        sqlx::query("INSERT INTO user_passwords (user_id, password_hash) VALUES ($1, $2)")
            .bind(user.id.as_i32())
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Get a user's password hash by email.
    ///
    /// Returns `None` if the user doesn't exist or has no password set
    /// (e.g. Google-provisioned accounts).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct HashRow {
            user_id: i32,
            password_hash: String,
        }

        let Some(user) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, HashRow>(
            "SELECT user_id, password_hash FROM user_passwords WHERE user_id = $1",
        )
        .bind(user.id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| {
            debug_assert_eq!(r.user_id, user.id.as_i32());
            (user, r.password_hash)
        }))
    }

    /// Merge profile fields into the user row.
    ///
    /// `None` fields keep their current value, mirroring the original's
    /// write-with-merge semantics.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET \
                first_name = COALESCE($2, first_name), \
                last_name  = COALESCE($3, last_name), \
                phone      = COALESCE($4, phone), \
                city_code  = COALESCE($5, city_code), \
                city_name  = COALESCE($6, city_name), \
                state_code = COALESCE($7, state_code), \
                state_name = COALESCE($8, state_name), \
                address    = COALESCE($9, address), \
                photo_url  = COALESCE($10, photo_url), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(update.first_name.as_deref())
        .bind(update.last_name.as_deref())
        .bind(update.phone.as_deref())
        .bind(update.city_code.as_deref())
        .bind(update.city_name.as_deref())
        .bind(update.state_code.as_deref())
        .bind(update.state_name.as_deref())
        .bind(update.address.as_deref())
        .bind(update.photo_url.as_deref())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => r.into_user(),
            None => Err(RepositoryError::NotFound),
        }
    }
}

/// Map unique-violation database errors onto `Conflict`.
fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("email already exists".to_owned());
    }
    RepositoryError::Database(e)
}

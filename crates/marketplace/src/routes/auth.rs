//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::info;

use townsquare_core::UserKind;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub kind: Option<UserKind>,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Google sign-in request.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    /// OAuth authorization code from the consent redirect.
    pub code: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub kind: Option<UserKind>,
}

/// Signed-in user response.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
}

/// Register a new account with email and password.
///
/// # Errors
///
/// Returns an error if validation fails or the email is taken.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let auth = AuthService::new(state.pool());
    let kind = body.kind.unwrap_or(UserKind::Customer);

    let user = auth
        .register_with_password(
            &body.email,
            &body.first_name,
            &body.last_name,
            kind,
            &body.password,
        )
        .await?;

    sign_in(&session, &user).await?;
    info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(SessionResponse { user })))
}

/// Login with email and password.
///
/// # Errors
///
/// Returns 401 for bad credentials; Google-provisioned accounts are told to
/// use Google sign-in.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login_with_password(&body.email, &body.password).await?;

    sign_in(&session, &user).await?;
    info!(user_id = %user.id, "User logged in");

    Ok(Json(SessionResponse { user }))
}

/// Sign in with Google, provisioning the account on first use.
///
/// # Errors
///
/// Returns 409 if the email is already registered with a password.
pub async fn google_login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<GoogleLoginRequest>,
) -> Result<Json<SessionResponse>> {
    let profile = state
        .google()
        .exchange_code(&body.code, &body.redirect_uri)
        .await?;

    let auth = AuthService::new(state.pool());
    let kind = body.kind.unwrap_or(UserKind::Customer);
    let user = auth.login_with_google(&profile, kind).await?;

    sign_in(&session, &user).await?;
    info!(user_id = %user.id, "User logged in via Google");

    Ok(Json(SessionResponse { user }))
}

/// Logout: clear the session.
///
/// # Errors
///
/// Returns an error if the session cannot be cleared.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// The signed-in user's full profile.
///
/// # Errors
///
/// Returns 401 if nobody is signed in.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<SessionResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.get_user(current.id).await?;

    Ok(Json(SessionResponse { user }))
}

/// Store the session view of `user` and tag Sentry with their identity.
async fn sign_in(session: &Session, user: &User) -> Result<()> {
    let current = CurrentUser::new(
        user.id,
        user.email.clone(),
        user.display_name(),
        user.kind,
    );
    set_current_user(session, &current)
        .await
        .map_err(AppError::Session)?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

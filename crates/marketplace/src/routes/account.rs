//! Account profile route handlers.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
};
use serde::Deserialize;
use tracing::info;

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{ProfileUpdate, User};
use crate::state::AppState;

/// Namespace for profile photo uploads.
const PHOTO_NAMESPACE: &str = "profile-photos";

/// Maximum accepted photo size (5 MiB).
const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Profile update request. Absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub city_code: Option<String>,
    pub city_name: Option<String>,
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub address: Option<String>,
}

/// Get the signed-in user's profile.
///
/// # Errors
///
/// Returns 404 if the account row has been removed.
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<User>> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_string()))?;

    Ok(Json(user))
}

/// Merge profile fields into the signed-in user's row.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    let update = ProfileUpdate {
        first_name: body.first_name,
        last_name: body.last_name,
        phone: body.phone,
        city_code: body.city_code,
        city_name: body.city_name,
        state_code: body.state_code,
        state_name: body.state_name,
        address: body.address,
        photo_url: None,
    };

    let users = UserRepository::new(state.pool());
    let user = users.update_profile(current.id, &update).await?;

    info!(user_id = %current.id, "Profile updated");

    Ok(Json(user))
}

/// Upload a profile photo and set it on the account.
///
/// The raw image is the request body; the stored object's public URL becomes
/// the account's `photo_url`.
///
/// # Errors
///
/// Returns 400 for an empty or oversized body, or an upstream error if the
/// upload fails.
pub async fn upload_photo(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<User>> {
    if body.is_empty() {
        return Err(AppError::BadRequest("empty upload".to_string()));
    }
    if body.len() > MAX_PHOTO_BYTES {
        return Err(AppError::BadRequest("photo too large".to_string()));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_owned();

    let photo_url = state
        .storage()
        .upload(PHOTO_NAMESPACE, &content_type, body.to_vec())
        .await?;

    let update = ProfileUpdate {
        photo_url: Some(photo_url),
        ..ProfileUpdate::default()
    };

    let users = UserRepository::new(state.pool());
    let user = users.update_profile(current.id, &update).await?;

    info!(user_id = %current.id, "Profile photo updated");

    Ok(Json(user))
}

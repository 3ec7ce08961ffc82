//! Review route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use townsquare_core::{Rating, ReviewId, TargetKind};

use crate::db::businesses::BusinessRepository;
use crate::db::catalog::CatalogRepository;
use crate::db::reviews::ReviewRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Review};
use crate::state::AppState;

/// Review creation / edit request.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: i16,
    #[serde(default)]
    pub comment: String,
}

/// Business response request.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub response: String,
}

/// List a target's visible reviews, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn index(
    State(state): State<AppState>,
    Path((kind, item_id)): Path<(TargetKind, i32)>,
) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_target(kind, item_id)
        .await?;

    Ok(Json(reviews))
}

/// Leave a review on a business, product, or service.
///
/// One review per user per target; the target's rating aggregate moves in
/// the same transaction.
///
/// # Errors
///
/// Returns 400 for an out-of-range rating, 404 for a missing target, and
/// 409 if the user already reviewed it.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((kind, item_id)): Path<(TargetKind, i32)>,
    Json(body): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    let rating = parse_rating(body.rating)?;

    let author = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_string()))?;

    let review = ReviewRepository::new(state.pool())
        .create(
            kind,
            item_id,
            user.id,
            &author.display_name(),
            rating,
            body.comment.trim(),
        )
        .await?;

    info!(review_id = %review.id, kind = %kind, item_id, "Review created");

    Ok((StatusCode::CREATED, Json(review)))
}

/// Rewrite the signed-in user's review.
///
/// # Errors
///
/// Returns 404 if the review doesn't exist or isn't the user's.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ReviewId>,
    Json(body): Json<ReviewRequest>,
) -> Result<Json<Review>> {
    let rating = parse_rating(body.rating)?;

    let review = ReviewRepository::new(state.pool())
        .update(id, user.id, rating, body.comment.trim())
        .await?;

    info!(review_id = %id, "Review updated");

    Ok(Json(review))
}

/// Delete the signed-in user's review.
///
/// # Errors
///
/// Returns 404 if the review doesn't exist or isn't the user's.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode> {
    ReviewRepository::new(state.pool()).delete(id, user.id).await?;

    info!(review_id = %id, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Attach the business's reply to a review of it (or of its catalog).
///
/// # Errors
///
/// Returns 403 if the signed-in user doesn't own the reviewed business.
pub async fn respond(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ReviewId>,
    Json(body): Json<RespondRequest>,
) -> Result<Json<Review>> {
    let text = body.response.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("empty response".to_string()));
    }

    let reviews = ReviewRepository::new(state.pool());
    let review = reviews
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("review {id}")))?;

    ensure_owns_target(&state, &user, review.kind, review.item_id).await?;

    let updated = reviews.respond(id, text).await?;

    info!(review_id = %id, "Review response added");

    Ok(Json(updated))
}

fn parse_rating(value: i16) -> Result<Rating> {
    Rating::new(value).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Verify the signed-in user owns the business behind a review target.
async fn ensure_owns_target(
    state: &AppState,
    user: &CurrentUser,
    kind: TargetKind,
    item_id: i32,
) -> Result<()> {
    let businesses = BusinessRepository::new(state.pool());
    let catalog = CatalogRepository::new(state.pool());

    let business_id = match kind {
        TargetKind::Business => item_id.into(),
        TargetKind::Product => {
            catalog
                .get_product(item_id.into())
                .await?
                .ok_or_else(|| AppError::NotFound(format!("product {item_id}")))?
                .business_id
        }
        TargetKind::Service => {
            catalog
                .get_service(item_id.into())
                .await?
                .ok_or_else(|| AppError::NotFound(format!("service {item_id}")))?
                .business_id
        }
    };

    let owned = businesses.get_by_owner_email(&user.email).await?;
    if owned.map(|b| b.id) == Some(business_id) {
        return Ok(());
    }

    Err(AppError::Forbidden(
        "only the reviewed business can respond".to_string(),
    ))
}

//! Favorites route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use townsquare_core::TargetKind;

use crate::db::businesses::BusinessRepository;
use crate::db::catalog::CatalogRepository;
use crate::db::favorites::{FavoriteRepository, FavoriteSnapshot};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Favorite;
use crate::state::AppState;

/// Favorites listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Restrict to one target kind.
    pub kind: Option<TargetKind>,
}

/// List the signed-in user's favorites, optionally for one kind.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Favorite>>> {
    let favorites = FavoriteRepository::new(state.pool())
        .list(user.id, query.kind)
        .await?;

    Ok(Json(favorites))
}

/// Favorite a business, product, or service. Idempotent.
///
/// # Errors
///
/// Returns 404 if the target doesn't exist.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((kind, item_id)): Path<(TargetKind, i32)>,
) -> Result<(StatusCode, Json<Favorite>)> {
    let snapshot = snapshot_target(&state, kind, item_id).await?;

    let favorite = FavoriteRepository::new(state.pool())
        .add(user.id, kind, item_id, &snapshot)
        .await?;

    Ok((StatusCode::CREATED, Json(favorite)))
}

/// Remove a favorite.
///
/// # Errors
///
/// Returns 404 if the favorite doesn't exist.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((kind, item_id)): Path<(TargetKind, i32)>,
) -> Result<StatusCode> {
    let removed = FavoriteRepository::new(state.pool())
        .remove(user.id, kind, item_id)
        .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("favorite {kind} {item_id}")))
    }
}

/// Snapshot the target's display fields at favorite-time.
async fn snapshot_target(
    state: &AppState,
    kind: TargetKind,
    item_id: i32,
) -> Result<FavoriteSnapshot> {
    let missing = || AppError::NotFound(format!("{kind} {item_id}"));

    let snapshot = match kind {
        TargetKind::Business => {
            let business = BusinessRepository::new(state.pool())
                .get_by_id(item_id.into())
                .await?
                .ok_or_else(missing)?;
            FavoriteSnapshot {
                name: business.name,
                image_url: business.logo_url,
                price: None,
            }
        }
        TargetKind::Product => {
            let product = CatalogRepository::new(state.pool())
                .get_product(item_id.into())
                .await?
                .ok_or_else(missing)?;
            FavoriteSnapshot {
                image_url: product.primary_image().map(str::to_owned),
                name: product.name,
                price: Some(product.price),
            }
        }
        TargetKind::Service => {
            let service = CatalogRepository::new(state.pool())
                .get_service(item_id.into())
                .await?
                .ok_or_else(missing)?;
            FavoriteSnapshot {
                name: service.name,
                image_url: None,
                price: Some(service.price),
            }
        }
    };

    Ok(snapshot)
}

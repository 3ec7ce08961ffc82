//! States/cities lookup route handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::error::Result;
use crate::services::geo::{GeoCity, GeoState};
use crate::state::AppState;

/// List the configured country's states.
///
/// # Errors
///
/// Returns 502 if the upstream lookup fails on a cache miss.
pub async fn states(State(state): State<AppState>) -> Result<Json<Vec<GeoState>>> {
    let states = state.geo().states().await?;
    Ok(Json(states.as_ref().clone()))
}

/// List a state's cities.
///
/// # Errors
///
/// Returns 502 if the upstream lookup fails on a cache miss.
pub async fn cities(
    State(state): State<AppState>,
    Path(state_code): Path<String>,
) -> Result<Json<Vec<GeoCity>>> {
    let cities = state.geo().cities(&state_code).await?;
    Ok(Json(cities.as_ref().clone()))
}

//! Service booking route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use townsquare_core::{BookingId, BookingStatus, PaymentMethod, ServiceId};

use crate::db::bookings::BookingRepository;
use crate::db::businesses::BusinessRepository;
use crate::db::catalog::CatalogRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Booking, CurrentUser, NewBooking};
use crate::state::AppState;

/// Booking creation request.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub service_id: ServiceId,
    pub appointment_at: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Status change request.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

/// Booking listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Restrict to one status.
    pub status: Option<BookingStatus>,
}

/// Request an appointment for a service.
///
/// # Errors
///
/// Returns 404 if the service doesn't exist and 409 if it is inactive.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>)> {
    if body.appointment_at <= Utc::now() {
        return Err(AppError::BadRequest(
            "appointment must be in the future".to_string(),
        ));
    }

    let service = CatalogRepository::new(state.pool())
        .get_service(body.service_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("service {}", body.service_id)))?;

    if !service.active {
        return Err(AppError::Conflict("service is not bookable".to_string()));
    }

    let new = NewBooking {
        customer_id: user.id,
        service_id: service.id,
        appointment_at: body.appointment_at,
        note: body.note,
        payment_method: body.payment_method,
    };

    let booking = BookingRepository::new(state.pool())
        .create(&new, &service)
        .await?;

    info!(booking_id = %booking.id, customer_id = %user.id, "Booking requested");

    Ok((StatusCode::CREATED, Json(booking)))
}

/// List the signed-in customer's bookings, newest first, optionally filtered
/// by status.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Booking>>> {
    let bookings = BookingRepository::new(state.pool())
        .list_for_customer(user.id, query.status)
        .await?;

    Ok(Json(bookings))
}

/// List the signed-in owner's business bookings, newest first.
///
/// # Errors
///
/// Returns 403 if the signed-in user owns no business.
pub async fn business_index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Booking>>> {
    let business_id = BusinessRepository::new(state.pool())
        .get_by_owner_email(&user.email)
        .await?
        .map(|b| b.id)
        .ok_or_else(|| AppError::Forbidden("no business for this account".to_string()))?;

    let bookings = BookingRepository::new(state.pool())
        .list_for_business(business_id)
        .await?;

    Ok(Json(bookings))
}

/// Booking detail, visible to its customer and the business it was made with.
///
/// # Errors
///
/// Returns 403 for anyone else.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>> {
    let booking = load_visible(&state, &user, id).await?;
    Ok(Json(booking))
}

/// Change a booking's status.
///
/// The business confirms and completes; the customer may only cancel, and
/// only while the lifecycle still allows it.
///
/// # Errors
///
/// Returns 409 for an illegal transition and 403 for a non-participant.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<BookingId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Booking>> {
    let booking = load_visible(&state, &user, id).await?;

    let is_customer = booking.customer_id == user.id;
    if is_customer && body.status != BookingStatus::Cancelled {
        return Err(AppError::Forbidden(
            "customers can only cancel bookings".to_string(),
        ));
    }

    let updated = BookingRepository::new(state.pool())
        .update_status(booking.id, body.status)
        .await?;

    info!(booking_id = %id, status = %body.status, "Booking status changed");

    Ok(Json(updated))
}

/// Load a booking if the signed-in user may see it.
async fn load_visible(state: &AppState, user: &CurrentUser, id: BookingId) -> Result<Booking> {
    let booking = BookingRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    if booking.customer_id == user.id {
        return Ok(booking);
    }

    let owned = BusinessRepository::new(state.pool())
        .get_by_owner_email(&user.email)
        .await?;
    if owned.map(|b| b.id) == Some(booking.business_id) {
        return Ok(booking);
    }

    Err(AppError::Forbidden("not your booking".to_string()))
}

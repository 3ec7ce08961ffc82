//! Online payment checkout route handlers.
//!
//! The flow: the client asks for a checkout session against an order or
//! booking it owns, pays inside the provider's hosted widget, then posts
//! the signed confirmation back. Nothing is marked paid until the
//! signature verifies against the key secret.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use townsquare_core::{BookingId, OrderId, PaymentMethod, PaymentStatus};

use crate::db::bookings::BookingRepository;
use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// What a payment confirmation settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutTarget {
    Order,
    Booking,
}

/// A checkout session for the provider's hosted widget.
#[derive(Debug, Serialize)]
pub struct CheckoutSession {
    /// Provider order reference.
    pub reference: String,
    /// Public key id for the widget.
    pub key_id: String,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
}

/// Payment confirmation from the widget.
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub target: CheckoutTarget,
    pub reference: String,
    pub payment_id: String,
    pub signature: String,
}

/// Confirmation result.
#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub payment_status: PaymentStatus,
}

/// Open a checkout session for a pickup order.
///
/// # Errors
///
/// Returns 403 if the order isn't the signed-in user's, and 409 if it isn't
/// an unpaid online order.
pub async fn create_order_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<CheckoutSession>> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if order.customer_id != user.id {
        return Err(AppError::Forbidden("not your order".to_string()));
    }
    ensure_payable(order.payment_method, order.payment_status)?;

    let session = open_session(&state, order.total, &format!("order_{id}")).await?;
    orders.set_payment_reference(id, &session.reference).await?;

    info!(order_id = %id, reference = %session.reference, "Checkout session opened");

    Ok(Json(session))
}

/// Open a checkout session for a service booking.
///
/// # Errors
///
/// Returns 403 if the booking isn't the signed-in user's, and 409 if it
/// isn't an unpaid online booking.
pub async fn create_booking_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<BookingId>,
) -> Result<Json<CheckoutSession>> {
    let bookings = BookingRepository::new(state.pool());
    let booking = bookings
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    if booking.customer_id != user.id {
        return Err(AppError::Forbidden("not your booking".to_string()));
    }
    ensure_payable(booking.payment_method, booking.payment_status)?;

    let session = open_session(&state, booking.price, &format!("booking_{id}")).await?;
    bookings.set_payment_reference(id, &session.reference).await?;

    info!(booking_id = %id, reference = %session.reference, "Checkout session opened");

    Ok(Json(session))
}

/// Verify a payment confirmation and mark the target paid.
///
/// # Errors
///
/// Returns 400 if the signature doesn't verify; nothing is marked paid in
/// that case.
pub async fn confirm(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>> {
    state
        .checkout()
        .verify_signature(&body.reference, &body.payment_id, &body.signature)?;

    // Ownership is checked against the stored row before anything is
    // marked paid, so a foreign reference settles nothing.
    let payment_status = match body.target {
        CheckoutTarget::Order => {
            let orders = OrderRepository::new(state.pool());
            let order = orders
                .get_by_payment_reference(&body.reference)
                .await?
                .ok_or_else(|| AppError::NotFound("unknown payment reference".to_string()))?;
            ensure_owner(&user, order.customer_id)?;
            orders
                .mark_paid_by_reference(&body.reference)
                .await?
                .payment_status
        }
        CheckoutTarget::Booking => {
            let bookings = BookingRepository::new(state.pool());
            let booking = bookings
                .get_by_payment_reference(&body.reference)
                .await?
                .ok_or_else(|| AppError::NotFound("unknown payment reference".to_string()))?;
            ensure_owner(&user, booking.customer_id)?;
            bookings
                .mark_paid_by_reference(&body.reference)
                .await?
                .payment_status
        }
    };

    info!(reference = %body.reference, "Payment confirmed");

    Ok(Json(ConfirmResponse { payment_status }))
}

/// Create the provider order backing a session.
async fn open_session(
    state: &AppState,
    amount: Decimal,
    receipt: &str,
) -> Result<CheckoutSession> {
    let provider_order = state.checkout().create_order(amount, receipt).await?;

    Ok(CheckoutSession {
        reference: provider_order.id,
        key_id: state.checkout().key_id().to_owned(),
        amount: provider_order.amount,
        currency: provider_order.currency,
    })
}

fn ensure_payable(method: PaymentMethod, status: PaymentStatus) -> Result<()> {
    if method != PaymentMethod::Online {
        return Err(AppError::Conflict(
            "not an online payment".to_string(),
        ));
    }
    if status == PaymentStatus::Paid {
        return Err(AppError::Conflict("already paid".to_string()));
    }
    Ok(())
}

fn ensure_owner(user: &CurrentUser, customer_id: townsquare_core::UserId) -> Result<()> {
    if customer_id == user.id {
        Ok(())
    } else {
        Err(AppError::Forbidden("not your payment".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use townsquare_core::{Email, UserId, UserKind};

    fn user(id: i32) -> CurrentUser {
        CurrentUser::new(
            UserId::new(id),
            Email::parse("payer@mail.com").unwrap(),
            "Payer".to_string(),
            UserKind::Customer,
        )
    }

    #[test]
    fn test_ensure_owner_accepts_the_paying_customer() {
        assert!(ensure_owner(&user(7), UserId::new(7)).is_ok());
    }

    #[test]
    fn test_ensure_owner_forbids_another_customers_payment() {
        // A valid signature for somebody else's reference must stop here,
        // before any row is touched.
        assert!(matches!(
            ensure_owner(&user(7), UserId::new(8)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_ensure_payable_requires_an_unpaid_online_payment() {
        assert!(ensure_payable(PaymentMethod::Online, PaymentStatus::Pending).is_ok());
        assert!(matches!(
            ensure_payable(PaymentMethod::PayAtPickup, PaymentStatus::Pending),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            ensure_payable(PaymentMethod::Online, PaymentStatus::Paid),
            Err(AppError::Conflict(_))
        ));
    }
}

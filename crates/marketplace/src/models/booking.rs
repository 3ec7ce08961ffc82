//! Service booking domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use townsquare_core::{
    BookingId, BookingStatus, BusinessId, PaymentMethod, PaymentStatus, ServiceId, UserId,
};

/// A scheduled service appointment.
///
/// Service fields are a snapshot taken at booking-time.
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: BookingId,
    pub customer_id: UserId,
    pub business_id: BusinessId,
    pub service_id: ServiceId,
    pub service_name: String,
    pub price: Decimal,
    pub duration_minutes: i32,
    pub appointment_at: DateTime<Utc>,
    pub note: Option<String>,
    pub status: BookingStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// Checkout provider order reference, set for online payments.
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_id: UserId,
    pub service_id: ServiceId,
    pub appointment_at: DateTime<Utc>,
    pub note: Option<String>,
    pub payment_method: PaymentMethod,
}

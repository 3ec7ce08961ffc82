//! Service booking repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use townsquare_core::{
    BookingId, BookingStatus, BusinessId, PaymentMethod, PaymentStatus, ServiceId, UserId,
};

use super::{RepositoryError, parse_column};
use crate::models::booking::{Booking, NewBooking};
use crate::models::catalog::Service;

const BOOKING_COLUMNS: &str = "id, customer_id, business_id, service_id, service_name, \
     price, duration_minutes, appointment_at, note, status, payment_method, \
     payment_status, payment_reference, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: i32,
    customer_id: i32,
    business_id: i32,
    service_id: i32,
    service_name: String,
    price: Decimal,
    duration_minutes: i32,
    appointment_at: DateTime<Utc>,
    note: Option<String>,
    status: String,
    payment_method: String,
    payment_status: String,
    payment_reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, RepositoryError> {
        let status: BookingStatus = parse_column(&self.status, "booking status")?;
        let payment_method: PaymentMethod = parse_column(&self.payment_method, "payment method")?;
        let payment_status: PaymentStatus = parse_column(&self.payment_status, "payment status")?;

        Ok(Booking {
            id: BookingId::new(self.id),
            customer_id: UserId::new(self.customer_id),
            business_id: BusinessId::new(self.business_id),
            service_id: ServiceId::new(self.service_id),
            service_name: self.service_name,
            price: self.price,
            duration_minutes: self.duration_minutes,
            appointment_at: self.appointment_at,
            note: self.note,
            status,
            payment_method,
            payment_status,
            payment_reference: self.payment_reference,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for service bookings.
pub struct BookingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookingRepository<'a> {
    /// Create a new booking repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a booking, snapshotting the service at booking-time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        new: &NewBooking,
        service: &Service,
    ) -> Result<Booking, RepositoryError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "INSERT INTO bookings (customer_id, business_id, service_id, service_name, \
                price, duration_minutes, appointment_at, note, payment_method) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(new.customer_id.as_i32())
        .bind(service.business_id.as_i32())
        .bind(service.id.as_i32())
        .bind(&service.name)
        .bind(service.price)
        .bind(service.duration_minutes)
        .bind(new.appointment_at)
        .bind(new.note.as_deref())
        .bind(new.payment_method.to_string())
        .fetch_one(self.pool)
        .await?;

        row.into_booking()
    }

    /// Get a booking by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(BookingRow::into_booking).transpose()
    }

    /// Get the booking carrying a checkout provider reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_payment_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Booking>, RepositoryError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE payment_reference = $1"
        ))
        .bind(reference)
        .fetch_optional(self.pool)
        .await?;

        row.map(BookingRow::into_booking).transpose()
    }

    /// List a customer's bookings, newest first, optionally in one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: UserId,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE customer_id = $1 AND ($2::TEXT IS NULL OR status = $2) \
             ORDER BY created_at DESC"
        ))
        .bind(customer_id.as_i32())
        .bind(status.map(|s| s.to_string()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    /// List a business's bookings, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_business(
        &self,
        business_id: BusinessId,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE business_id = $1 ORDER BY created_at DESC"
        ))
        .bind(business_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    /// Move a booking to `next`, enforcing the status lifecycle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the booking doesn't exist, or
    /// `RepositoryError::Conflict` if the transition isn't allowed.
    pub async fn update_status(
        &self,
        id: BookingId,
        next: BookingStatus,
    ) -> Result<Booking, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(String,)> =
            sqlx::query_as("SELECT status FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;

        let Some((raw,)) = current else {
            return Err(RepositoryError::NotFound);
        };
        let status: BookingStatus = parse_column(&raw, "booking status")?;

        if !status.can_transition(next) {
            return Err(RepositoryError::Conflict(format!(
                "booking cannot move from {status} to {next}"
            )));
        }

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(next.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.into_booking()
    }

    /// Attach a checkout provider reference to a booking awaiting payment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the booking doesn't exist.
    pub async fn set_payment_reference(
        &self,
        id: BookingId,
        reference: &str,
    ) -> Result<Booking, RepositoryError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET payment_reference = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(reference)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => r.into_booking(),
            None => Err(RepositoryError::NotFound),
        }
    }

    /// Mark the booking with `reference` as paid, confirming it if it was
    /// still requested.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no booking carries the
    /// reference.
    pub async fn mark_paid_by_reference(
        &self,
        reference: &str,
    ) -> Result<Booking, RepositoryError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET payment_status = $2, \
                status = CASE WHEN status = $3 THEN $4 ELSE status END, \
                updated_at = NOW() \
             WHERE payment_reference = $1 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(reference)
        .bind(PaymentStatus::Paid.to_string())
        .bind(BookingStatus::Requested.to_string())
        .bind(BookingStatus::Confirmed.to_string())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => r.into_booking(),
            None => Err(RepositoryError::NotFound),
        }
    }
}

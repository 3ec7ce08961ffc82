//! Pickup order repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use townsquare_core::{
    BusinessId, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId,
};

use super::{RepositoryError, parse_column};
use crate::models::catalog::Product;
use crate::models::order::{NewOrder, Order};

const ORDER_COLUMNS: &str = "id, customer_id, business_id, product_id, product_name, \
     image_url, unit_price, quantity, total, pickup_at, status, payment_method, \
     payment_status, payment_reference, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_id: i32,
    business_id: i32,
    product_id: i32,
    product_name: String,
    image_url: Option<String>,
    unit_price: Decimal,
    quantity: i32,
    total: Decimal,
    pickup_at: DateTime<Utc>,
    status: String,
    payment_method: String,
    payment_status: String,
    payment_reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let status: OrderStatus = parse_column(&self.status, "order status")?;
        let payment_method: PaymentMethod = parse_column(&self.payment_method, "payment method")?;
        let payment_status: PaymentStatus = parse_column(&self.payment_status, "payment status")?;

        Ok(Order {
            id: OrderId::new(self.id),
            customer_id: UserId::new(self.customer_id),
            business_id: BusinessId::new(self.business_id),
            product_id: ProductId::new(self.product_id),
            product_name: self.product_name,
            image_url: self.image_url,
            unit_price: self.unit_price,
            quantity: self.quantity,
            total: self.total,
            pickup_at: self.pickup_at,
            status,
            payment_method,
            payment_status,
            payment_reference: self.payment_reference,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for pickup orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order, snapshotting the product at order-time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        new: &NewOrder,
        product: &Product,
    ) -> Result<Order, RepositoryError> {
        let total = product.price * Decimal::from(new.quantity);

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (customer_id, business_id, product_id, product_name, \
                image_url, unit_price, quantity, total, pickup_at, payment_method) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new.customer_id.as_i32())
        .bind(product.business_id.as_i32())
        .bind(product.id.as_i32())
        .bind(&product.name)
        .bind(product.primary_image())
        .bind(product.price)
        .bind(new.quantity)
        .bind(total)
        .bind(new.pickup_at)
        .bind(new.payment_method.to_string())
        .fetch_one(self.pool)
        .await?;

        row.into_order()
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Get the order carrying a checkout provider reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_payment_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE payment_reference = $1"
        ))
        .bind(reference)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// List a customer's orders, newest first, optionally in one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: UserId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE customer_id = $1 AND ($2::TEXT IS NULL OR status = $2) \
             ORDER BY created_at DESC"
        ))
        .bind(customer_id.as_i32())
        .bind(status.map(|s| s.to_string()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// List a business's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_business(
        &self,
        business_id: BusinessId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE business_id = $1 ORDER BY created_at DESC"
        ))
        .bind(business_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Move an order to `next`, enforcing the status lifecycle.
    ///
    /// The row is locked for the duration of the check so concurrent updates
    /// serialize.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist, or
    /// `RepositoryError::Conflict` if the transition isn't allowed.
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(String,)> =
            sqlx::query_as("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;

        let Some((raw,)) = current else {
            return Err(RepositoryError::NotFound);
        };
        let status: OrderStatus = parse_column(&raw, "order status")?;

        if !status.can_transition(next) {
            return Err(RepositoryError::Conflict(format!(
                "order cannot move from {status} to {next}"
            )));
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(next.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.into_order()
    }

    /// Attach a checkout provider reference to an order awaiting payment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_payment_reference(
        &self,
        id: OrderId,
        reference: &str,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET payment_reference = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(reference)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => r.into_order(),
            None => Err(RepositoryError::NotFound),
        }
    }

    /// Mark the order with `reference` as paid, confirming it if it was
    /// still pending.
    ///
    /// Called after signature verification passes; idempotent for repeated
    /// confirmations of the same reference. Payment and confirmation land in
    /// the same statement so one cannot be observed without the other.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order carries the reference.
    pub async fn mark_paid_by_reference(
        &self,
        reference: &str,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET payment_status = $2, \
                status = CASE WHEN status = $3 THEN $4 ELSE status END, \
                updated_at = NOW() \
             WHERE payment_reference = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(reference)
        .bind(PaymentStatus::Paid.to_string())
        .bind(OrderStatus::Pending.to_string())
        .bind(OrderStatus::Confirmed.to_string())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => r.into_order(),
            None => Err(RepositoryError::NotFound),
        }
    }
}

//! Pickup order domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use townsquare_core::{
    BusinessId, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId,
};

/// A pickup order.
///
/// Product fields are a snapshot taken at order-time; later catalog edits do
/// not rewrite history.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: UserId,
    pub business_id: BusinessId,
    pub product_id: ProductId,
    pub product_name: String,
    pub image_url: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub total: Decimal,
    /// When the customer collects the order.
    pub pickup_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// Checkout provider order reference, set for online payments.
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub pickup_at: DateTime<Utc>,
    pub payment_method: PaymentMethod,
}

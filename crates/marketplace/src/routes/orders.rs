//! Pickup order route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use townsquare_core::{OrderId, OrderStatus, PaymentMethod, ProductId};

use crate::db::businesses::BusinessRepository;
use crate::db::catalog::CatalogRepository;
use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, NewOrder, Order};
use crate::state::AppState;

/// Order creation request.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: ProductId,
    pub quantity: i32,
    pub pickup_at: DateTime<Utc>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Status change request.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Order listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Restrict to one status.
    pub status: Option<OrderStatus>,
}

/// Place an order for pickup.
///
/// # Errors
///
/// Returns 404 if the product doesn't exist and 409 if it is out of stock.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    if body.quantity < 1 {
        return Err(AppError::BadRequest("quantity must be positive".to_string()));
    }

    let product = CatalogRepository::new(state.pool())
        .get_product(body.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", body.product_id)))?;

    if !product.in_stock {
        return Err(AppError::Conflict("product is out of stock".to_string()));
    }

    let new = NewOrder {
        customer_id: user.id,
        product_id: product.id,
        quantity: body.quantity,
        pickup_at: body.pickup_at,
        payment_method: body.payment_method,
    };

    let order = OrderRepository::new(state.pool())
        .create(&new, &product)
        .await?;

    info!(order_id = %order.id, customer_id = %user.id, "Order placed");

    Ok((StatusCode::CREATED, Json(order)))
}

/// List the signed-in customer's orders, newest first, optionally filtered
/// by status.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(user.id, query.status)
        .await?;

    Ok(Json(orders))
}

/// List the signed-in owner's business orders, newest first.
///
/// # Errors
///
/// Returns 403 if the signed-in user owns no business.
pub async fn business_index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let business_id = require_owned_business(&state, &user).await?;

    let orders = OrderRepository::new(state.pool())
        .list_for_business(business_id)
        .await?;

    Ok(Json(orders))
}

/// Order detail, visible to its customer and the business it was placed with.
///
/// # Errors
///
/// Returns 403 for anyone else.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = load_visible(&state, &user, id).await?;
    Ok(Json(order))
}

/// Change an order's status.
///
/// The business drives the lifecycle; the customer may only cancel, and only
/// while the lifecycle still allows it.
///
/// # Errors
///
/// Returns 409 for an illegal transition and 403 for a non-participant.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let order = load_visible(&state, &user, id).await?;

    let is_customer = order.customer_id == user.id;
    if is_customer && body.status != OrderStatus::Cancelled {
        return Err(AppError::Forbidden(
            "customers can only cancel orders".to_string(),
        ));
    }

    let updated = OrderRepository::new(state.pool())
        .update_status(order.id, body.status)
        .await?;

    info!(order_id = %id, status = %body.status, "Order status changed");

    Ok(Json(updated))
}

/// Load an order if the signed-in user may see it.
async fn load_visible(state: &AppState, user: &CurrentUser, id: OrderId) -> Result<Order> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if order.customer_id == user.id {
        return Ok(order);
    }

    let owned = BusinessRepository::new(state.pool())
        .get_by_owner_email(&user.email)
        .await?;
    if owned.map(|b| b.id) == Some(order.business_id) {
        return Ok(order);
    }

    Err(AppError::Forbidden("not your order".to_string()))
}

/// The business the signed-in user owns, or 403.
async fn require_owned_business(
    state: &AppState,
    user: &CurrentUser,
) -> Result<townsquare_core::BusinessId> {
    BusinessRepository::new(state.pool())
        .get_by_owner_email(&user.email)
        .await?
        .map(|b| b.id)
        .ok_or_else(|| AppError::Forbidden("no business for this account".to_string()))
}

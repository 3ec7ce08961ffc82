//! HTTP route handlers for the marketplace.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (database ping)
//!
//! # Auth
//! POST /api/auth/register              - Register with email/password
//! POST /api/auth/login                 - Login with email/password
//! POST /api/auth/google                - Sign in with a Google OAuth code
//! POST /api/auth/logout                - Clear the session
//! GET  /api/auth/me                    - Signed-in user's profile
//!
//! # Account (requires auth)
//! GET   /api/account                   - Full profile
//! PATCH /api/account                   - Merge profile fields
//! POST  /api/account/photo             - Upload profile photo
//!
//! # Businesses & catalog
//! GET  /api/businesses                 - List (?type=&city=&q=&limit=&offset=)
//! GET  /api/businesses/{id}            - Detail
//! GET  /api/businesses/{id}/products   - Product list
//! GET  /api/businesses/{id}/services   - Service list
//! GET  /api/products/{id}              - Product detail
//! GET  /api/services/{id}              - Service detail
//!
//! # Favorites (requires auth)
//! GET    /api/favorites                - List (?kind=)
//! PUT    /api/favorites/{kind}/{id}    - Add (idempotent)
//! DELETE /api/favorites/{kind}/{id}    - Remove
//!
//! # Conversations (requires auth; clients poll with ?after=)
//! GET  /api/conversations                    - Thread list
//! POST /api/conversations                    - Open thread with a business
//! GET  /api/conversations/{id}/messages      - Messages (?after=<message id>)
//! POST /api/conversations/{id}/messages      - Send message
//! POST /api/conversations/{id}/read          - Mark read
//!
//! # Orders (requires auth)
//! POST /api/orders                     - Place a pickup order
//! GET  /api/orders                     - Customer's orders (?status=)
//! GET  /api/orders/{id}                - Detail
//! POST /api/orders/{id}/status         - Change status
//! GET  /api/business/orders            - Owner's incoming orders
//!
//! # Bookings (requires auth)
//! POST /api/bookings                   - Request an appointment
//! GET  /api/bookings                   - Customer's bookings (?status=)
//! GET  /api/bookings/{id}              - Detail
//! POST /api/bookings/{id}/status       - Change status
//! GET  /api/business/bookings          - Owner's incoming bookings
//!
//! # Checkout (requires auth)
//! POST /api/checkout/orders/{id}       - Open a checkout session
//! POST /api/checkout/bookings/{id}     - Open a checkout session
//! POST /api/checkout/confirm           - Verify + settle a confirmation
//!
//! # Reviews
//! GET    /api/reviews/{kind}/{item_id} - List a target's reviews
//! POST   /api/reviews/{kind}/{item_id} - Leave a review (auth)
//! PATCH  /api/reviews/{id}             - Edit own review (auth)
//! DELETE /api/reviews/{id}             - Delete own review (auth)
//! POST   /api/reviews/{id}/response    - Business reply (auth)
//!
//! # Geo
//! GET  /api/geo/states                 - State list
//! GET  /api/geo/states/{code}/cities   - City list
//! ```

pub mod account;
pub mod auth;
pub mod bookings;
pub mod businesses;
pub mod checkout;
pub mod conversations;
pub mod favorites;
pub mod geo;
pub mod orders;
pub mod reviews;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/google", post(auth::google_login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::profile).patch(account::update_profile))
        .route("/photo", post(account::upload_photo))
}

/// Create the business browsing routes router.
pub fn business_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(businesses::index))
        .route("/{id}", get(businesses::show))
        .route("/{id}/products", get(businesses::products))
        .route("/{id}/services", get(businesses::services))
}

/// Create the favorites routes router.
pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index))
        .route(
            "/{kind}/{item_id}",
            put(favorites::add).delete(favorites::remove),
        )
}

/// Create the conversation routes router.
pub fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(conversations::index).post(conversations::start))
        .route(
            "/{id}/messages",
            get(conversations::messages).post(conversations::send),
        )
        .route("/{id}/read", post(conversations::mark_read))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
}

/// Create the booking routes router.
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(bookings::index).post(bookings::create))
        .route("/{id}", get(bookings::show))
        .route("/{id}/status", post(bookings::update_status))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/{id}", post(checkout::create_order_session))
        .route("/bookings/{id}", post(checkout::create_booking_session))
        .route("/confirm", post(checkout::confirm))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{kind}/{item_id}",
            get(reviews::index).post(reviews::create),
        )
        .route("/{id}", patch(reviews::update).delete(reviews::remove))
        .route("/{id}/response", post(reviews::respond))
}

/// Create the geo lookup routes router.
pub fn geo_routes() -> Router<AppState> {
    Router::new()
        .route("/states", get(geo::states))
        .route("/states/{code}/cities", get(geo::cities))
}

/// Liveness check.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Readiness check: verifies the database answers.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "unavailable"})),
            )
        }
    }
}

/// Create all routes for the marketplace.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .nest("/api/auth", auth_routes())
        .nest("/api/account", account_routes())
        .nest("/api/businesses", business_routes())
        .route("/api/products/{id}", get(businesses::product))
        .route("/api/services/{id}", get(businesses::service))
        .nest("/api/favorites", favorite_routes())
        .nest("/api/conversations", conversation_routes())
        .nest("/api/orders", order_routes())
        .route("/api/business/orders", get(orders::business_index))
        .nest("/api/bookings", booking_routes())
        .route("/api/business/bookings", get(bookings::business_index))
        .nest("/api/checkout", checkout_routes())
        .nest("/api/reviews", review_routes())
        .nest("/api/geo", geo_routes())
}

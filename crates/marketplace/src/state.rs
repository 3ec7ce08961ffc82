//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::MarketplaceConfig;
use crate::services::auth::GoogleOAuth;
use crate::services::geo::GeoClient;
use crate::services::payments::CheckoutClient;
use crate::services::storage::StorageClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MarketplaceConfig,
    pool: PgPool,
    google: GoogleOAuth,
    checkout: CheckoutClient,
    geo: GeoClient,
    storage: StorageClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: MarketplaceConfig, pool: PgPool) -> Self {
        let google = GoogleOAuth::new(&config.google);
        let checkout = CheckoutClient::new(&config.payments);
        let geo = GeoClient::new(&config.geo);
        let storage = StorageClient::new(&config.storage);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                google,
                checkout,
                geo,
                storage,
            }),
        }
    }

    /// Get a reference to the marketplace configuration.
    #[must_use]
    pub fn config(&self) -> &MarketplaceConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Google OAuth client.
    #[must_use]
    pub fn google(&self) -> &GoogleOAuth {
        &self.inner.google
    }

    /// Get a reference to the checkout provider client.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutClient {
        &self.inner.checkout
    }

    /// Get a reference to the geographic lookup client.
    #[must_use]
    pub fn geo(&self) -> &GeoClient {
        &self.inner.geo
    }

    /// Get a reference to the object storage client.
    #[must_use]
    pub fn storage(&self) -> &StorageClient {
        &self.inner.storage
    }
}

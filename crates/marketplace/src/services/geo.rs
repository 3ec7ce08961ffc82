//! States and cities lookup client.
//!
//! Wraps the external geographic API behind a TTL cache; state and city
//! lists change rarely and the upstream is rate-limited.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::GeoConfig;

/// Cache TTL for lookups.
const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Maximum cached lookups (one entry per state list or city list).
const CACHE_CAPACITY: u64 = 256;

/// Errors from the geographic lookup client.
#[derive(Debug, Error)]
pub enum GeoError {
    /// HTTP request failed.
    #[error("Geo request failed: {0}")]
    Request(String),

    /// Response could not be parsed.
    #[error("Geo response invalid: {0}")]
    Response(String),

    /// Upstream returned an error status.
    #[error("Geo API error: {0}")]
    Api(String),
}

/// A state or province.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoState {
    pub name: String,
    pub iso2: String,
}

/// A city within a state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoCity {
    pub id: i64,
    pub name: String,
}

/// Cached client for the states/cities API.
#[derive(Clone)]
pub struct GeoClient {
    client: Client,
    api_base: String,
    api_key: SecretString,
    country: String,
    states: Cache<String, Arc<Vec<GeoState>>>,
    cities: Cache<String, Arc<Vec<GeoCity>>>,
}

impl std::fmt::Debug for GeoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoClient")
            .field("api_base", &self.api_base)
            .field("api_key", &"[REDACTED]")
            .field("country", &self.country)
            .finish_non_exhaustive()
    }
}

impl GeoClient {
    /// Create a new geo client.
    #[must_use]
    pub fn new(config: &GeoConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            country: config.country.clone(),
            states: cache(),
            cities: cache(),
        }
    }

    /// List the configured country's states.
    ///
    /// # Errors
    ///
    /// Returns `GeoError` if the upstream request fails on a cache miss.
    #[instrument(skip(self))]
    pub async fn states(&self) -> Result<Arc<Vec<GeoState>>, GeoError> {
        let key = self.country.clone();
        if let Some(cached) = self.states.get(&key).await {
            return Ok(cached);
        }

        let url = format!("{}/countries/{}/states", self.api_base, self.country);
        let fetched: Arc<Vec<GeoState>> = Arc::new(self.fetch(&url).await?);

        debug!(count = fetched.len(), "State list fetched");
        self.states.insert(key, Arc::clone(&fetched)).await;

        Ok(fetched)
    }

    /// List the cities of a state, by its ISO2 code.
    ///
    /// # Errors
    ///
    /// Returns `GeoError` if the upstream request fails on a cache miss.
    #[instrument(skip(self))]
    pub async fn cities(&self, state_code: &str) -> Result<Arc<Vec<GeoCity>>, GeoError> {
        let key = format!("{}/{state_code}", self.country);
        if let Some(cached) = self.cities.get(&key).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/countries/{}/states/{state_code}/cities",
            self.api_base, self.country
        );
        let fetched: Arc<Vec<GeoCity>> = Arc::new(self.fetch(&url).await?);

        debug!(state = state_code, count = fetched.len(), "City list fetched");
        self.cities.insert(key, Arc::clone(&fetched)).await;

        Ok(fetched)
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, GeoError> {
        let response = self
            .client
            .get(url)
            .header("X-CSCAPI-KEY", self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| GeoError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(GeoError::Api(format!("lookup returned {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| GeoError::Response(e.to_string()))
    }
}

fn cache<V: Clone + Send + Sync + 'static>() -> Cache<String, V> {
    Cache::builder()
        .max_capacity(CACHE_CAPACITY)
        .time_to_live(CACHE_TTL)
        .build()
}

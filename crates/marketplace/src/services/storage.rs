//! Object storage client for user-uploaded images.
//!
//! Uploads land under a per-feature namespace with a generated key, so a
//! re-upload never clobbers an existing object.

use chrono::Utc;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::StorageConfig;

/// Errors from the object storage client.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("Storage request failed: {0}")]
    Request(String),

    /// Store returned an error status.
    #[error("Storage API error: {0}")]
    Api(String),
}

/// Object storage API client.
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    api_base: String,
    public_base: String,
    api_key: SecretString,
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("api_base", &self.api_base)
            .field("public_base", &self.public_base)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl StorageClient {
    /// Create a new storage client.
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.clone(),
            public_base: config.public_base.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Upload `bytes` under `namespace` and return the object's public URL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the upload fails.
    #[instrument(skip(self, bytes), fields(namespace = %namespace, size = bytes.len()))]
    pub async fn upload(
        &self,
        namespace: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let key = object_key(namespace);

        let response = self
            .client
            .put(format!("{}/{key}", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(StorageError::Api(format!("upload returned {status}")));
        }

        let url = format!("{}/{key}", self.public_base);
        debug!(key = %key, "Object uploaded");

        Ok(url)
    }
}

/// Build a collision-free object key: `{namespace}/{uuid}_{unix_seconds}`.
fn object_key(namespace: &str) -> String {
    format!("{namespace}/{}_{}", Uuid::new_v4(), Utc::now().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_shape() {
        let key = object_key("avatars");
        assert!(key.starts_with("avatars/"));
        let rest = key.trim_start_matches("avatars/");
        let (id, ts) = rest.split_once('_').expect("separator present");
        assert!(Uuid::parse_str(id).is_ok());
        assert!(ts.parse::<i64>().is_ok());
    }

    #[test]
    fn test_object_keys_unique() {
        assert_ne!(object_key("avatars"), object_key("avatars"));
    }
}

//! Integration tests for Townsquare.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! docker compose up -d db
//! cargo run -p townsquare-cli -- migrate
//!
//! # Start the marketplace server
//! cargo run -p townsquare-marketplace
//!
//! # Run integration tests (all are #[ignore]d by default)
//! cargo test -p townsquare-integration-tests -- --ignored
//! ```
//!
//! Tests talk to a running server over HTTP and register throwaway accounts
//! under unique `@integration.test` addresses, so they can run repeatedly
//! against the same database.

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// A test harness holding an HTTP client with a cookie jar.
///
/// Each context is one browser-like session: registering or logging in
/// stores the session cookie, and later requests ride on it.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Create a context pointed at the server under test.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be constructed.
    #[must_use]
    pub fn new() -> Self {
        let base_url = std::env::var("MARKETPLACE_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, base_url }
    }

    /// Register a fresh customer account and keep its session.
    ///
    /// Returns the generated email address.
    ///
    /// # Panics
    ///
    /// Panics if registration does not succeed.
    pub async fn register_customer(&self) -> String {
        let email = unique_email();
        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "email": email,
                "password": "integration-pass-1",
                "first_name": "Test",
                "last_name": "Customer",
            }))
            .send()
            .await
            .expect("Failed to register");

        assert_eq!(resp.status(), 201, "registration failed for {email}");
        email
    }

    /// GET a path and parse the JSON body.
    ///
    /// # Panics
    ///
    /// Panics on transport errors or a non-JSON body.
    pub async fn get_json(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("request failed");
        let status = resp.status();
        let body = resp.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    /// Build a full URL from a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a unique email for a throwaway test account.
#[must_use]
pub fn unique_email() -> String {
    format!("user-{}@integration.test", Uuid::new_v4().simple())
}

//! Hosted checkout provider client.
//!
//! Creates provider-side orders for online payments and verifies the signed
//! confirmation the checkout widget hands back. Confirmations are trusted
//! only after the HMAC check passes; there is no environment-based bypass.

use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::PaymentsConfig;

/// Errors from the checkout provider client.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("Payment request failed: {0}")]
    Request(String),

    /// Response could not be parsed.
    #[error("Payment response invalid: {0}")]
    Response(String),

    /// Provider returned an error status.
    #[error("Payment API error: {0}")]
    Api(String),

    /// Confirmation signature did not verify.
    #[error("Invalid payment signature: {0}")]
    InvalidSignature(String),

    /// Amount can't be expressed in minor units.
    #[error("Payment amount out of range")]
    AmountOutOfRange,
}

/// A provider-side checkout order.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutOrder {
    /// Provider order reference, stored as `payment_reference`.
    pub id: String,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
}

/// Checkout provider API client.
#[derive(Clone)]
pub struct CheckoutClient {
    client: Client,
    key_id: String,
    key_secret: SecretString,
    api_base: String,
    currency: String,
}

impl std::fmt::Debug for CheckoutClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutClient")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl CheckoutClient {
    /// Create a new checkout client.
    #[must_use]
    pub fn new(config: &PaymentsConfig) -> Self {
        Self {
            client: Client::new(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            api_base: config.api_base.clone(),
            currency: config.currency.clone(),
        }
    }

    /// The public key id the checkout widget needs.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create a provider order for `amount`.
    ///
    /// `receipt` is an opaque tag tying the provider order back to ours.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::AmountOutOfRange` if the amount doesn't convert
    /// to whole minor units, or a request/response error from the provider.
    #[instrument(skip(self), fields(receipt = %receipt))]
    pub async fn create_order(
        &self,
        amount: Decimal,
        receipt: &str,
    ) -> Result<CheckoutOrder, PaymentError> {
        let minor = minor_units(amount).ok_or(PaymentError::AmountOutOfRange)?;

        let body = serde_json::json!({
            "amount": minor,
            "currency": self.currency,
            "receipt": receipt,
        });

        let response = self
            .client
            .post(format!("{}/orders", self.api_base))
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api(format!(
                "order creation returned {status}: {text}"
            )));
        }

        let order: CheckoutOrder = response
            .json()
            .await
            .map_err(|e| PaymentError::Response(e.to_string()))?;

        debug!(reference = %order.id, amount = order.amount, "Checkout order created");

        Ok(order)
    }

    /// Verify a payment confirmation signature.
    ///
    /// The provider signs `"{order_reference}|{payment_id}"` with the key
    /// secret; the hex digest must match `signature` exactly.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidSignature` if the signature doesn't
    /// verify.
    #[instrument(skip(self, signature), fields(reference = %order_reference))]
    pub fn verify_signature(
        &self,
        order_reference: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<(), PaymentError> {
        let payload = format!("{order_reference}|{payment_id}");

        let mut mac = Hmac::<Sha256>::new_from_slice(self.key_secret.expose_secret().as_bytes())
            .map_err(|e| PaymentError::InvalidSignature(e.to_string()))?;
        mac.update(payload.as_bytes());

        let expected = hex::encode(mac.finalize().into_bytes());

        if !constant_time_compare(&expected, signature) {
            return Err(PaymentError::InvalidSignature(
                "signature mismatch".to_string(),
            ));
        }

        debug!("Payment signature verified");

        Ok(())
    }
}

/// Convert a decimal amount to whole minor units (e.g. rupees to paise).
///
/// Returns `None` for amounts with sub-minor-unit precision or outside i64.
fn minor_units(amount: Decimal) -> Option<i64> {
    let scaled = amount.checked_mul(Decimal::from(100))?;
    if scaled.fract() != Decimal::ZERO {
        return None;
    }
    scaled.to_i64()
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> CheckoutClient {
        CheckoutClient {
            client: Client::new(),
            key_id: "key_test_id".to_string(),
            key_secret: SecretString::from("test-key-secret".to_string()),
            api_base: "https://provider.test/v1".to_string(),
            currency: "INR".to_string(),
        }
    }

    fn sign(secret: &str, reference: &str, payment_id: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("valid key length");
        mac.update(format!("{reference}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_signature_verification_valid() {
        let client = test_client();
        let signature = sign("test-key-secret", "order_123", "pay_456");

        assert!(
            client
                .verify_signature("order_123", "pay_456", &signature)
                .is_ok()
        );
    }

    #[test]
    fn test_signature_verification_wrong_secret() {
        let client = test_client();
        let signature = sign("other-secret", "order_123", "pay_456");

        assert!(matches!(
            client.verify_signature("order_123", "pay_456", &signature),
            Err(PaymentError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_signature_verification_tampered_reference() {
        let client = test_client();
        let signature = sign("test-key-secret", "order_123", "pay_456");

        assert!(
            client
                .verify_signature("order_999", "pay_456", &signature)
                .is_err()
        );
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(minor_units(Decimal::new(12_550, 2)), Some(12_550)); // 125.50
        assert_eq!(minor_units(Decimal::from(10)), Some(1_000));
        assert_eq!(minor_units(Decimal::new(1_005, 3)), None); // 1.005
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}

//! Conversation keys.
//!
//! A conversation is the single message thread between one customer and one
//! business. Its key is derived purely from the two identities, so any
//! caller holding the same (customer, business) pair addresses the same
//! thread without a lookup.

use serde::{Deserialize, Serialize};

use super::email::Email;

/// Deterministic key for the conversation between a customer and a business.
///
/// The key is `"{customer}__{business}"` with both emails already
/// normalized (lowercased) by [`Email::parse`]. Derivation is pure: the
/// same pair always yields the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationKey(String);

impl ConversationKey {
    /// Separator between the two identities. The key is opaque; the
    /// conversation row carries the participant ids, so it is never split
    /// back apart.
    const SEPARATOR: &'static str = "__";

    /// Derive the key for a (customer, business) pair.
    #[must_use]
    pub fn derive(customer: &Email, business: &Email) -> Self {
        Self(format!(
            "{}{}{}",
            customer.as_str(),
            Self::SEPARATOR,
            business.as_str()
        ))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reconstruct a key from a trusted stored string (e.g. a database row).
    #[must_use]
    pub fn from_stored(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[test]
    fn test_same_pair_same_key() {
        let a = ConversationKey::derive(&email("jo@mail.com"), &email("shop@biz.com"));
        let b = ConversationKey::derive(&email("jo@mail.com"), &email("shop@biz.com"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_case_differences_normalize_to_same_key() {
        let a = ConversationKey::derive(&email("Jo@Mail.com"), &email("SHOP@biz.com"));
        let b = ConversationKey::derive(&email("jo@mail.com"), &email("shop@biz.com"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_direction_matters() {
        // Customer and business sides are distinct roles; swapping them is a
        // different (nonsensical) thread.
        let a = ConversationKey::derive(&email("a@x.com"), &email("b@y.com"));
        let b = ConversationKey::derive(&email("b@y.com"), &email("a@x.com"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_different_pairs_different_keys() {
        let a = ConversationKey::derive(&email("jo@mail.com"), &email("shop@biz.com"));
        let b = ConversationKey::derive(&email("jo@mail.com"), &email("other@biz.com"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_underscores_in_local_part_stay_stable() {
        // `__` inside an email must not disturb derivation; the key is the
        // whole opaque composite, never split back into halves.
        let a = ConversationKey::derive(&email("jo__ann@mail.com"), &email("shop@biz.com"));
        let b = ConversationKey::derive(&email("jo__ann@mail.com"), &email("shop@biz.com"));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "jo__ann@mail.com__shop@biz.com");

        let other = ConversationKey::derive(&email("jo@mail.com"), &email("shop@biz.com"));
        assert_ne!(a, other);
    }
}

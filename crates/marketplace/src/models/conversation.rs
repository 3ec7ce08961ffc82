//! Conversation and message domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use townsquare_core::{BusinessId, ConversationId, ConversationKey, MessageId, UserId};

/// Which side of a conversation is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationSide {
    Customer,
    Business,
}

impl ConversationSide {
    /// The opposite side (the recipient of a message this side sends).
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Customer => Self::Business,
            Self::Business => Self::Customer,
        }
    }

    /// Database string for the `sender` / `last_sender` columns.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Business => "business",
        }
    }
}

impl std::str::FromStr for ConversationSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "business" => Ok(Self::Business),
            _ => Err(format!("invalid conversation side: {s}")),
        }
    }
}

/// A customer-business message thread.
///
/// Names and the last-message preview are denormalized for thread lists;
/// unread counters are per side and zeroed by that side's read-all.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub key: ConversationKey,
    pub customer_id: UserId,
    pub business_id: BusinessId,
    pub customer_name: String,
    pub business_name: String,
    pub last_message: String,
    pub last_sender: Option<ConversationSide>,
    pub customer_unread: i32,
    pub business_unread: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single message inside a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender: ConversationSide,
    pub body: String,
    pub read: bool,
    pub sent_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_side() {
        assert_eq!(
            ConversationSide::Customer.other(),
            ConversationSide::Business
        );
        assert_eq!(
            ConversationSide::Business.other(),
            ConversationSide::Customer
        );
    }

    #[test]
    fn test_side_round_trips() {
        for side in [ConversationSide::Customer, ConversationSide::Business] {
            assert_eq!(side.as_str().parse::<ConversationSide>(), Ok(side));
        }
    }
}

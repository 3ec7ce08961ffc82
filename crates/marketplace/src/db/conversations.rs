//! Conversation and message repositories.
//!
//! Message sends are transactional: the message row and the thread's
//! denormalized preview/unread columns move together.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use townsquare_core::{BusinessId, ConversationId, ConversationKey, MessageId, UserId};

use super::{RepositoryError, parse_column};
use crate::models::conversation::{Conversation, ConversationSide, Message};

const CONVERSATION_COLUMNS: &str = "id, key, customer_id, business_id, customer_name, \
     business_name, last_message, last_sender, customer_unread, business_unread, \
     created_at, updated_at";

const MESSAGE_COLUMNS: &str = "id, conversation_id, sender, body, read, sent_at";

#[derive(Debug, sqlx::FromRow)]
struct ConversationRow {
    id: i32,
    key: String,
    customer_id: i32,
    business_id: i32,
    customer_name: String,
    business_name: String,
    last_message: String,
    last_sender: Option<String>,
    customer_unread: i32,
    business_unread: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationRow {
    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        let last_sender = self
            .last_sender
            .as_deref()
            .map(|s| parse_column(s, "last sender"))
            .transpose()?;

        Ok(Conversation {
            id: ConversationId::new(self.id),
            key: ConversationKey::from_stored(self.key),
            customer_id: UserId::new(self.customer_id),
            business_id: BusinessId::new(self.business_id),
            customer_name: self.customer_name,
            business_name: self.business_name,
            last_message: self.last_message,
            last_sender,
            customer_unread: self.customer_unread,
            business_unread: self.business_unread,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i32,
    conversation_id: i32,
    sender: String,
    body: String,
    read: bool,
    sent_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Result<Message, RepositoryError> {
        let sender: ConversationSide = parse_column(&self.sender, "message sender")?;
        Ok(Message {
            id: MessageId::new(self.id),
            conversation_id: ConversationId::new(self.conversation_id),
            sender,
            body: self.body,
            read: self.read,
            sent_at: self.sent_at,
        })
    }
}

/// Repository for conversations and their messages.
pub struct ConversationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ConversationRepository<'a> {
    /// Create a new conversation repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the thread for `key`, creating it if it doesn't exist yet.
    ///
    /// Concurrent first-senders race on the unique key; the loser's insert
    /// becomes a no-op and both see the same row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(
        &self,
        key: &ConversationKey,
        customer_id: UserId,
        business_id: BusinessId,
        customer_name: &str,
        business_name: &str,
    ) -> Result<Conversation, RepositoryError> {
        let inserted = sqlx::query_as::<_, ConversationRow>(&format!(
            "INSERT INTO conversations (key, customer_id, business_id, customer_name, business_name) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (key) DO NOTHING \
             RETURNING {CONVERSATION_COLUMNS}"
        ))
        .bind(key.as_str())
        .bind(customer_id.as_i32())
        .bind(business_id.as_i32())
        .bind(customer_name)
        .bind(business_name)
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = inserted {
            return row.into_conversation();
        }

        let existing = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE key = $1"
        ))
        .bind(key.as_str())
        .fetch_one(self.pool)
        .await?;

        existing.into_conversation()
    }

    /// Get a conversation by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(ConversationRow::into_conversation).transpose()
    }

    /// List a customer's threads, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let rows = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations \
             WHERE customer_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(customer_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(ConversationRow::into_conversation)
            .collect()
    }

    /// List a business's threads, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_business(
        &self,
        business_id: BusinessId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let rows = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations \
             WHERE business_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(business_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(ConversationRow::into_conversation)
            .collect()
    }

    /// Append a message and update the thread in one transaction.
    ///
    /// The recipient side's unread counter goes up by one and the thread's
    /// preview columns move to this message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the conversation doesn't exist.
    pub async fn send_message(
        &self,
        conversation_id: ConversationId,
        sender: ConversationSide,
        body: &str,
    ) -> Result<Message, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "INSERT INTO messages (conversation_id, sender, body) \
             VALUES ($1, $2, $3) \
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(conversation_id.as_i32())
        .bind(sender.as_str())
        .bind(body)
        .fetch_one(&mut *tx)
        .await?;

        let unread_column = match sender.other() {
            ConversationSide::Customer => "customer_unread",
            ConversationSide::Business => "business_unread",
        };

        let updated = sqlx::query(&format!(
            "UPDATE conversations SET \
                last_message = $2, \
                last_sender = $3, \
                {unread_column} = {unread_column} + 1, \
                updated_at = NOW() \
             WHERE id = $1"
        ))
        .bind(conversation_id.as_i32())
        .bind(body)
        .bind(sender.as_str())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        row.into_message()
    }

    /// Mark the thread read from `side`: zero that side's unread counter and
    /// flag the other side's messages as read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_read(
        &self,
        conversation_id: ConversationId,
        side: ConversationSide,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let unread_column = match side {
            ConversationSide::Customer => "customer_unread",
            ConversationSide::Business => "business_unread",
        };

        sqlx::query(&format!(
            "UPDATE conversations SET {unread_column} = 0 WHERE id = $1"
        ))
        .bind(conversation_id.as_i32())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE messages SET read = TRUE \
             WHERE conversation_id = $1 AND sender = $2 AND NOT read",
        )
        .bind(conversation_id.as_i32())
        .bind(side.other().as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// List messages in send order, optionally only those after a cursor.
    ///
    /// Pollers pass the last message ID they've seen as `after`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn messages(
        &self,
        conversation_id: ConversationId,
        after: Option<MessageId>,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE conversation_id = $1 AND ($2::INTEGER IS NULL OR id > $2) \
             ORDER BY id"
        ))
        .bind(conversation_id.as_i32())
        .bind(after.map(|id| id.as_i32()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(MessageRow::into_message).collect()
    }
}

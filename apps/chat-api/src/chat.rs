//! Direct-message persistence.
//!
//! The gateway only depends on the `ChatStore` trait; the in-memory
//! implementation backs tests and single-process deployments, and a
//! database-backed implementation can slot in behind the same trait.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use utoipa::ToSchema;

use folio_common::SnowflakeGenerator;

use crate::error::ApiError;

/// A persisted direct message between two users.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
    /// ISO-8601, no timezone suffix; the frontend parses it as a local time.
    pub timestamp: NaiveDateTime,
    /// `isRead` on the REST surface; the WebSocket chat envelope renames it
    /// to `read`.
    pub is_read: bool,
}

/// Abstraction over direct-message storage.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Persist a message and return it with its assigned ID and timestamp.
    async fn save(
        &self,
        sender_id: i64,
        receiver_id: i64,
        text: &str,
    ) -> Result<StoredMessage, ApiError>;

    /// Messages exchanged between two users (either direction) at or after
    /// `since`, ordered by timestamp ascending.
    async fn messages_between(
        &self,
        user_id1: i64,
        user_id2: i64,
        since: NaiveDateTime,
    ) -> Result<Vec<StoredMessage>, ApiError>;

    /// Mark every message from `sender_id` to `receiver_id` as read.
    async fn mark_read(&self, sender_id: i64, receiver_id: i64) -> Result<(), ApiError>;

    /// Unread messages addressed to `receiver_id`, timestamp ascending.
    async fn unread_for(&self, receiver_id: i64) -> Result<Vec<StoredMessage>, ApiError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

pub struct MemoryChatStore {
    ids: SnowflakeGenerator,
    messages: Mutex<Vec<StoredMessage>>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self {
            ids: SnowflakeGenerator::new(0),
            messages: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryChatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn save(
        &self,
        sender_id: i64,
        receiver_id: i64,
        text: &str,
    ) -> Result<StoredMessage, ApiError> {
        let message = StoredMessage {
            id: self.ids.generate(),
            sender_id,
            receiver_id,
            message: text.to_string(),
            timestamp: Utc::now().naive_utc(),
            is_read: false,
        };
        self.messages.lock().push(message.clone());
        Ok(message)
    }

    async fn messages_between(
        &self,
        user_id1: i64,
        user_id2: i64,
        since: NaiveDateTime,
    ) -> Result<Vec<StoredMessage>, ApiError> {
        let mut result: Vec<StoredMessage> = self
            .messages
            .lock()
            .iter()
            .filter(|m| {
                m.timestamp >= since
                    && ((m.sender_id == user_id1 && m.receiver_id == user_id2)
                        || (m.sender_id == user_id2 && m.receiver_id == user_id1))
            })
            .cloned()
            .collect();
        result.sort_by_key(|m| m.timestamp);
        Ok(result)
    }

    async fn mark_read(&self, sender_id: i64, receiver_id: i64) -> Result<(), ApiError> {
        for m in self.messages.lock().iter_mut() {
            if m.sender_id == sender_id && m.receiver_id == receiver_id {
                m.is_read = true;
            }
        }
        Ok(())
    }

    async fn unread_for(&self, receiver_id: i64) -> Result<Vec<StoredMessage>, ApiError> {
        let mut result: Vec<StoredMessage> = self
            .messages
            .lock()
            .iter()
            .filter(|m| m.receiver_id == receiver_id && !m.is_read)
            .cloned()
            .collect();
        result.sort_by_key(|m| m.timestamp);
        Ok(result)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Image,
    Document,
    Location,
    Other,
}

/// Immutable record of one message exchanged in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub direction: Direction,
    pub message_type: ContentType,
    pub content: String,
    pub media_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub wa_message_id: Option<String>,
    pub metadata: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn inbound(
        conversation_id: Uuid,
        message_type: ContentType,
        content: &str,
        media_url: Option<String>,
        timestamp: DateTime<Utc>,
        wa_message_id: &str,
        metadata: JsonValue,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            direction: Direction::In,
            message_type,
            content: content.to_string(),
            media_url,
            timestamp,
            wa_message_id: Some(wa_message_id.to_string()),
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Outbound text stamped with wall-clock time.
    pub fn outbound(
        conversation_id: Uuid,
        content: &str,
        wa_message_id: Option<String>,
        metadata: JsonValue,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            direction: Direction::Out,
            message_type: ContentType::Text,
            content: content.to_string(),
            media_url: None,
            timestamp: now,
            wa_message_id,
            metadata,
            created_at: now,
        }
    }
}

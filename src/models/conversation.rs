use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    #[default]
    Open,
    Closed,
    Archived,
}

/// Sales funnel label, orthogonal to the conversation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProspectStatus {
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl std::fmt::Display for ProspectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProspectStatus::New => "new",
            ProspectStatus::Contacted => "contacted",
            ProspectStatus::Qualified => "qualified",
            ProspectStatus::Converted => "converted",
            ProspectStatus::Lost => "lost",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub wa_account_id: Uuid,
    pub contact_phone: String,
    pub contact_name: Option<String>,
    pub status: ConversationStatus,
    pub prospect_status: Option<ProspectStatus>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// A fresh open conversation seeded with the triggering message preview.
    pub fn open(
        wa_account_id: Uuid,
        contact_phone: &str,
        contact_name: Option<&str>,
        preview: &str,
        at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            wa_account_id,
            contact_phone: contact_phone.to_string(),
            contact_name: contact_name.map(str::to_string),
            status: ConversationStatus::Open,
            prospect_status: None,
            last_message: Some(preview.to_string()),
            last_message_at: Some(at),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Cuts a message down to the stored preview length, on a char boundary.
pub fn preview_of(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

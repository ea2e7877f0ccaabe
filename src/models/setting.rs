use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const LANGUAGE_KEY: &str = "language";

/// Settings every tenant starts with.
pub const DEFAULT_SETTINGS: [(&str, &str); 3] = [
    ("greeting_message", "Bonjour ! Comment puis-je vous aider ?"),
    (
        "out_of_hours_message",
        "Nous sommes actuellement fermés. Nous vous répondrons dès que possible.",
    ),
    (LANGUAGE_KEY, "fr"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    pub user_id: Uuid,
    pub key: String,
    pub value: Option<String>,
    pub updated_at: DateTime<Utc>,
}

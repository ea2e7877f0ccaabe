use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered WhatsApp sending identity. `phone_number_id` routes inbound payloads to the tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessagingAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone_number_id: String,
    pub display_phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl MessagingAccount {
    pub fn new(user_id: Uuid, phone_number_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            phone_number_id: phone_number_id.to_string(),
            display_phone: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

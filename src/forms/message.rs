use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use uuid::Uuid;

/// Manual message from the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SendMessageForm {
    #[validate(min_length = 1)]
    pub phone: String,
    #[validate(min_length = 1)]
    #[validate(max_length = 4096)]
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
}

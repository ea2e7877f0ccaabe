use crate::models::{self, Language};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FaqForm {
    #[validate(min_length = 1)]
    #[validate(max_length = 500)]
    pub question: String,
    #[validate(min_length = 1)]
    #[validate(max_length = 2000)]
    pub answer: String,
    #[serde(default)]
    #[validate(pattern = r"^(fr|mg)$")]
    pub language: Option<String>,
}

impl FaqForm {
    fn language(&self) -> Language {
        Language::from_setting(self.language.as_deref(), Language::Fr)
    }

    pub fn into_item(self, user_id: Uuid) -> models::FaqItem {
        let now = Utc::now();
        models::FaqItem {
            id: Uuid::new_v4(),
            user_id,
            language: self.language(),
            question: self.question,
            answer: self.answer,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_to(self, existing: models::FaqItem) -> models::FaqItem {
        models::FaqItem {
            language: self.language(),
            question: self.question,
            answer: self.answer,
            updated_at: Utc::now(),
            ..existing
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FaqQuery {
    pub language: Option<Language>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A business owner. Keyed by the identity provider subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub subject: String,
    pub email: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub plan: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// New tenant for a first-seen identity. Company name defaults to the e-mail local part.
    pub fn provision(subject: &str, email: Option<&str>) -> Self {
        let now = Utc::now();
        let company_name = email
            .and_then(|email| email.split('@').next())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Self {
            id: Uuid::new_v4(),
            subject: subject.to_string(),
            email: email.map(str::to_string),
            company_name,
            phone: None,
            plan: "free".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

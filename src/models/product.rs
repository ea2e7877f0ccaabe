use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sku: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub stock: i32,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

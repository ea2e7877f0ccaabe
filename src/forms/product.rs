use super::blank_to_none;
use crate::models;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProductForm {
    #[serde(default)]
    pub sku: Option<String>,
    #[validate(min_length = 1)]
    #[validate(max_length = 255)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(minimum = 0.0)]
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    #[validate(minimum = 0)]
    pub stock: i32,
    #[serde(default)]
    pub image_path: Option<String>,
}

impl ProductForm {
    pub fn into_product(self, user_id: Uuid, default_currency: &str) -> models::Product {
        let now = Utc::now();
        models::Product {
            id: Uuid::new_v4(),
            user_id,
            sku: blank_to_none(self.sku),
            title: self.title.trim().to_string(),
            description: blank_to_none(self.description),
            price: self.price,
            currency: blank_to_none(self.currency).unwrap_or_else(|| default_currency.to_string()),
            stock: self.stock,
            image_path: blank_to_none(self.image_path),
            created_at: now,
            updated_at: now,
        }
    }

    /// Full replacement of an existing row, keeping its identity.
    pub fn apply_to(self, existing: models::Product, default_currency: &str) -> models::Product {
        let replacement = self.into_product(existing.user_id, default_currency);
        models::Product {
            id: existing.id,
            created_at: existing.created_at,
            ..replacement
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ProductListQuery {
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

use super::blank_to_none;
use crate::models;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct QuoteItemForm {
    #[serde(default)]
    pub product_id: Option<Uuid>,
    #[validate(min_length = 1)]
    pub title: String,
    #[validate(minimum = 1)]
    pub quantity: i32,
    #[validate(minimum = 0.0)]
    pub price: f64,
}

/// Dashboard quote ("devis") creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct QuoteForm {
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
    #[validate(min_length = 1)]
    pub contact_phone: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[validate(min_items = 1)]
    #[validate]
    pub items: Vec<QuoteItemForm>,
    #[serde(default)]
    #[validate(minimum = 0.0)]
    pub tax: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

impl QuoteForm {
    pub fn into_quote(self, user_id: Uuid, default_currency: &str) -> models::Quote {
        let items = self
            .items
            .into_iter()
            .map(|item| models::QuoteItem {
                product_id: item.product_id,
                title: item.title,
                quantity: item.quantity,
                price: item.price,
            })
            .collect();
        let currency = blank_to_none(self.currency).unwrap_or_else(|| default_currency.to_string());
        let contact_name = blank_to_none(self.contact_name);

        models::Quote::draft(
            user_id,
            self.conversation_id,
            self.contact_phone.trim(),
            contact_name.as_deref(),
            items,
            self.tax,
            &currency,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteListQuery {
    pub conversation_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

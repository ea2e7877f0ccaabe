use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    #[serde(default)]
    pub product_id: Option<Uuid>,
    pub title: String,
    pub quantity: i32,
    pub price: f64,
}

impl QuoteItem {
    /// One unit of a catalog product at its list price.
    pub fn single(product: &Product) -> Self {
        Self {
            product_id: Some(product.id),
            title: product.title.clone(),
            quantity: 1,
            price: product.price,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuoteTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl QuoteTotals {
    pub fn compute(items: &[QuoteItem], tax: f64) -> Self {
        let subtotal = items.iter().map(QuoteItem::line_total).sum::<f64>();
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

/// A priced offer ("devis"). Line items are fixed once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Quote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub contact_phone: String,
    pub contact_name: Option<String>,
    #[sqlx(json)]
    pub items: Vec<QuoteItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub currency: String,
    pub status: QuoteStatus,
    pub pdf_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn draft(
        user_id: Uuid,
        conversation_id: Option<Uuid>,
        contact_phone: &str,
        contact_name: Option<&str>,
        items: Vec<QuoteItem>,
        tax: f64,
        currency: &str,
    ) -> Self {
        let totals = QuoteTotals::compute(&items, tax);
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            conversation_id,
            contact_phone: contact_phone.to_string(),
            contact_name: contact_name.map(str::to_string),
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            currency: currency.to_string(),
            status: QuoteStatus::Draft,
            pdf_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn document_filename(&self) -> String {
        format!("devis-{}.pdf", self.id)
    }
}

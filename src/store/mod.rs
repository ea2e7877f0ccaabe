//! Persistence seam.
//!
//! Every read and write in the crate goes through [`Store`]. Dashboard-facing
//! queries take the resolved tenant id and never return rows owned by another
//! tenant. `PgStore` backs production, `MemoryStore` keeps the same uniqueness
//! and ordering rules in process for tests.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::helpers::Page;
use crate::models;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("duplicate {0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("record").to_string();
                return StoreError::Duplicate(constraint);
            }
        }
        StoreError::Database(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Default, Clone)]
pub struct ConversationFilter {
    pub status: Option<models::ConversationStatus>,
    pub prospect_status: Option<models::ProspectStatus>,
    /// Only conversations that carry a prospect label.
    pub prospects_only: bool,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    // tenants
    async fn fetch_tenant(&self, id: Uuid) -> StoreResult<Option<models::Tenant>>;
    async fn fetch_tenant_by_subject(&self, subject: &str) -> StoreResult<Option<models::Tenant>>;
    /// Inserts or returns the row already registered for the same subject.
    async fn insert_tenant(&self, tenant: models::Tenant) -> StoreResult<models::Tenant>;
    async fn update_tenant_profile(
        &self,
        id: Uuid,
        company_name: Option<String>,
        phone: Option<String>,
    ) -> StoreResult<models::Tenant>;

    // messaging accounts
    async fn insert_account(
        &self,
        account: models::MessagingAccount,
    ) -> StoreResult<models::MessagingAccount>;
    async fn fetch_account_by_phone_number_id(
        &self,
        phone_number_id: &str,
    ) -> StoreResult<Option<models::MessagingAccount>>;
    async fn fetch_active_account(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Option<models::MessagingAccount>>;

    // conversations
    async fn find_conversation(
        &self,
        wa_account_id: Uuid,
        contact_phone: &str,
    ) -> StoreResult<Option<models::Conversation>>;
    async fn insert_conversation(
        &self,
        conversation: models::Conversation,
    ) -> StoreResult<models::Conversation>;
    /// Moves the preview forward. Returns false when `at` is older than the stored one.
    async fn touch_conversation(&self, id: Uuid, preview: &str, at: DateTime<Utc>)
        -> StoreResult<bool>;
    /// Sets the contact name only while none is stored.
    async fn fill_contact_name(&self, id: Uuid, contact_name: &str) -> StoreResult<bool>;
    async fn set_prospect_status(
        &self,
        id: Uuid,
        prospect_status: models::ProspectStatus,
    ) -> StoreResult<()>;
    async fn fetch_conversation(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<models::Conversation>>;
    async fn list_conversations(
        &self,
        user_id: Uuid,
        filter: &ConversationFilter,
        page: Page,
    ) -> StoreResult<(Vec<models::Conversation>, i64)>;
    /// `prospect_status`: `None` keeps the stored value, `Some(None)` clears it.
    async fn update_conversation_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: models::ConversationStatus,
        prospect_status: Option<Option<models::ProspectStatus>>,
    ) -> StoreResult<Option<models::Conversation>>;

    // messages
    async fn insert_message(&self, message: models::Message) -> StoreResult<models::Message>;
    /// Newest first.
    async fn recent_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<models::Message>>;
    /// Oldest first.
    async fn list_messages(
        &self,
        conversation_id: Uuid,
        page: Page,
    ) -> StoreResult<(Vec<models::Message>, i64)>;

    // products
    async fn list_products(
        &self,
        user_id: Uuid,
        search: Option<&str>,
        page: Page,
    ) -> StoreResult<(Vec<models::Product>, i64)>;
    async fn fetch_product(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<models::Product>>;
    async fn insert_products(
        &self,
        products: Vec<models::Product>,
    ) -> StoreResult<Vec<models::Product>>;
    async fn update_product(&self, product: models::Product)
        -> StoreResult<Option<models::Product>>;
    async fn delete_product(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;

    // quotes
    async fn insert_quote(&self, quote: models::Quote) -> StoreResult<models::Quote>;
    async fn fetch_quote(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<models::Quote>>;
    async fn list_quotes(
        &self,
        user_id: Uuid,
        conversation_id: Option<Uuid>,
        page: Page,
    ) -> StoreResult<(Vec<models::Quote>, i64)>;
    async fn set_quote_document(&self, id: Uuid, pdf_path: &str) -> StoreResult<()>;

    // faq
    async fn list_faq(
        &self,
        user_id: Uuid,
        language: models::Language,
    ) -> StoreResult<Vec<models::FaqItem>>;
    async fn fetch_faq(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<models::FaqItem>>;
    async fn insert_faq(&self, item: models::FaqItem) -> StoreResult<models::FaqItem>;
    async fn update_faq(&self, item: models::FaqItem) -> StoreResult<Option<models::FaqItem>>;
    async fn delete_faq(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;

    // settings
    async fn fetch_settings(&self, user_id: Uuid) -> StoreResult<Vec<models::Setting>>;
    async fn fetch_setting(&self, user_id: Uuid, key: &str)
        -> StoreResult<Option<models::Setting>>;
    async fn upsert_settings(
        &self,
        user_id: Uuid,
        values: Vec<(String, Option<String>)>,
    ) -> StoreResult<()>;
}

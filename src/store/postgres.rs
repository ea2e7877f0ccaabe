use super::{ConversationFilter, Store, StoreResult};
use crate::db;
use crate::helpers::Page;
use crate::models;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL store over the `db` query functions.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        db::ping(&self.pool).await
    }

    async fn fetch_tenant(&self, id: Uuid) -> StoreResult<Option<models::Tenant>> {
        db::tenant::fetch(&self.pool, id).await
    }

    async fn fetch_tenant_by_subject(&self, subject: &str) -> StoreResult<Option<models::Tenant>> {
        db::tenant::fetch_by_subject(&self.pool, subject).await
    }

    async fn insert_tenant(&self, tenant: models::Tenant) -> StoreResult<models::Tenant> {
        db::tenant::insert(&self.pool, tenant).await
    }

    async fn update_tenant_profile(
        &self,
        id: Uuid,
        company_name: Option<String>,
        phone: Option<String>,
    ) -> StoreResult<models::Tenant> {
        db::tenant::update_profile(&self.pool, id, company_name, phone).await
    }

    async fn insert_account(
        &self,
        account: models::MessagingAccount,
    ) -> StoreResult<models::MessagingAccount> {
        db::account::insert(&self.pool, account).await
    }

    async fn fetch_account_by_phone_number_id(
        &self,
        phone_number_id: &str,
    ) -> StoreResult<Option<models::MessagingAccount>> {
        db::account::fetch_by_phone_number_id(&self.pool, phone_number_id).await
    }

    async fn fetch_active_account(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Option<models::MessagingAccount>> {
        db::account::fetch_active(&self.pool, user_id).await
    }

    async fn find_conversation(
        &self,
        wa_account_id: Uuid,
        contact_phone: &str,
    ) -> StoreResult<Option<models::Conversation>> {
        db::conversation::find(&self.pool, wa_account_id, contact_phone).await
    }

    async fn insert_conversation(
        &self,
        conversation: models::Conversation,
    ) -> StoreResult<models::Conversation> {
        db::conversation::insert(&self.pool, conversation).await
    }

    async fn touch_conversation(
        &self,
        id: Uuid,
        preview: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        db::conversation::touch(&self.pool, id, preview, at).await
    }

    async fn fill_contact_name(&self, id: Uuid, contact_name: &str) -> StoreResult<bool> {
        db::conversation::fill_contact_name(&self.pool, id, contact_name).await
    }

    async fn set_prospect_status(
        &self,
        id: Uuid,
        prospect_status: models::ProspectStatus,
    ) -> StoreResult<()> {
        db::conversation::set_prospect_status(&self.pool, id, prospect_status).await
    }

    async fn fetch_conversation(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<models::Conversation>> {
        db::conversation::fetch(&self.pool, user_id, id).await
    }

    async fn list_conversations(
        &self,
        user_id: Uuid,
        filter: &ConversationFilter,
        page: Page,
    ) -> StoreResult<(Vec<models::Conversation>, i64)> {
        db::conversation::list(&self.pool, user_id, filter, page).await
    }

    async fn update_conversation_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: models::ConversationStatus,
        prospect_status: Option<Option<models::ProspectStatus>>,
    ) -> StoreResult<Option<models::Conversation>> {
        db::conversation::update_status(&self.pool, user_id, id, status, prospect_status).await
    }

    async fn insert_message(&self, message: models::Message) -> StoreResult<models::Message> {
        db::message::insert(&self.pool, message).await
    }

    async fn recent_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<models::Message>> {
        db::message::recent(&self.pool, conversation_id, limit).await
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        page: Page,
    ) -> StoreResult<(Vec<models::Message>, i64)> {
        db::message::list(&self.pool, conversation_id, page).await
    }

    async fn list_products(
        &self,
        user_id: Uuid,
        search: Option<&str>,
        page: Page,
    ) -> StoreResult<(Vec<models::Product>, i64)> {
        db::product::list(&self.pool, user_id, search, page).await
    }

    async fn fetch_product(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<models::Product>> {
        db::product::fetch(&self.pool, user_id, id).await
    }

    async fn insert_products(
        &self,
        products: Vec<models::Product>,
    ) -> StoreResult<Vec<models::Product>> {
        db::product::insert_many(&self.pool, products).await
    }

    async fn update_product(
        &self,
        product: models::Product,
    ) -> StoreResult<Option<models::Product>> {
        db::product::update(&self.pool, product).await
    }

    async fn delete_product(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        db::product::delete(&self.pool, user_id, id).await
    }

    async fn insert_quote(&self, quote: models::Quote) -> StoreResult<models::Quote> {
        db::quote::insert(&self.pool, quote).await
    }

    async fn fetch_quote(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<models::Quote>> {
        db::quote::fetch(&self.pool, user_id, id).await
    }

    async fn list_quotes(
        &self,
        user_id: Uuid,
        conversation_id: Option<Uuid>,
        page: Page,
    ) -> StoreResult<(Vec<models::Quote>, i64)> {
        db::quote::list(&self.pool, user_id, conversation_id, page).await
    }

    async fn set_quote_document(&self, id: Uuid, pdf_path: &str) -> StoreResult<()> {
        db::quote::set_document(&self.pool, id, pdf_path).await
    }

    async fn list_faq(
        &self,
        user_id: Uuid,
        language: models::Language,
    ) -> StoreResult<Vec<models::FaqItem>> {
        db::faq::list(&self.pool, user_id, language).await
    }

    async fn fetch_faq(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<models::FaqItem>> {
        db::faq::fetch(&self.pool, user_id, id).await
    }

    async fn insert_faq(&self, item: models::FaqItem) -> StoreResult<models::FaqItem> {
        db::faq::insert(&self.pool, item).await
    }

    async fn update_faq(&self, item: models::FaqItem) -> StoreResult<Option<models::FaqItem>> {
        db::faq::update(&self.pool, item).await
    }

    async fn delete_faq(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        db::faq::delete(&self.pool, user_id, id).await
    }

    async fn fetch_settings(&self, user_id: Uuid) -> StoreResult<Vec<models::Setting>> {
        db::setting::fetch_all(&self.pool, user_id).await
    }

    async fn fetch_setting(
        &self,
        user_id: Uuid,
        key: &str,
    ) -> StoreResult<Option<models::Setting>> {
        db::setting::fetch_one(&self.pool, user_id, key).await
    }

    async fn upsert_settings(
        &self,
        user_id: Uuid,
        values: Vec<(String, Option<String>)>,
    ) -> StoreResult<()> {
        db::setting::upsert_many(&self.pool, user_id, values).await
    }
}

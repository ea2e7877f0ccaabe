use super::{ConversationFilter, Store, StoreError, StoreResult};
use crate::helpers::Page;
use crate::models;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    tenants: Vec<models::Tenant>,
    accounts: Vec<models::MessagingAccount>,
    conversations: Vec<models::Conversation>,
    messages: Vec<models::Message>,
    products: Vec<models::Product>,
    quotes: Vec<models::Quote>,
    faq: Vec<models::FaqItem>,
    settings: Vec<models::Setting>,
}

impl Tables {
    fn account_ids_of(&self, user_id: Uuid) -> Vec<Uuid> {
        self.accounts
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.id)
            .collect()
    }

    fn owns_conversation(&self, user_id: Uuid, conversation: &models::Conversation) -> bool {
        self.account_ids_of(user_id)
            .contains(&conversation.wa_account_id)
    }
}

/// In-process store with the same uniqueness, scoping and ordering rules as the SQL schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    stale_lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `count` conversation lookups miss, as a reader racing a concurrent insert would.
    pub fn with_stale_lookups(self, count: usize) -> Self {
        self.stale_lookups.store(count, Ordering::SeqCst);
        self
    }

    fn stale_lookup(&self) -> bool {
        self.stale_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// Newest first, insertion order breaking ties.
fn newest_first<T: Clone>(items: Vec<&T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut items: Vec<(usize, &T)> = items.into_iter().enumerate().collect();
    items.sort_by_key(|(index, item)| (Reverse(created_at(item)), Reverse(*index)));
    items.into_iter().map(|(_, item)| item.clone()).collect()
}

fn contains_folded(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(needle))
        .unwrap_or(false)
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn fetch_tenant(&self, id: Uuid) -> StoreResult<Option<models::Tenant>> {
        let tables = self.tables.read().await;
        Ok(tables.tenants.iter().find(|t| t.id == id).cloned())
    }

    async fn fetch_tenant_by_subject(&self, subject: &str) -> StoreResult<Option<models::Tenant>> {
        let tables = self.tables.read().await;
        Ok(tables.tenants.iter().find(|t| t.subject == subject).cloned())
    }

    async fn insert_tenant(&self, tenant: models::Tenant) -> StoreResult<models::Tenant> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.tenants.iter().find(|t| t.subject == tenant.subject) {
            return Ok(existing.clone());
        }
        tables.tenants.push(tenant.clone());
        Ok(tenant)
    }

    async fn update_tenant_profile(
        &self,
        id: Uuid,
        company_name: Option<String>,
        phone: Option<String>,
    ) -> StoreResult<models::Tenant> {
        let mut tables = self.tables.write().await;
        let tenant = tables
            .tenants
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::Database(format!("tenant {id} does not exist")))?;
        if company_name.is_some() {
            tenant.company_name = company_name;
        }
        if phone.is_some() {
            tenant.phone = phone;
        }
        tenant.updated_at = Utc::now();
        Ok(tenant.clone())
    }

    async fn insert_account(
        &self,
        account: models::MessagingAccount,
    ) -> StoreResult<models::MessagingAccount> {
        let mut tables = self.tables.write().await;
        if tables
            .accounts
            .iter()
            .any(|a| a.phone_number_id == account.phone_number_id)
        {
            return Err(StoreError::Duplicate(
                "wa_accounts_phone_number_id_key".to_string(),
            ));
        }
        tables.accounts.push(account.clone());
        Ok(account)
    }

    async fn fetch_account_by_phone_number_id(
        &self,
        phone_number_id: &str,
    ) -> StoreResult<Option<models::MessagingAccount>> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .iter()
            .find(|a| a.phone_number_id == phone_number_id)
            .cloned())
    }

    async fn fetch_active_account(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Option<models::MessagingAccount>> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .iter()
            .filter(|a| a.user_id == user_id && a.is_active)
            .min_by_key(|a| a.created_at)
            .cloned())
    }

    async fn find_conversation(
        &self,
        wa_account_id: Uuid,
        contact_phone: &str,
    ) -> StoreResult<Option<models::Conversation>> {
        if self.stale_lookup() {
            return Ok(None);
        }
        let tables = self.tables.read().await;
        Ok(tables
            .conversations
            .iter()
            .find(|c| c.wa_account_id == wa_account_id && c.contact_phone == contact_phone)
            .cloned())
    }

    async fn insert_conversation(
        &self,
        conversation: models::Conversation,
    ) -> StoreResult<models::Conversation> {
        let mut tables = self.tables.write().await;
        if tables.conversations.iter().any(|c| {
            c.wa_account_id == conversation.wa_account_id
                && c.contact_phone == conversation.contact_phone
        }) {
            return Err(StoreError::Duplicate(
                "conversations_account_contact_key".to_string(),
            ));
        }
        tables.conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn touch_conversation(
        &self,
        id: Uuid,
        preview: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(conversation) = tables.conversations.iter_mut().find(|c| c.id == id) else {
            return Ok(false);
        };
        if conversation.last_message_at.map_or(false, |stored| stored > at) {
            return Ok(false);
        }
        conversation.last_message = Some(preview.to_string());
        conversation.last_message_at = Some(at);
        conversation.updated_at = Utc::now();
        Ok(true)
    }

    async fn fill_contact_name(&self, id: Uuid, contact_name: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables
            .conversations
            .iter_mut()
            .find(|c| c.id == id && c.contact_name.is_none())
        {
            Some(conversation) => {
                conversation.contact_name = Some(contact_name.to_string());
                conversation.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_prospect_status(
        &self,
        id: Uuid,
        prospect_status: models::ProspectStatus,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(conversation) = tables.conversations.iter_mut().find(|c| c.id == id) {
            conversation.prospect_status = Some(prospect_status);
            conversation.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn fetch_conversation(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<models::Conversation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .conversations
            .iter()
            .find(|c| c.id == id && tables.owns_conversation(user_id, c))
            .cloned())
    }

    async fn list_conversations(
        &self,
        user_id: Uuid,
        filter: &ConversationFilter,
        page: Page,
    ) -> StoreResult<(Vec<models::Conversation>, i64)> {
        let tables = self.tables.read().await;
        let accounts = tables.account_ids_of(user_id);
        let mut matching: Vec<models::Conversation> = tables
            .conversations
            .iter()
            .filter(|c| accounts.contains(&c.wa_account_id))
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .filter(|c| {
                filter
                    .prospect_status
                    .map_or(true, |s| c.prospect_status == Some(s))
            })
            .filter(|c| !filter.prospects_only || c.prospect_status.is_some())
            .cloned()
            .collect();
        // last message desc with nulls last, then updated desc
        matching.sort_by(|a, b| {
            b.last_message_at
                .is_some()
                .cmp(&a.last_message_at.is_some())
                .then(b.last_message_at.cmp(&a.last_message_at))
                .then(b.updated_at.cmp(&a.updated_at))
        });
        let total = matching.len() as i64;
        Ok((page.slice(&matching), total))
    }

    async fn update_conversation_status(
        &self,
        user_id: Uuid,
        id: Uuid,
        status: models::ConversationStatus,
        prospect_status: Option<Option<models::ProspectStatus>>,
    ) -> StoreResult<Option<models::Conversation>> {
        let mut tables = self.tables.write().await;
        let accounts = tables.account_ids_of(user_id);
        let Some(conversation) = tables
            .conversations
            .iter_mut()
            .find(|c| c.id == id && accounts.contains(&c.wa_account_id))
        else {
            return Ok(None);
        };
        conversation.status = status;
        if let Some(prospect_status) = prospect_status {
            conversation.prospect_status = prospect_status;
        }
        conversation.updated_at = Utc::now();
        Ok(Some(conversation.clone()))
    }

    async fn insert_message(&self, message: models::Message) -> StoreResult<models::Message> {
        let mut tables = self.tables.write().await;
        if let Some(wa_message_id) = message.wa_message_id.as_deref() {
            if tables
                .messages
                .iter()
                .any(|m| m.wa_message_id.as_deref() == Some(wa_message_id))
            {
                return Err(StoreError::Duplicate("messages_wa_message_id_key".to_string()));
            }
        }
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn recent_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<models::Message>> {
        let tables = self.tables.read().await;
        let matching = tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .collect();
        let mut newest = newest_first(matching, |m: &models::Message| m.timestamp);
        newest.truncate(limit.max(0) as usize);
        Ok(newest)
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        page: Page,
    ) -> StoreResult<(Vec<models::Message>, i64)> {
        let tables = self.tables.read().await;
        let mut matching: Vec<models::Message> = tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        matching.sort_by_key(|m| m.timestamp);
        let total = matching.len() as i64;
        Ok((page.slice(&matching), total))
    }

    async fn list_products(
        &self,
        user_id: Uuid,
        search: Option<&str>,
        page: Page,
    ) -> StoreResult<(Vec<models::Product>, i64)> {
        let tables = self.tables.read().await;
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let matching = tables
            .products
            .iter()
            .filter(|p| p.user_id == user_id)
            .filter(|p| match &needle {
                Some(needle) => {
                    p.title.to_lowercase().contains(needle)
                        || contains_folded(p.description.as_deref(), needle)
                        || contains_folded(p.sku.as_deref(), needle)
                }
                None => true,
            })
            .collect();
        let ordered = newest_first(matching, |p: &models::Product| p.created_at);
        let total = ordered.len() as i64;
        Ok((page.slice(&ordered), total))
    }

    async fn fetch_product(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<models::Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned())
    }

    async fn insert_products(
        &self,
        products: Vec<models::Product>,
    ) -> StoreResult<Vec<models::Product>> {
        let mut tables = self.tables.write().await;
        tables.products.extend(products.iter().cloned());
        Ok(products)
    }

    async fn update_product(
        &self,
        product: models::Product,
    ) -> StoreResult<Option<models::Product>> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables
            .products
            .iter_mut()
            .find(|p| p.id == product.id && p.user_id == product.user_id)
        else {
            return Ok(None);
        };
        let created_at = stored.created_at;
        *stored = models::Product {
            created_at,
            updated_at: Utc::now(),
            ..product
        };
        Ok(Some(stored.clone()))
    }

    async fn delete_product(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables
            .products
            .retain(|p| !(p.id == id && p.user_id == user_id));
        Ok(tables.products.len() < before)
    }

    async fn insert_quote(&self, quote: models::Quote) -> StoreResult<models::Quote> {
        let mut tables = self.tables.write().await;
        tables.quotes.push(quote.clone());
        Ok(quote)
    }

    async fn fetch_quote(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<models::Quote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .quotes
            .iter()
            .find(|q| q.id == id && q.user_id == user_id)
            .cloned())
    }

    async fn list_quotes(
        &self,
        user_id: Uuid,
        conversation_id: Option<Uuid>,
        page: Page,
    ) -> StoreResult<(Vec<models::Quote>, i64)> {
        let tables = self.tables.read().await;
        let matching = tables
            .quotes
            .iter()
            .filter(|q| q.user_id == user_id)
            .filter(|q| conversation_id.map_or(true, |id| q.conversation_id == Some(id)))
            .collect();
        let ordered = newest_first(matching, |q: &models::Quote| q.created_at);
        let total = ordered.len() as i64;
        Ok((page.slice(&ordered), total))
    }

    async fn set_quote_document(&self, id: Uuid, pdf_path: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(quote) = tables.quotes.iter_mut().find(|q| q.id == id) {
            quote.pdf_path = Some(pdf_path.to_string());
            quote.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_faq(
        &self,
        user_id: Uuid,
        language: models::Language,
    ) -> StoreResult<Vec<models::FaqItem>> {
        let tables = self.tables.read().await;
        let matching = tables
            .faq
            .iter()
            .filter(|f| f.user_id == user_id && f.language == language)
            .collect();
        Ok(newest_first(matching, |f: &models::FaqItem| f.created_at))
    }

    async fn fetch_faq(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<models::FaqItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .faq
            .iter()
            .find(|f| f.id == id && f.user_id == user_id)
            .cloned())
    }

    async fn insert_faq(&self, item: models::FaqItem) -> StoreResult<models::FaqItem> {
        let mut tables = self.tables.write().await;
        tables.faq.push(item.clone());
        Ok(item)
    }

    async fn update_faq(&self, item: models::FaqItem) -> StoreResult<Option<models::FaqItem>> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables
            .faq
            .iter_mut()
            .find(|f| f.id == item.id && f.user_id == item.user_id)
        else {
            return Ok(None);
        };
        stored.question = item.question;
        stored.answer = item.answer;
        stored.language = item.language;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete_faq(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.faq.len();
        tables.faq.retain(|f| !(f.id == id && f.user_id == user_id));
        Ok(tables.faq.len() < before)
    }

    async fn fetch_settings(&self, user_id: Uuid) -> StoreResult<Vec<models::Setting>> {
        let tables = self.tables.read().await;
        let mut settings: Vec<models::Setting> = tables
            .settings
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        settings.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(settings)
    }

    async fn fetch_setting(
        &self,
        user_id: Uuid,
        key: &str,
    ) -> StoreResult<Option<models::Setting>> {
        let tables = self.tables.read().await;
        Ok(tables
            .settings
            .iter()
            .find(|s| s.user_id == user_id && s.key == key)
            .cloned())
    }

    async fn upsert_settings(
        &self,
        user_id: Uuid,
        values: Vec<(String, Option<String>)>,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        for (key, value) in values {
            match tables
                .settings
                .iter_mut()
                .find(|s| s.user_id == user_id && s.key == key)
            {
                Some(stored) => {
                    stored.value = value;
                    stored.updated_at = now;
                }
                None => tables.settings.push(models::Setting {
                    user_id,
                    key,
                    value,
                    updated_at: now,
                }),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn seeded() -> (MemoryStore, models::Tenant, models::MessagingAccount) {
        let store = MemoryStore::new();
        let tenant = store
            .insert_tenant(models::Tenant::provision("uid-1", Some("owner@example.com")))
            .await
            .unwrap();
        let account = store
            .insert_account(models::MessagingAccount::new(tenant.id, "PN1"))
            .await
            .unwrap();
        (store, tenant, account)
    }

    #[tokio::test]
    async fn conversation_pair_is_unique() {
        let (store, _, account) = seeded().await;
        let now = Utc::now();
        store
            .insert_conversation(models::Conversation::open(account.id, "+261", None, "a", now))
            .await
            .unwrap();
        let second = store
            .insert_conversation(models::Conversation::open(account.id, "+261", None, "b", now))
            .await;
        assert!(matches!(second, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn preview_only_moves_forward() {
        let (store, _, account) = seeded().await;
        let now = Utc::now();
        let conversation = store
            .insert_conversation(models::Conversation::open(account.id, "+261", None, "new", now))
            .await
            .unwrap();

        let stale = store
            .touch_conversation(conversation.id, "old", now - Duration::seconds(30))
            .await
            .unwrap();
        assert!(!stale);

        let fresh = store
            .touch_conversation(conversation.id, "newer", now + Duration::seconds(1))
            .await
            .unwrap();
        assert!(fresh);

        let stored = store
            .find_conversation(account.id, "+261")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.last_message.as_deref(), Some("newer"));
    }

    #[tokio::test]
    async fn conversations_are_tenant_scoped() {
        let (store, tenant, account) = seeded().await;
        let conversation = store
            .insert_conversation(models::Conversation::open(
                account.id,
                "+261",
                None,
                "hello",
                Utc::now(),
            ))
            .await
            .unwrap();

        let stranger = Uuid::new_v4();
        assert!(store
            .fetch_conversation(stranger, conversation.id)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .fetch_conversation(tenant.id, conversation.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn settings_upsert_overwrites() {
        let (store, tenant, _) = seeded().await;
        store
            .upsert_settings(tenant.id, vec![("language".into(), Some("fr".into()))])
            .await
            .unwrap();
        store
            .upsert_settings(tenant.id, vec![("language".into(), Some("mg".into()))])
            .await
            .unwrap();
        let settings = store.fetch_settings(tenant.id).await.unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].value.as_deref(), Some("mg"));
    }
}

use crate::errors::AppError;
use crate::helpers::Page;
use crate::models::{FaqItem, Language, Message, Product};
use crate::store::Store;
use uuid::Uuid;

/// What the responder knows about a conversation when it answers.
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    /// Oldest first.
    pub history: Vec<Message>,
    pub products: Vec<Product>,
    pub faq: Vec<FaqItem>,
}

/// Gathers history, catalog and FAQ in parallel. Reads only.
pub async fn build_context(
    store: &dyn Store,
    conversation_id: Uuid,
    user_id: Uuid,
    language: Language,
    history_window: i64,
    product_limit: i64,
) -> Result<ConversationContext, AppError> {
    let (history, products, faq) = tokio::join!(
        store.recent_messages(conversation_id, history_window),
        store.list_products(user_id, None, Page::new(1, product_limit)),
        store.list_faq(user_id, language),
    );

    let mut history = history?;
    history.reverse();

    Ok(ConversationContext {
        history,
        products: products?.0,
        faq: faq?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Conversation, ContentType, MessagingAccount, Tenant};
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};
    use serde_json::json;

    #[tokio::test]
    async fn history_is_bounded_and_chronological() {
        let store = MemoryStore::new();
        let tenant = store
            .insert_tenant(Tenant::provision("owner", None))
            .await
            .unwrap();
        let account = store
            .insert_account(MessagingAccount::new(tenant.id, "PN1"))
            .await
            .unwrap();
        let start = Utc::now() - Duration::minutes(10);
        let conversation = store
            .insert_conversation(Conversation::open(account.id, "+261", None, "m0", start))
            .await
            .unwrap();

        for i in 0..8 {
            store
                .insert_message(Message::inbound(
                    conversation.id,
                    ContentType::Text,
                    &format!("m{i}"),
                    None,
                    start + Duration::seconds(i),
                    &format!("wamid.{i}"),
                    json!({}),
                ))
                .await
                .unwrap();
        }

        let context = build_context(&store, conversation.id, tenant.id, Language::Fr, 6, 5)
            .await
            .unwrap();
        let contents: Vec<_> = context.history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4", "m5", "m6", "m7"]);
        assert!(context.products.is_empty());
        assert!(context.faq.is_empty());
    }
}

use super::classifier::{Intent, IntentClassifier};
use super::context::{build_context, ConversationContext};
use crate::connectors::{ChatMessage, ChatRole, CompletionConnector};
use crate::errors::AppError;
use crate::models::{Direction, FaqItem, Language, Product};
use crate::store::Store;
use std::fmt::Write;
use std::time::Duration;
use uuid::Uuid;

const DESCRIPTION_PREVIEW: usize = 100;

struct PromptText {
    persona: &'static str,
    products_heading: &'static str,
    in_stock: &'static str,
    out_of_stock: &'static str,
    faq_heading: &'static str,
    question: &'static str,
    answer: &'static str,
    instructions: &'static str,
    empty_reply: &'static str,
}

const FRENCH: PromptText = PromptText {
    persona: "Tu es un assistant commercial professionnel et poli. Tu aides les clients à trouver les produits qu'ils cherchent, réponds à leurs questions, et génères des devis quand nécessaire. Tu es concis, amical, et orienté vers la conversion.",
    products_heading: "Produits disponibles:",
    in_stock: "En stock",
    out_of_stock: "Rupture",
    faq_heading: "Questions fréquentes:",
    question: "Q",
    answer: "R",
    instructions: "Instructions: Réponds de manière naturelle et professionnelle. Si le client demande un devis, propose-lui de créer un devis avec les produits mentionnés.",
    empty_reply: "Désolé, je n'ai pas pu générer de réponse.",
};

const MALAGASY: PromptText = PromptText {
    persona: "Anao mpampiasa ara-barotra malagasy. Manome tolotra tsara, mamaly fanontaniana, ary manolotra devis raha ilaina. Be resaka, be fahasoavana, ary mifantoka amin'ny fampiroboroboana ny varotra.",
    products_heading: "Vokatra misy:",
    in_stock: "Misy",
    out_of_stock: "Lany",
    faq_heading: "Fanontaniana matetika:",
    question: "F",
    answer: "V",
    instructions: "Torolalana: Valio amin'ny fomba voajanahary sy matihanina. Raha mangataka devis ny mpanjifa, atolory azy ny hamorona devis miaraka amin'ireo vokatra voatonona.",
    empty_reply: "Miala tsiny, tsy afaka namorona valiny aho.",
};

fn text_for(language: Language) -> &'static PromptText {
    match language {
        Language::Fr => &FRENCH,
        Language::Mg => &MALAGASY,
    }
}

/// Persona, catalog block, FAQ block and closing instructions.
pub fn system_prompt(language: Language, products: &[Product], faq: &[FaqItem]) -> String {
    let text = text_for(language);
    let mut prompt = text.persona.to_string();

    if !products.is_empty() {
        let _ = write!(prompt, "\n\n{}\n", text.products_heading);
        for (index, product) in products.iter().enumerate() {
            let availability = if product.in_stock() {
                text.in_stock
            } else {
                text.out_of_stock
            };
            let _ = writeln!(
                prompt,
                "{}. {} - {} {} ({})",
                index + 1,
                product.title,
                product.price,
                product.currency,
                availability
            );
            if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
                let short: String = description.chars().take(DESCRIPTION_PREVIEW).collect();
                let _ = writeln!(prompt, "   {short}");
            }
        }
    }

    if !faq.is_empty() {
        let _ = write!(prompt, "\n\n{}\n", text.faq_heading);
        for item in faq {
            let _ = write!(
                prompt,
                "{}: {}\n{}: {}\n\n",
                text.question, item.question, text.answer, item.answer
            );
        }
    }

    prompt.push_str("\n\n");
    prompt.push_str(text.instructions);
    prompt
}

/// System turn, stored history as user/assistant turns, then the new message.
pub fn conversation_turns(
    language: Language,
    context: &ConversationContext,
    user_message: &str,
) -> Vec<ChatMessage> {
    let mut history = context.history.as_slice();
    // the triggering message is usually already persisted
    if let Some((last, rest)) = history.split_last() {
        if last.direction == Direction::In && last.content == user_message {
            history = rest;
        }
    }

    let mut turns = Vec::with_capacity(history.len() + 2);
    turns.push(ChatMessage::new(
        ChatRole::System,
        system_prompt(language, &context.products, &context.faq),
    ));
    turns.extend(history.iter().filter(|m| !m.content.trim().is_empty()).map(|m| {
        let role = match m.direction {
            Direction::In => ChatRole::User,
            Direction::Out => ChatRole::Assistant,
        };
        ChatMessage::new(role, m.content.clone())
    }));
    turns.push(ChatMessage::new(ChatRole::User, user_message));
    turns
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub intent: Intent,
    pub products: Vec<Product>,
}

/// Generates the assistant reply for one inbound message and classifies the exchange.
pub struct IntentResponder<'a> {
    store: &'a dyn Store,
    completion: &'a dyn CompletionConnector,
    classifier: &'a dyn IntentClassifier,
    history_window: i64,
    product_limit: i64,
    timeout: Duration,
}

impl<'a> IntentResponder<'a> {
    pub fn new(
        store: &'a dyn Store,
        completion: &'a dyn CompletionConnector,
        classifier: &'a dyn IntentClassifier,
    ) -> Self {
        Self {
            store,
            completion,
            classifier,
            history_window: 6,
            product_limit: 5,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_limits(mut self, history_window: i64, product_limit: i64) -> Self {
        self.history_window = history_window;
        self.product_limit = product_limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[tracing::instrument(name = "Generate reply", skip(self, user_message))]
    pub async fn generate(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        user_message: &str,
        language: Language,
    ) -> Result<Reply, AppError> {
        let context = build_context(
            self.store,
            conversation_id,
            user_id,
            language,
            self.history_window,
            self.product_limit,
        )
        .await?;
        let turns = conversation_turns(language, &context, user_message);

        let text = tokio::time::timeout(self.timeout, self.completion.complete(&turns))
            .await
            .map_err(|_| AppError::Timeout("completion provider"))?
            .map_err(|err| AppError::upstream("completion provider", err))?;
        let text = if text.trim().is_empty() {
            text_for(language).empty_reply.to_string()
        } else {
            text
        };

        let intent = self
            .classifier
            .classify(user_message, &text, &context.products, language);
        tracing::debug!(
            wants_quote = intent.wants_quote,
            wants_product = intent.wants_product,
            needs_human = intent.needs_human,
            "Classified exchange"
        );

        Ok(Reply {
            text,
            intent,
            products: context.products,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::completion::mock::MockCompletionConnector;
    use crate::models::{ContentType, Conversation, Message, MessagingAccount, Tenant};
    use crate::services::classifier::KeywordClassifier;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use serde_json::json;

    fn product(title: &str, stock: i32, description: Option<&str>) -> Product {
        Product {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            sku: None,
            title: title.to_string(),
            description: description.map(str::to_string),
            price: 15000.0,
            currency: "MGA".to_string(),
            stock,
            image_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn prompt_lists_catalog_and_faq() {
        let long = "x".repeat(150);
        let products = vec![
            product("Savon", 4, Some(&long)),
            product("Huile", 0, None),
        ];
        let faq = vec![FaqItem {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            question: "Livrez-vous ?".to_string(),
            answer: "Oui, à Tana.".to_string(),
            language: Language::Fr,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }];

        let prompt = system_prompt(Language::Fr, &products, &faq);
        assert!(prompt.starts_with("Tu es un assistant commercial"));
        assert!(prompt.contains("Produits disponibles:\n1. Savon - 15000 MGA (En stock)\n"));
        assert!(prompt.contains(&format!("   {}\n", "x".repeat(100))));
        assert!(!prompt.contains(&"x".repeat(101)));
        assert!(prompt.contains("2. Huile - 15000 MGA (Rupture)"));
        assert!(prompt.contains("Questions fréquentes:\nQ: Livrez-vous ?\nR: Oui, à Tana."));
        assert!(prompt.ends_with("avec les produits mentionnés."));
    }

    #[test]
    fn prompt_without_context_is_persona_and_instructions() {
        let prompt = system_prompt(Language::Mg, &[], &[]);
        assert!(prompt.starts_with("Anao mpampiasa"));
        assert!(!prompt.contains("Vokatra misy"));
        assert!(prompt.contains("Torolalana:"));
    }

    #[test]
    fn trigger_message_is_not_repeated() {
        let conversation_id = Uuid::new_v4();
        let context = ConversationContext {
            history: vec![
                Message::inbound(
                    conversation_id,
                    ContentType::Text,
                    "Bonjour",
                    None,
                    Utc::now(),
                    "w1",
                    json!({}),
                ),
                Message::outbound(conversation_id, "Bienvenue", None, json!({})),
                Message::inbound(
                    conversation_id,
                    ContentType::Text,
                    "Prix du savon ?",
                    None,
                    Utc::now(),
                    "w2",
                    json!({}),
                ),
            ],
            ..ConversationContext::default()
        };

        let turns = conversation_turns(Language::Fr, &context, "Prix du savon ?");
        let roles: Vec<_> = turns.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::System, ChatRole::User, ChatRole::Assistant, ChatRole::User]
        );
        assert_eq!(turns[3].content, "Prix du savon ?");
    }

    async fn seeded() -> (MemoryStore, Tenant, Conversation) {
        let store = MemoryStore::new();
        let tenant = store
            .insert_tenant(Tenant::provision("owner", None))
            .await
            .unwrap();
        let account = store
            .insert_account(MessagingAccount::new(tenant.id, "PN1"))
            .await
            .unwrap();
        let conversation = store
            .insert_conversation(Conversation::open(account.id, "+261", None, "hi", Utc::now()))
            .await
            .unwrap();
        let mut savon = product("Savon", 3, None);
        savon.user_id = tenant.id;
        store.insert_products(vec![savon]).await.unwrap();
        (store, tenant, conversation)
    }

    #[tokio::test]
    async fn generate_classifies_reply() {
        let (store, tenant, conversation) = seeded().await;
        let completion = MockCompletionConnector::replying("Voici le prix du savon.");
        let responder = IntentResponder::new(&store, &completion, &KeywordClassifier);

        let reply = responder
            .generate(conversation.id, tenant.id, "Je veux du savon", Language::Fr)
            .await
            .unwrap();
        assert_eq!(reply.text, "Voici le prix du savon.");
        assert!(reply.intent.wants_quote);
        assert_eq!(reply.intent.mentioned_products.len(), 1);

        let requests = completion.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0][0].content.contains("1. Savon"));
    }

    #[tokio::test]
    async fn empty_completion_uses_default_sentence() {
        let (store, tenant, conversation) = seeded().await;
        let completion = MockCompletionConnector::replying("  ");
        let responder = IntentResponder::new(&store, &completion, &KeywordClassifier);

        let reply = responder
            .generate(conversation.id, tenant.id, "Bonjour", Language::Fr)
            .await
            .unwrap();
        assert_eq!(reply.text, "Désolé, je n'ai pas pu générer de réponse.");
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let (store, tenant, conversation) = seeded().await;
        let completion =
            MockCompletionConnector::replying("trop tard").with_delay(Duration::from_millis(200));
        let responder = IntentResponder::new(&store, &completion, &KeywordClassifier)
            .with_timeout(Duration::from_millis(20));

        let err = responder
            .generate(conversation.id, tenant.id, "Bonjour", Language::Fr)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[tokio::test]
    async fn provider_failure_is_upstream_error() {
        let (store, tenant, conversation) = seeded().await;
        let completion = MockCompletionConnector::failing();
        let responder = IntentResponder::new(&store, &completion, &KeywordClassifier);

        let err = responder
            .generate(conversation.id, tenant.id, "Bonjour", Language::Fr)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));
    }
}

use super::classifier::{IntentClassifier, KeywordClassifier};
use super::delivery::ReplyDelivery;
use super::quote::QuoteGenerator;
use super::resolver::{ConversationResolver, Resolved};
use super::responder::IntentResponder;
use crate::errors::AppError;
use crate::forms::InboundMessage;
use crate::models::{Language, Message, Tenant, LANGUAGE_KEY};
use crate::state::AppState;
use crate::store::{Store, StoreError};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::Instrument;

/// Drives one inbound message from resolution to side effects.
#[derive(Clone)]
pub struct InboundPipeline {
    state: AppState,
    classifier: Arc<dyn IntentClassifier>,
}

impl InboundPipeline {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            classifier: Arc::new(KeywordClassifier),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Never fails: every error is logged against the message span.
    pub async fn process(&self, message: InboundMessage) {
        let span = tracing::info_span!(
            "inbound_message",
            phone_number_id = %message.phone_number_id,
            wa_message_id = %message.wa_message_id,
        );
        async {
            if let Err(err) = self.try_process(message).await {
                match err {
                    AppError::NotFound(what) => {
                        tracing::warn!("Inbound message dropped: {} not found", what)
                    }
                    err => tracing::error!("Inbound message failed: {}", err),
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn try_process(&self, inbound: InboundMessage) -> Result<(), AppError> {
        let store = self.state.store()?.as_ref();
        let pipeline = &self.state.pipeline;
        // provider timestamps have whole-second precision; rows are ordered on the server clock
        let received_at = Utc::now();

        let Resolved {
            account,
            conversation,
            ..
        } = ConversationResolver::new(store, pipeline.preview_length)
            .resolve(
                &inbound.phone_number_id,
                &inbound.from,
                inbound.contact_name.as_deref(),
                &inbound.content,
                received_at,
            )
            .await?;

        let record = Message::inbound(
            conversation.id,
            inbound.message_type,
            &inbound.content,
            inbound.media_id.clone(),
            received_at,
            &inbound.wa_message_id,
            inbound.metadata(),
        );
        match store.insert_message(record).await {
            Ok(_) => {}
            Err(StoreError::Duplicate(_)) => {
                tracing::info!("Duplicate delivery ignored");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }

        if !inbound.wants_reply() {
            tracing::debug!(message_type = ?inbound.message_type, "Recorded without reply");
            return Ok(());
        }

        let tenant = store
            .fetch_tenant(account.user_id)
            .await?
            .ok_or(AppError::NotFound("tenant"))?;
        let language = self.language_of(store, &tenant).await;

        let delivery = ReplyDelivery::new(
            store,
            self.state.whatsapp.as_deref(),
            pipeline.preview_length,
            pipeline.call_timeout(),
        );

        let reply = match self.state.completion() {
            Ok(completion) => {
                IntentResponder::new(store, completion.as_ref(), self.classifier.as_ref())
                    .with_limits(pipeline.history_window, pipeline.product_limit)
                    .with_timeout(pipeline.call_timeout())
                    .generate(conversation.id, tenant.id, &inbound.content, language)
                    .await
            }
            Err(err) => Err(err),
        };
        let reply = match reply {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!("Reply generation failed, sending fallback: {}", err);
                delivery
                    .deliver_fallback(&account, &conversation, language)
                    .await;
                return Ok(());
            }
        };

        let metadata = json!({ "ai_generated": true, "intentions": reply.intent.summary() });
        if let Err(err) = delivery
            .deliver(&account, &conversation, &reply.text, metadata)
            .await
        {
            tracing::error!("Reply delivery failed, sending fallback: {}", err);
            delivery
                .deliver_fallback(&account, &conversation, language)
                .await;
            return Ok(());
        }

        let generator = QuoteGenerator::new(
            store,
            self.state.renderer.as_deref(),
            self.state.notifier.as_deref(),
            &delivery,
            &pipeline.default_currency,
            pipeline.call_timeout(),
        );
        generator
            .maybe_create_quote(&tenant, &account, &conversation, &reply.intent, language)
            .await;
        generator
            .qualify_lead(&tenant, &conversation, &reply.intent, &inbound.content)
            .await;

        tracing::info!("Reply sent");
        Ok(())
    }

    async fn language_of(&self, store: &dyn Store, tenant: &Tenant) -> Language {
        let default = self.state.pipeline.default_language;
        match store.fetch_setting(tenant.id, LANGUAGE_KEY).await {
            Ok(setting) => Language::from_setting(
                setting.as_ref().and_then(|s| s.value.as_deref()),
                default,
            ),
            Err(err) => {
                tracing::warn!("Language setting unavailable, using {}: {}", default, err);
                default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{PipelineSettings, WebhookSettings};
    use crate::connectors::completion::mock::MockCompletionConnector;
    use crate::connectors::mailer::mock::MockLeadNotifier;
    use crate::connectors::renderer::mock::MockDocumentRenderer;
    use crate::connectors::whatsapp::mock::MockWhatsAppConnector;
    use crate::helpers::Page;
    use crate::models::{ContentType, Direction, MessagingAccount, Product, ProspectStatus};
    use crate::services::classifier::Intent;
    use crate::services::delivery::fallback_text;
    use crate::store::MemoryStore;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    struct Harness {
        store: Arc<MemoryStore>,
        gateway: Arc<MockWhatsAppConnector>,
        completion: Arc<MockCompletionConnector>,
        notifier: Arc<MockLeadNotifier>,
        tenant: Tenant,
        pipeline: InboundPipeline,
    }

    async fn harness(completion: MockCompletionConnector, gateway: MockWhatsAppConnector) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let tenant = store
            .insert_tenant(Tenant::provision("owner", Some("owner@shop.mg")))
            .await
            .unwrap();
        store
            .insert_account(MessagingAccount::new(tenant.id, "PN1"))
            .await
            .unwrap();
        store
            .insert_products(vec![Product {
                id: Uuid::new_v4(),
                user_id: tenant.id,
                sku: Some("PX-1".to_string()),
                title: "Produit X".to_string(),
                description: None,
                price: 100.0,
                currency: "MGA".to_string(),
                stock: 2,
                image_path: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }])
            .await
            .unwrap();

        let gateway = Arc::new(gateway);
        let completion = Arc::new(completion);
        let notifier = Arc::new(MockLeadNotifier::new());
        let state = AppState::new(PipelineSettings::default(), WebhookSettings::default())
            .with_store(store.clone())
            .with_whatsapp(Some(gateway.clone()))
            .with_completion(Some(completion.clone()))
            .with_renderer(Some(Arc::new(MockDocumentRenderer::new())))
            .with_notifier(Some(notifier.clone()));

        Harness {
            store,
            gateway,
            completion,
            notifier,
            tenant,
            pipeline: InboundPipeline::new(state),
        }
    }

    fn text(id: &str, body: &str) -> InboundMessage {
        InboundMessage {
            phone_number_id: "PN1".to_string(),
            from: "261340000000".to_string(),
            contact_name: Some("Rivo".to_string()),
            wa_message_id: id.to_string(),
            timestamp: Utc::now(),
            message_type: ContentType::Text,
            content: body.to_string(),
            media_id: None,
            raw: json!({ "id": id }),
        }
    }

    async fn messages(h: &Harness) -> Vec<Message> {
        let (conversations, _) = h
            .store
            .list_conversations(h.tenant.id, &Default::default(), Page::default())
            .await
            .unwrap();
        let (messages, _) = h
            .store
            .list_messages(conversations[0].id, Page::default())
            .await
            .unwrap();
        messages
    }

    #[tokio::test]
    async fn quote_request_runs_every_stage() {
        let h = harness(
            MockCompletionConnector::replying("Bien sûr, je prépare votre devis."),
            MockWhatsAppConnector::new(),
        )
        .await;

        h.pipeline
            .process(text("w1", "Je veux un devis pour le Produit X"))
            .await;

        let messages = messages(&h).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].direction, Direction::In);
        assert_eq!(messages[1].direction, Direction::Out);
        assert_eq!(messages[1].metadata["ai_generated"], true);
        assert_eq!(messages[1].metadata["intentions"]["wants_quote"], true);

        assert_eq!(h.gateway.texts(), vec!["Bien sûr, je prépare votre devis."]);
        assert_eq!(h.gateway.documents().len(), 1);

        let (quotes, _) = h
            .store
            .list_quotes(h.tenant.id, None, Page::default())
            .await
            .unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].total, 100.0);

        let (conversations, _) = h
            .store
            .list_conversations(h.tenant.id, &Default::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(conversations[0].prospect_status, Some(ProspectStatus::Qualified));
        assert_eq!(h.notifier.notices().len(), 1);
    }

    #[tokio::test]
    async fn provider_failure_sends_fallback() {
        let h = harness(MockCompletionConnector::failing(), MockWhatsAppConnector::new()).await;

        h.pipeline.process(text("w1", "Bonjour")).await;

        assert_eq!(h.gateway.texts(), vec![fallback_text(Language::Fr)]);
        let messages = messages(&h).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].metadata["fallback"], true);
    }

    #[tokio::test]
    async fn delivery_failure_sends_fallback() {
        let h = harness(
            MockCompletionConnector::replying("Bonjour !"),
            MockWhatsAppConnector::failing_first(1),
        )
        .await;

        h.pipeline.process(text("w1", "Bonjour")).await;

        assert_eq!(h.gateway.texts(), vec![fallback_text(Language::Fr)]);
    }

    #[tokio::test]
    async fn duplicate_delivery_is_processed_once() {
        let h = harness(
            MockCompletionConnector::replying("Bonjour !"),
            MockWhatsAppConnector::new(),
        )
        .await;

        h.pipeline.process(text("w1", "Bonjour")).await;
        h.pipeline.process(text("w1", "Bonjour")).await;

        assert_eq!(h.gateway.texts().len(), 1);
        assert_eq!(messages(&h).await.len(), 2);
    }

    #[tokio::test]
    async fn media_is_recorded_without_reply() {
        let h = harness(
            MockCompletionConnector::replying("unused"),
            MockWhatsAppConnector::new(),
        )
        .await;

        let mut image = text("w1", "photo");
        image.message_type = ContentType::Image;
        image.media_id = Some("media-1".to_string());
        h.pipeline.process(image).await;

        assert!(h.gateway.sent().is_empty());
        let messages = messages(&h).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].media_url.as_deref(), Some("media-1"));
    }

    #[tokio::test]
    async fn tenant_language_selects_fallback() {
        let h = harness(MockCompletionConnector::failing(), MockWhatsAppConnector::new()).await;
        h.store
            .upsert_settings(h.tenant.id, vec![(LANGUAGE_KEY.to_string(), Some("mg".to_string()))])
            .await
            .unwrap();

        h.pipeline.process(text("w1", "Manao ahoana")).await;

        assert_eq!(h.gateway.texts(), vec![fallback_text(Language::Mg)]);
    }

    #[tokio::test]
    async fn unknown_account_is_dropped() {
        let h = harness(
            MockCompletionConnector::replying("unused"),
            MockWhatsAppConnector::new(),
        )
        .await;

        let mut stray = text("w1", "Bonjour");
        stray.phone_number_id = "PN-unknown".to_string();
        h.pipeline.process(stray).await;

        assert!(h.gateway.sent().is_empty());
    }

    struct Silent;

    impl IntentClassifier for Silent {
        fn classify(&self, _: &str, _: &str, _: &[Product], _: Language) -> Intent {
            Intent::default()
        }
    }

    #[tokio::test]
    async fn replacement_classifier_drives_side_effects() {
        let h = harness(
            MockCompletionConnector::replying("Voici nos prix."),
            MockWhatsAppConnector::new(),
        )
        .await;
        let pipeline = h.pipeline.clone().with_classifier(Arc::new(Silent));

        pipeline
            .process(text("w1", "Je veux un devis pour le Produit X"))
            .await;

        assert_eq!(h.gateway.texts(), vec!["Voici nos prix."]);
        assert!(h.gateway.documents().is_empty());
        assert!(h.notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn coarse_provider_timestamps_keep_arrival_order() {
        let h = harness(MockCompletionConnector::replying("Reponse"), MockWhatsAppConnector::new()).await;

        h.pipeline.process(text("w1", "premier")).await;
        // whole-second provider clock, behind the reply just sent
        let provider_time = DateTime::from_timestamp(Utc::now().timestamp() - 2, 0).unwrap();
        let mut second = text("w2", "second message client");
        second.timestamp = provider_time;
        h.pipeline.process(second).await;

        let order: Vec<String> = messages(&h).await.into_iter().map(|m| m.content).collect();
        assert_eq!(order, vec!["premier", "Reponse", "second message client", "Reponse"]);

        let prompt: Vec<String> = h.completion.requests()[1]
            .iter()
            .skip(1)
            .map(|turn| turn.content.clone())
            .collect();
        assert_eq!(prompt, vec!["premier", "Reponse", "second message client"]);

        let stored = messages(&h).await;
        assert_eq!(stored[2].metadata["provider_timestamp"], json!(provider_time));
        let (conversations, _) = h
            .store
            .list_conversations(h.tenant.id, &Default::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(conversations[0].last_message_at, Some(stored[3].timestamp));
    }
}

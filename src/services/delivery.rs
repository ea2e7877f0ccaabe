use super::resolver::ConversationResolver;
use crate::connectors::{normalize_recipient, OutboundDocument, WhatsAppConnector};
use crate::errors::AppError;
use crate::models::{Conversation, Language, Message, MessagingAccount};
use crate::store::Store;
use serde_json::{json, Value};
use std::time::Duration;

pub fn fallback_text(language: Language) -> &'static str {
    match language {
        Language::Fr => "Désolé, je rencontre un problème technique. Un membre de notre équipe vous contactera bientôt.",
        Language::Mg => "Miala tsiny, misy olana ara-teknika. Hifandray aminao tsy ho ela ny ekipanay.",
    }
}

/// Sends outbound messages through the gateway and records them on the conversation.
pub struct ReplyDelivery<'a> {
    store: &'a dyn Store,
    gateway: Option<&'a dyn WhatsAppConnector>,
    preview_length: usize,
    timeout: Duration,
}

impl<'a> ReplyDelivery<'a> {
    pub fn new(
        store: &'a dyn Store,
        gateway: Option<&'a dyn WhatsAppConnector>,
        preview_length: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            gateway,
            preview_length,
            timeout,
        }
    }

    fn gateway(&self) -> Result<&'a dyn WhatsAppConnector, AppError> {
        self.gateway.ok_or(AppError::Unavailable("messaging gateway"))
    }

    /// Bounded gateway call. Returns the provider message id.
    pub async fn send_text(
        &self,
        phone_number_id: &str,
        to: &str,
        text: &str,
    ) -> Result<Option<String>, AppError> {
        let gateway = self.gateway()?;
        let to = normalize_recipient(to);
        tokio::time::timeout(self.timeout, gateway.send_text(phone_number_id, &to, text))
            .await
            .map_err(|_| AppError::Timeout("messaging gateway"))?
            .map_err(|err| AppError::upstream("messaging gateway", err))
    }

    pub async fn send_document(
        &self,
        phone_number_id: &str,
        to: &str,
        document: &OutboundDocument,
    ) -> Result<Option<String>, AppError> {
        let gateway = self.gateway()?;
        let to = normalize_recipient(to);
        tokio::time::timeout(
            self.timeout,
            gateway.send_document(phone_number_id, &to, document),
        )
        .await
        .map_err(|_| AppError::Timeout("messaging gateway"))?
        .map_err(|err| AppError::upstream("messaging gateway", err))
    }

    /// Persists an already delivered outbound text and moves the conversation preview.
    pub async fn record_outbound(
        &self,
        conversation: &Conversation,
        text: &str,
        wa_message_id: Option<String>,
        metadata: Value,
    ) -> Result<Message, AppError> {
        let message = self
            .store
            .insert_message(Message::outbound(conversation.id, text, wa_message_id, metadata))
            .await?;
        ConversationResolver::new(self.store, self.preview_length)
            .record_activity(conversation.id, text, message.timestamp)
            .await?;
        Ok(message)
    }

    /// Sends `text` to the conversation contact and records it.
    pub async fn deliver(
        &self,
        account: &MessagingAccount,
        conversation: &Conversation,
        text: &str,
        metadata: Value,
    ) -> Result<Message, AppError> {
        let wa_message_id = self
            .send_text(&account.phone_number_id, &conversation.contact_phone, text)
            .await?;
        self.record_outbound(conversation, text, wa_message_id, metadata)
            .await
    }

    /// Best effort apology. Failures are logged and swallowed.
    pub async fn deliver_fallback(
        &self,
        account: &MessagingAccount,
        conversation: &Conversation,
        language: Language,
    ) -> Option<Message> {
        match self
            .deliver(
                account,
                conversation,
                fallback_text(language),
                json!({ "fallback": true }),
            )
            .await
        {
            Ok(message) => Some(message),
            Err(err) => {
                tracing::error!(
                    conversation_id = %conversation.id,
                    "Failed to deliver fallback message: {}",
                    err
                );
                None
            }
        }
    }
}

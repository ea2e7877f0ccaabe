use super::classifier::Intent;
use super::delivery::ReplyDelivery;
use crate::connectors::{DocumentRenderer, LeadNotice, LeadNotifier, OutboundDocument, RenderedDocument};
use crate::errors::AppError;
use crate::models::{
    Conversation, Language, MessagingAccount, ProspectStatus, Quote, QuoteItem, Tenant,
};
use crate::store::Store;
use std::time::Duration;

pub fn document_caption(language: Language) -> &'static str {
    match language {
        Language::Fr => {
            "Voici votre devis. N'hésitez pas à nous contacter pour toute question."
        }
        Language::Mg => "Ity ny devis-nao. Aza misalasala mifandray aminay raha misy fanontaniana.",
    }
}

/// Renders the quote document and stores its path on the quote.
pub async fn render_document(
    store: &dyn Store,
    renderer: &dyn DocumentRenderer,
    quote: &mut Quote,
    tenant: &Tenant,
    timeout: Duration,
) -> Result<RenderedDocument, AppError> {
    let document = tokio::time::timeout(timeout, renderer.render_quote(quote, tenant))
        .await
        .map_err(|_| AppError::Timeout("document renderer"))?
        .map_err(|err| AppError::upstream("document renderer", err))?;

    store.set_quote_document(quote.id, &document.path).await?;
    quote.pdf_path = Some(document.path.clone());
    Ok(document)
}

/// Quote and lead side effects of a classified exchange. Every failure is logged here
/// and never reaches the caller.
pub struct QuoteGenerator<'a> {
    store: &'a dyn Store,
    renderer: Option<&'a dyn DocumentRenderer>,
    notifier: Option<&'a dyn LeadNotifier>,
    delivery: &'a ReplyDelivery<'a>,
    currency: String,
    timeout: Duration,
}

impl<'a> QuoteGenerator<'a> {
    pub fn new(
        store: &'a dyn Store,
        renderer: Option<&'a dyn DocumentRenderer>,
        notifier: Option<&'a dyn LeadNotifier>,
        delivery: &'a ReplyDelivery<'a>,
        currency: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            renderer,
            notifier,
            delivery,
            currency: currency.to_string(),
            timeout,
        }
    }

    /// Drafts a quote with one unit of every mentioned product when the contact asked for one.
    #[tracing::instrument(name = "Auto quote", skip_all, fields(conversation_id = %conversation.id))]
    pub async fn maybe_create_quote(
        &self,
        tenant: &Tenant,
        account: &MessagingAccount,
        conversation: &Conversation,
        intent: &Intent,
        language: Language,
    ) -> Option<Quote> {
        if !intent.wants_quote || intent.mentioned_products.is_empty() {
            return None;
        }

        let items: Vec<QuoteItem> = intent
            .mentioned_products
            .iter()
            .map(QuoteItem::single)
            .collect();
        let draft = Quote::draft(
            tenant.id,
            Some(conversation.id),
            &conversation.contact_phone,
            conversation.contact_name.as_deref(),
            items,
            0.0,
            &self.currency,
        );

        let mut quote = match self.store.insert_quote(draft).await {
            Ok(quote) => quote,
            Err(err) => {
                tracing::error!("Failed to persist auto quote: {}", err);
                return None;
            }
        };
        tracing::info!(quote_id = %quote.id, total = quote.total, "Auto quote drafted");

        let Some(renderer) = self.renderer else {
            tracing::warn!(quote_id = %quote.id, "Document renderer not configured, quote kept without PDF");
            return Some(quote);
        };

        let document =
            match render_document(self.store, renderer, &mut quote, tenant, self.timeout).await {
                Ok(document) => document,
                Err(err) => {
                    tracing::error!(quote_id = %quote.id, "Failed to render quote document: {}", err);
                    return Some(quote);
                }
            };

        let outbound = OutboundDocument {
            link: document.url,
            filename: quote.document_filename(),
            caption: document_caption(language).to_string(),
        };
        if let Err(err) = self
            .delivery
            .send_document(&account.phone_number_id, &conversation.contact_phone, &outbound)
            .await
        {
            tracing::error!(quote_id = %quote.id, "Failed to send quote document: {}", err);
        }

        Some(quote)
    }

    /// Marks the conversation qualified and tells the owner. The label stays even when the
    /// e-mail fails.
    #[tracing::instrument(name = "Qualify lead", skip_all, fields(conversation_id = %conversation.id))]
    pub async fn qualify_lead(
        &self,
        tenant: &Tenant,
        conversation: &Conversation,
        intent: &Intent,
        last_message: &str,
    ) {
        if !intent.qualifies_lead() {
            return;
        }

        if let Err(err) = self
            .store
            .set_prospect_status(conversation.id, ProspectStatus::Qualified)
            .await
        {
            tracing::error!("Failed to qualify conversation: {}", err);
            return;
        }

        let Some(owner_email) = tenant.email.clone() else {
            tracing::info!("Tenant has no e-mail, lead notification skipped");
            return;
        };
        let Some(notifier) = self.notifier else {
            tracing::info!("Mailer not configured, lead notification skipped");
            return;
        };

        let notice = LeadNotice {
            owner_email,
            company_name: tenant.company_name.clone(),
            contact_name: conversation.contact_name.clone(),
            contact_phone: conversation.contact_phone.clone(),
            prospect_status: ProspectStatus::Qualified.to_string(),
            last_message: Some(last_message.to_string()),
            conversation_id: conversation.id,
        };
        match tokio::time::timeout(self.timeout, notifier.notify_qualified_lead(&notice)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::error!("Failed to send lead notification: {}", err),
            Err(_) => tracing::error!("Lead notification timed out"),
        }
    }
}

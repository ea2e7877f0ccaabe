//! Outbound messaging gateway (WhatsApp Cloud API).

mod client;
pub mod mock;

pub use client::WhatsAppClient;

use super::config::ConnectorConfig;
use super::errors::ConnectorError;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundDocument {
    pub link: String,
    pub filename: String,
    pub caption: String,
}

/// Sends messages from a registered phone number. Returns the provider message id when given one.
#[async_trait]
pub trait WhatsAppConnector: Send + Sync {
    async fn send_text(
        &self,
        phone_number_id: &str,
        to: &str,
        body: &str,
    ) -> Result<Option<String>, ConnectorError>;

    async fn send_document(
        &self,
        phone_number_id: &str,
        to: &str,
        document: &OutboundDocument,
    ) -> Result<Option<String>, ConnectorError>;
}

/// The API wants the recipient as bare digits.
pub fn normalize_recipient(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

pub fn init(connector_config: &ConnectorConfig) -> Option<Arc<dyn WhatsAppConnector>> {
    let config = connector_config.whatsapp.as_ref().filter(|c| c.enabled)?;
    let mut config = config.clone();
    if config.access_token.is_none() {
        config.access_token = std::env::var("WHATSAPP_ACCESS_TOKEN").ok();
    }
    let Some(access_token) = config.access_token.clone() else {
        tracing::warn!("WhatsApp connector enabled but WHATSAPP_ACCESS_TOKEN is not set");
        return None;
    };

    match WhatsAppClient::new(&config, access_token) {
        Ok(client) => {
            tracing::info!("Initializing WhatsApp connector: {}", config.api_url);
            Some(Arc::new(client))
        }
        Err(err) => {
            tracing::error!("Failed to build WhatsApp client: {}", err);
            None
        }
    }
}

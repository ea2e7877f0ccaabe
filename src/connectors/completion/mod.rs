//! Large-language-model completion provider.

mod client;
pub mod mock;

pub use client::OpenAiClient;

use super::config::ConnectorConfig;
use super::errors::ConnectorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait CompletionConnector: Send + Sync {
    /// Returns the generated text, possibly empty.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ConnectorError>;
}

pub fn init(connector_config: &ConnectorConfig) -> Option<Arc<dyn CompletionConnector>> {
    let config = connector_config.completion.as_ref().filter(|c| c.enabled)?;
    let mut config = config.clone();
    if config.api_key.is_none() {
        config.api_key = std::env::var("OPENAI_API_KEY").ok();
    }
    let Some(api_key) = config.api_key.clone() else {
        tracing::warn!("Completion connector enabled but OPENAI_API_KEY is not set");
        return None;
    };

    match OpenAiClient::new(&config, api_key) {
        Ok(client) => {
            tracing::info!(model = %config.model, "Initializing completion connector");
            Some(Arc::new(client))
        }
        Err(err) => {
            tracing::error!("Failed to build completion client: {}", err);
            None
        }
    }
}

//! Quote document rendering and storage.

mod client;
pub mod mock;

pub use client::RendererClient;

use super::config::ConnectorConfig;
use super::errors::ConnectorError;
use crate::models::{Quote, Tenant};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A stored document: the storage path kept on the quote and its public link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub path: String,
    pub url: String,
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render_quote(
        &self,
        quote: &Quote,
        tenant: &Tenant,
    ) -> Result<RenderedDocument, ConnectorError>;

    /// Download link for an already stored document.
    fn public_url(&self, path: &str) -> String;
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub fn init(connector_config: &ConnectorConfig) -> Option<Arc<dyn DocumentRenderer>> {
    let config = connector_config.renderer.as_ref().filter(|c| c.enabled)?;
    let mut config = config.clone();
    if config.auth_token.is_none() {
        config.auth_token = std::env::var("RENDERER_AUTH_TOKEN").ok();
    }

    match RendererClient::new(&config) {
        Ok(client) => {
            tracing::info!("Initializing document renderer: {}", config.base_url);
            Some(Arc::new(client))
        }
        Err(err) => {
            tracing::error!("Failed to build renderer client: {}", err);
            None
        }
    }
}

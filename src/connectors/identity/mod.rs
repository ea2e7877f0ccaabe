//! Bearer token verification against the identity provider.

mod cache;
mod client;
pub mod mock;

pub use cache::TokenCache;
pub use client::HttpIdentityProvider;

use super::config::ConnectorConfig;
use super::errors::ConnectorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Verified subject of a bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(alias = "uid", alias = "sub", alias = "user_id")]
    pub subject: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `ConnectorError::Unauthorized` for an invalid or expired token.
    async fn verify(&self, token: &str) -> Result<IdentityClaims, ConnectorError>;
}

pub fn init(connector_config: &ConnectorConfig) -> Option<Arc<dyn IdentityProvider>> {
    let config = connector_config.identity.as_ref().filter(|c| c.enabled)?;

    match HttpIdentityProvider::new(config) {
        Ok(client) => {
            tracing::info!("Initializing identity provider: {}", config.verify_url);
            Some(Arc::new(client))
        }
        Err(err) => {
            tracing::error!("Failed to build identity client: {}", err);
            None
        }
    }
}

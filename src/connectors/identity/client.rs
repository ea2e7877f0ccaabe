use super::{IdentityClaims, IdentityProvider, TokenCache};
use crate::connectors::config::IdentityConfig;
use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::Instrument;

/// Asks the provider's verify endpoint who owns a token. Answers are cached.
pub struct HttpIdentityProvider {
    verify_url: String,
    http_client: reqwest::Client,
    cache: TokenCache<IdentityClaims>,
}

impl HttpIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Result<Self, ConnectorError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ConnectorError::Internal(err.to_string()))?;

        Ok(Self {
            verify_url: config.verify_url.clone(),
            http_client,
            cache: TokenCache::new(Duration::from_secs(config.cache_ttl_secs)),
        })
    }

    async fn fetch_claims(&self, token: &str) -> Result<IdentityClaims, ConnectorError> {
        let span = tracing::info_span!("identity_verify");
        let resp = self
            .http_client
            .get(&self.verify_url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .instrument(span)
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!("Identity provider rejected token: {}", status);
            return Err(ConnectorError::from_status(status, body));
        }

        resp.json::<IdentityClaims>()
            .await
            .map_err(|err| ConnectorError::InvalidResponse(err.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify(&self, token: &str) -> Result<IdentityClaims, ConnectorError> {
        if let Some(claims) = self.cache.get(token).await {
            return Ok(claims);
        }
        let claims = self.fetch_claims(token).await?;
        self.cache.insert(token.to_string(), claims.clone()).await;
        Ok(claims)
    }
}

use super::{IdentityClaims, IdentityProvider};
use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;

/// Accepts tokens of the form `valid-<subject>`.
#[derive(Default)]
pub struct MockIdentityProvider;

impl MockIdentityProvider {
    pub fn token_for(subject: &str) -> String {
        format!("valid-{subject}")
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn verify(&self, token: &str) -> Result<IdentityClaims, ConnectorError> {
        match token.strip_prefix("valid-") {
            Some(subject) if !subject.is_empty() => Ok(IdentityClaims {
                subject: subject.to_string(),
                email: Some(format!("{subject}@example.com")),
            }),
            _ => Err(ConnectorError::Unauthorized("invalid token".into())),
        }
    }
}

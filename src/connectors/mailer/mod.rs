//! Owner notifications by e-mail.

mod smtp;
pub mod mock;
mod template;

pub use smtp::SmtpNotifier;
pub use template::{LeadEmail, LeadTemplates};

use super::config::ConnectorConfig;
use super::errors::ConnectorError;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Facts about a freshly qualified lead, addressed to the tenant owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadNotice {
    pub owner_email: String,
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: String,
    pub prospect_status: String,
    pub last_message: Option<String>,
    pub conversation_id: Uuid,
}

#[async_trait]
pub trait LeadNotifier: Send + Sync {
    async fn notify_qualified_lead(&self, notice: &LeadNotice) -> Result<(), ConnectorError>;
}

pub fn init(connector_config: &ConnectorConfig) -> Option<Arc<dyn LeadNotifier>> {
    let config = connector_config.mailer.as_ref().filter(|c| c.enabled)?;
    let mut config = config.clone();
    if config.password.is_none() {
        config.password = std::env::var("SMTP_PASSWORD").ok();
    }

    match SmtpNotifier::new(&config) {
        Ok(notifier) => {
            tracing::info!(
                host = %config.smtp_host,
                port = config.smtp_port,
                "Initializing SMTP lead notifier"
            );
            Some(Arc::new(notifier))
        }
        Err(err) => {
            tracing::error!("Failed to build SMTP notifier: {}", err);
            None
        }
    }
}

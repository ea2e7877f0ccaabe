use super::{LeadNotice, LeadNotifier, LeadTemplates};
use crate::connectors::config::MailerConfig;
use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;
use lettre::{
    message::{MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    templates: LeadTemplates,
}

impl SmtpNotifier {
    pub fn new(config: &MailerConfig) -> Result<Self, ConnectorError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|err| ConnectorError::Internal(format!("SMTP transport: {err}")))?
            .port(config.smtp_port);
        if let Some(password) = &config.password {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from_address: config.from_address.clone(),
            templates: LeadTemplates::new(&config.frontend_url)?,
        })
    }

    fn build_message(&self, notice: &LeadNotice) -> Result<Message, ConnectorError> {
        let email = self.templates.render(notice)?;
        let from = self
            .from_address
            .parse()
            .map_err(|err| ConnectorError::Internal(format!("From: {err}")))?;
        let to = notice
            .owner_email
            .parse()
            .map_err(|err| ConnectorError::Internal(format!("To '{}': {err}", notice.owner_email)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::plain(email.text))
                    .singlepart(SinglePart::html(email.html)),
            )
            .map_err(|err| ConnectorError::Internal(format!("build e-mail: {err}")))
    }
}

#[async_trait]
impl LeadNotifier for SmtpNotifier {
    #[tracing::instrument(name = "Send lead notification", skip(self, notice), fields(conversation_id = %notice.conversation_id))]
    async fn notify_qualified_lead(&self, notice: &LeadNotice) -> Result<(), ConnectorError> {
        let message = self.build_message(notice)?;
        self.transport
            .send(message)
            .await
            .map_err(|err| ConnectorError::ServiceUnavailable(format!("SMTP send: {err}")))?;

        tracing::info!(to = %notice.owner_email, "Lead notification sent");
        Ok(())
    }
}

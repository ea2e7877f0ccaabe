use super::{normalize_recipient, OutboundDocument, WhatsAppConnector};
use crate::connectors::config::WhatsAppConfig;
use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::Instrument;

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

/// HTTP client for the Graph `/{phone_number_id}/messages` endpoint
pub struct WhatsAppClient {
    api_url: String,
    access_token: String,
    http_client: reqwest::Client,
}

impl WhatsAppClient {
    pub fn new(config: &WhatsAppConfig, access_token: String) -> Result<Self, ConnectorError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ConnectorError::Internal(err.to_string()))?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            access_token,
            http_client,
        })
    }

    async fn post_message(
        &self,
        phone_number_id: &str,
        payload: Value,
    ) -> Result<Option<String>, ConnectorError> {
        let span = tracing::info_span!("whatsapp_send", %phone_number_id);
        let url = format!("{}/{}/messages", self.api_url, phone_number_id);

        let resp = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .instrument(span)
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!("WhatsApp API rejected message: {} {}", status, body);
            return Err(ConnectorError::from_status(status, body));
        }

        let sent = resp
            .json::<SendResponse>()
            .await
            .map_err(|err| ConnectorError::InvalidResponse(err.to_string()))?;
        Ok(sent.messages.into_iter().next().map(|m| m.id))
    }
}

#[async_trait]
impl WhatsAppConnector for WhatsAppClient {
    async fn send_text(
        &self,
        phone_number_id: &str,
        to: &str,
        body: &str,
    ) -> Result<Option<String>, ConnectorError> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": normalize_recipient(to),
            "type": "text",
            "text": { "body": body },
        });
        self.post_message(phone_number_id, payload).await
    }

    async fn send_document(
        &self,
        phone_number_id: &str,
        to: &str,
        document: &OutboundDocument,
    ) -> Result<Option<String>, ConnectorError> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": normalize_recipient(to),
            "type": "document",
            "document": document,
        });
        self.post_message(phone_number_id, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> WhatsAppClient {
        let config = WhatsAppConfig {
            enabled: true,
            api_url: server.uri(),
            ..WhatsAppConfig::default()
        };
        WhatsAppClient::new(&config, "token".to_string()).unwrap()
    }

    #[tokio::test]
    async fn sends_text_to_digits_only_recipient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/PN1/messages"))
            .and(header("Authorization", "Bearer token"))
            .and(body_json(json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "261340000000",
                "type": "text",
                "text": { "body": "Bonjour" },
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "messages": [{ "id": "wamid.OUT1" }] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server)
            .send_text("PN1", "+261340000000", "Bonjour")
            .await
            .unwrap();
        assert_eq!(id.as_deref(), Some("wamid.OUT1"));
    }

    #[tokio::test]
    async fn sends_document_with_caption() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/PN1/messages"))
            .and(body_json(json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "261340000000",
                "type": "document",
                "document": {
                    "link": "https://files.test/devis.pdf",
                    "filename": "devis-1.pdf",
                    "caption": "Voici votre devis.",
                },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messages": [] })))
            .mount(&server)
            .await;

        let document = OutboundDocument {
            link: "https://files.test/devis.pdf".to_string(),
            filename: "devis-1.pdf".to_string(),
            caption: "Voici votre devis.".to_string(),
        };
        let id = client(&server)
            .send_document("PN1", "261340000000", &document)
            .await
            .unwrap();
        assert!(id.is_none());
    }

    #[tokio::test]
    async fn surfaces_rejections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&server)
            .await;

        let err = client(&server)
            .send_text("PN1", "261", "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::Unauthorized(_)));
    }
}

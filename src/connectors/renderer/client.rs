use super::{join_url, DocumentRenderer, RenderedDocument};
use crate::connectors::config::RendererConfig;
use crate::connectors::errors::ConnectorError;
use crate::models::{Quote, QuoteItem, Tenant};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::Instrument;

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    filename: String,
    quote_id: uuid::Uuid,
    company_name: Option<&'a str>,
    company_phone: Option<&'a str>,
    contact_name: Option<&'a str>,
    contact_phone: &'a str,
    items: &'a [QuoteItem],
    subtotal: f64,
    tax: f64,
    total: f64,
    currency: &'a str,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
struct RenderResponse {
    path: String,
    #[serde(default)]
    url: Option<String>,
}

pub struct RendererClient {
    base_url: String,
    public_base_url: String,
    auth_token: Option<String>,
    http_client: reqwest::Client,
}

impl RendererClient {
    pub fn new(config: &RendererConfig) -> Result<Self, ConnectorError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ConnectorError::Internal(err.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            public_base_url: config.public_base_url.clone(),
            auth_token: config.auth_token.clone(),
            http_client,
        })
    }
}

#[async_trait]
impl DocumentRenderer for RendererClient {
    async fn render_quote(
        &self,
        quote: &Quote,
        tenant: &Tenant,
    ) -> Result<RenderedDocument, ConnectorError> {
        let span = tracing::info_span!("render_quote", quote_id = %quote.id);
        let payload = RenderRequest {
            filename: quote.document_filename(),
            quote_id: quote.id,
            company_name: tenant.company_name.as_deref(),
            company_phone: tenant.phone.as_deref(),
            contact_name: quote.contact_name.as_deref(),
            contact_phone: &quote.contact_phone,
            items: &quote.items,
            subtotal: quote.subtotal,
            tax: quote.tax,
            total: quote.total,
            currency: &quote.currency,
            created_at: quote.created_at,
        };

        let mut request = self
            .http_client
            .post(format!("{}/render/devis", self.base_url))
            .json(&payload);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().instrument(span).await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!("Renderer returned {}: {}", status, body);
            return Err(ConnectorError::from_status(status, body));
        }

        let rendered = resp
            .json::<RenderResponse>()
            .await
            .map_err(|err| ConnectorError::InvalidResponse(err.to_string()))?;
        let url = rendered
            .url
            .unwrap_or_else(|| self.public_url(&rendered.path));

        Ok(RenderedDocument {
            path: rendered.path,
            url,
        })
    }

    fn public_url(&self, path: &str) -> String {
        join_url(&self.public_base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RendererClient {
        RendererClient::new(&RendererConfig {
            enabled: true,
            base_url: server.uri(),
            public_base_url: "https://files.test".to_string(),
            timeout_secs: 5,
            auth_token: Some("render-secret".to_string()),
        })
        .unwrap()
    }

    fn quote() -> (Quote, Tenant) {
        let tenant = Tenant::provision("uid-1", Some("shop@example.com"));
        let quote = Quote::draft(
            tenant.id,
            None,
            "+261340000000",
            Some("Rivo"),
            vec![QuoteItem {
                product_id: None,
                title: "Produit X".to_string(),
                quantity: 2,
                price: 100.0,
            }],
            0.0,
            "MGA",
        );
        (quote, tenant)
    }

    #[tokio::test]
    async fn builds_public_url_from_stored_path() {
        let server = MockServer::start().await;
        let (quote, tenant) = quote();
        Mock::given(method("POST"))
            .and(path("/render/devis"))
            .and(header("Authorization", "Bearer render-secret"))
            .and(body_partial_json(json!({
                "filename": quote.document_filename(),
                "company_name": "shop",
                "total": 200.0,
                "currency": "MGA"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "path": "devis/q.pdf" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let document = client(&server).render_quote(&quote, &tenant).await.unwrap();
        assert_eq!(document.path, "devis/q.pdf");
        assert_eq!(document.url, "https://files.test/devis/q.pdf");
    }

    #[tokio::test]
    async fn renderer_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let (quote, tenant) = quote();
        let err = client(&server)
            .render_quote(&quote, &tenant)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::ServiceUnavailable(_)));
    }
}

use super::{ChatMessage, CompletionConnector};
use crate::connectors::config::CompletionConfig;
use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::Instrument;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI compatible `/chat/completions` endpoint
pub struct OpenAiClient {
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: &CompletionConfig, api_key: String) -> Result<Self, ConnectorError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ConnectorError::Internal(err.to_string()))?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            http_client,
        })
    }
}

#[async_trait]
impl CompletionConnector for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ConnectorError> {
        let span = tracing::info_span!("completion_request", model = %self.model, turns = messages.len());
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = self
            .http_client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .instrument(span)
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!("Completion provider returned {}: {}", status, body);
            return Err(ConnectorError::from_status(status, body));
        }

        let completion = resp
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|err| ConnectorError::InvalidResponse(err.to_string()))?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

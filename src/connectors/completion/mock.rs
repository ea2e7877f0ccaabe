use super::{ChatMessage, CompletionConnector};
use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

enum Behaviour {
    Reply(String),
    Fail,
}

/// Canned completion provider that keeps the prompts it was given.
pub struct MockCompletionConnector {
    behaviour: Behaviour,
    delay: Option<Duration>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockCompletionConnector {
    pub fn replying(reply: &str) -> Self {
        Self {
            behaviour: Behaviour::Reply(reply.to_string()),
            delay: None,
            requests: Mutex::new(vec![]),
        }
    }

    pub fn failing() -> Self {
        Self {
            behaviour: Behaviour::Fail,
            delay: None,
            requests: Mutex::new(vec![]),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionConnector for MockCompletionConnector {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ConnectorError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.behaviour {
            Behaviour::Reply(reply) => Ok(reply.clone()),
            Behaviour::Fail => Err(ConnectorError::ServiceUnavailable("mock provider down".into())),
        }
    }
}

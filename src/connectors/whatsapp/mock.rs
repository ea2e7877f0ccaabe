use super::{OutboundDocument, WhatsAppConnector};
use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum SentPayload {
    Text(String),
    Document(OutboundDocument),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub phone_number_id: String,
    pub to: String,
    pub payload: SentPayload,
}

/// Records every send. Can be told to fail or to stall.
#[derive(Default)]
pub struct MockWhatsAppConnector {
    sent: Mutex<Vec<SentMessage>>,
    fail_text: AtomicBool,
    failures_left: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

impl MockWhatsAppConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every text send fails.
    pub fn failing() -> Self {
        let mock = Self::default();
        mock.fail_text.store(true, Ordering::SeqCst);
        mock
    }

    /// The next `count` text sends fail, later ones succeed.
    pub fn failing_first(count: usize) -> Self {
        let mock = Self::default();
        mock.failures_left.store(count, Ordering::SeqCst);
        mock
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        if let Ok(mut slot) = self.delay.lock() {
            *slot = Some(delay);
        }
        self
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m.payload {
                SentPayload::Text(text) => Some(text),
                SentPayload::Document(_) => None,
            })
            .collect()
    }

    pub fn documents(&self) -> Vec<OutboundDocument> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m.payload {
                SentPayload::Document(document) => Some(document),
                SentPayload::Text(_) => None,
            })
            .collect()
    }

    async fn stall(&self) {
        let delay = self.delay.lock().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn record(&self, phone_number_id: &str, to: &str, payload: SentPayload) -> Option<String> {
        let mut sent = self.sent.lock().ok()?;
        sent.push(SentMessage {
            phone_number_id: phone_number_id.to_string(),
            to: to.to_string(),
            payload,
        });
        Some(format!("wamid.mock.{}", sent.len()))
    }
}

#[async_trait]
impl WhatsAppConnector for MockWhatsAppConnector {
    async fn send_text(
        &self,
        phone_number_id: &str,
        to: &str,
        body: &str,
    ) -> Result<Option<String>, ConnectorError> {
        self.stall().await;
        if self.fail_text.load(Ordering::SeqCst) {
            return Err(ConnectorError::ServiceUnavailable("mock gateway down".into()));
        }
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(ConnectorError::ServiceUnavailable("mock gateway hiccup".into()));
        }
        Ok(self.record(phone_number_id, to, SentPayload::Text(body.to_string())))
    }

    async fn send_document(
        &self,
        phone_number_id: &str,
        to: &str,
        document: &OutboundDocument,
    ) -> Result<Option<String>, ConnectorError> {
        self.stall().await;
        Ok(self.record(phone_number_id, to, SentPayload::Document(document.clone())))
    }
}

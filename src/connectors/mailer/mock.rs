use super::{LeadNotice, LeadNotifier};
use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockLeadNotifier {
    fail: AtomicBool,
    notices: Mutex<Vec<LeadNotice>>,
}

impl MockLeadNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let mock = Self::default();
        mock.fail.store(true, Ordering::SeqCst);
        mock
    }

    pub fn notices(&self) -> Vec<LeadNotice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LeadNotifier for MockLeadNotifier {
    async fn notify_qualified_lead(&self, notice: &LeadNotice) -> Result<(), ConnectorError> {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice.clone());
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ConnectorError::ServiceUnavailable("mock smtp down".into()));
        }
        Ok(())
    }
}

use super::{join_url, DocumentRenderer, RenderedDocument};
use crate::connectors::errors::ConnectorError;
use crate::models::{Quote, Tenant};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

const PUBLIC_BASE: &str = "https://files.test";

/// Pretends to store `devis/{id}.pdf`.
#[derive(Default)]
pub struct MockDocumentRenderer {
    fail: AtomicBool,
    renders: AtomicUsize,
}

impl MockDocumentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let mock = Self::default();
        mock.fail.store(true, Ordering::SeqCst);
        mock
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentRenderer for MockDocumentRenderer {
    async fn render_quote(
        &self,
        quote: &Quote,
        _tenant: &Tenant,
    ) -> Result<RenderedDocument, ConnectorError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ConnectorError::ServiceUnavailable("mock renderer down".into()));
        }
        let path = format!("devis/{}.pdf", quote.id);
        Ok(RenderedDocument {
            url: self.public_url(&path),
            path,
        })
    }

    fn public_url(&self, path: &str) -> String {
        join_url(PUBLIC_BASE, path)
    }
}

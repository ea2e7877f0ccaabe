//! Collaborators shared by the routes and the inbound pipeline.

use crate::configuration::{PipelineSettings, WebhookSettings};
use crate::connectors::{
    CompletionConnector, DocumentRenderer, IdentityProvider, LeadNotifier, WhatsAppConnector,
};
use crate::errors::AppError;
use crate::store::Store;
use std::sync::Arc;

/// Every collaborator is optional. Accessors fail with a 503 `AppError::Unavailable`
/// when the one an operation needs was not configured.
#[derive(Clone, Default)]
pub struct AppState {
    pub store: Option<Arc<dyn Store>>,
    pub whatsapp: Option<Arc<dyn WhatsAppConnector>>,
    pub completion: Option<Arc<dyn CompletionConnector>>,
    pub renderer: Option<Arc<dyn DocumentRenderer>>,
    pub notifier: Option<Arc<dyn LeadNotifier>>,
    pub identity: Option<Arc<dyn IdentityProvider>>,
    pub pipeline: PipelineSettings,
    pub webhook: WebhookSettings,
}

impl AppState {
    pub fn new(pipeline: PipelineSettings, webhook: WebhookSettings) -> Self {
        Self {
            pipeline,
            webhook,
            ..Self::default()
        }
    }

    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_whatsapp(mut self, whatsapp: Option<Arc<dyn WhatsAppConnector>>) -> Self {
        self.whatsapp = whatsapp;
        self
    }

    pub fn with_completion(mut self, completion: Option<Arc<dyn CompletionConnector>>) -> Self {
        self.completion = completion;
        self
    }

    pub fn with_renderer(mut self, renderer: Option<Arc<dyn DocumentRenderer>>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_notifier(mut self, notifier: Option<Arc<dyn LeadNotifier>>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_identity(mut self, identity: Option<Arc<dyn IdentityProvider>>) -> Self {
        self.identity = identity;
        self
    }

    pub fn store(&self) -> Result<&Arc<dyn Store>, AppError> {
        self.store.as_ref().ok_or(AppError::Unavailable("data store"))
    }

    pub fn whatsapp(&self) -> Result<&Arc<dyn WhatsAppConnector>, AppError> {
        self.whatsapp
            .as_ref()
            .ok_or(AppError::Unavailable("messaging gateway"))
    }

    pub fn completion(&self) -> Result<&Arc<dyn CompletionConnector>, AppError> {
        self.completion
            .as_ref()
            .ok_or(AppError::Unavailable("completion provider"))
    }

    pub fn renderer(&self) -> Result<&Arc<dyn DocumentRenderer>, AppError> {
        self.renderer
            .as_ref()
            .ok_or(AppError::Unavailable("document renderer"))
    }

    pub fn notifier(&self) -> Result<&Arc<dyn LeadNotifier>, AppError> {
        self.notifier.as_ref().ok_or(AppError::Unavailable("mailer"))
    }

    pub fn identity(&self) -> Result<&Arc<dyn IdentityProvider>, AppError> {
        self.identity
            .as_ref()
            .ok_or(AppError::Unavailable("identity provider"))
    }
}

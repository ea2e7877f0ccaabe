#![allow(dead_code)]

use devis_assistant::configuration::{PipelineSettings, WebhookSettings};
use devis_assistant::connectors::completion::mock::MockCompletionConnector;
use devis_assistant::connectors::identity::mock::MockIdentityProvider;
use devis_assistant::connectors::mailer::mock::MockLeadNotifier;
use devis_assistant::connectors::renderer::mock::MockDocumentRenderer;
use devis_assistant::connectors::whatsapp::mock::MockWhatsAppConnector;
use devis_assistant::connectors::IdentityClaims;
use devis_assistant::helpers::signature;
use devis_assistant::ingress::{self, IngressWorker};
use devis_assistant::models::{MessagingAccount, Tenant};
use devis_assistant::services::{provision_tenant, InboundPipeline};
use devis_assistant::state::AppState;
use devis_assistant::store::{MemoryStore, Store};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

pub const APP_SECRET: &str = "test-app-secret";
pub const VERIFY_TOKEN: &str = "test-verify-token";
pub const PHONE_NUMBER_ID: &str = "PN1";

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub whatsapp: Arc<MockWhatsAppConnector>,
    pub completion: Arc<MockCompletionConnector>,
    pub renderer: Arc<MockDocumentRenderer>,
    pub notifier: Arc<MockLeadNotifier>,
    pub client: reqwest::Client,
    pub worker: Option<IngressWorker>,
}

pub struct Doubles {
    pub whatsapp: MockWhatsAppConnector,
    pub completion: MockCompletionConnector,
}

impl Default for Doubles {
    fn default() -> Self {
        Self {
            whatsapp: MockWhatsAppConnector::new(),
            completion: MockCompletionConnector::replying("Bonjour, comment puis-je vous aider ?"),
        }
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Doubles::default()).await
}

pub async fn spawn_app_with(doubles: Doubles) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = Arc::new(MemoryStore::new());
    let whatsapp = Arc::new(doubles.whatsapp);
    let completion = Arc::new(doubles.completion);
    let renderer = Arc::new(MockDocumentRenderer::new());
    let notifier = Arc::new(MockLeadNotifier::new());

    let pipeline = PipelineSettings {
        call_timeout_secs: 5,
        ..PipelineSettings::default()
    };
    let webhook = WebhookSettings {
        verify_token: Some(VERIFY_TOKEN.to_string()),
        app_secret: Some(APP_SECRET.to_string()),
        require_signature: false,
    };
    let state = AppState::new(pipeline, webhook)
        .with_store(store.clone())
        .with_whatsapp(Some(whatsapp.clone()))
        .with_completion(Some(completion.clone()))
        .with_renderer(Some(renderer.clone()))
        .with_notifier(Some(notifier.clone()))
        .with_identity(Some(Arc::new(MockIdentityProvider)));

    let (queue, worker) = ingress::start(InboundPipeline::new(state.clone()), 64, 4);
    let server = devis_assistant::startup::run(listener, state, queue)
        .await
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        whatsapp,
        completion,
        renderer,
        notifier,
        client: reqwest::Client::new(),
        worker: Some(worker),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Tenant behind `MockIdentityProvider::token_for(subject)`.
    pub async fn tenant(&self, subject: &str) -> Tenant {
        let claims = IdentityClaims {
            subject: subject.to_string(),
            email: Some(format!("{subject}@example.com")),
        };
        provision_tenant(self.store.as_ref(), &claims).await.unwrap()
    }

    pub async fn tenant_with_account(&self, subject: &str, phone_number_id: &str) -> Tenant {
        let tenant = self.tenant(subject).await;
        self.store
            .insert_account(MessagingAccount::new(tenant.id, phone_number_id))
            .await
            .unwrap();
        tenant
    }

    pub fn get(&self, subject: &str, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .bearer_auth(MockIdentityProvider::token_for(subject))
    }

    pub fn post(&self, subject: &str, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .bearer_auth(MockIdentityProvider::token_for(subject))
    }

    pub fn put(&self, subject: &str, path: &str) -> reqwest::RequestBuilder {
        self.client
            .put(self.url(path))
            .bearer_auth(MockIdentityProvider::token_for(subject))
    }

    pub fn delete(&self, subject: &str, path: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .bearer_auth(MockIdentityProvider::token_for(subject))
    }

    pub async fn post_webhook(&self, body: &Value) -> reqwest::Response {
        let raw = serde_json::to_vec(body).unwrap();
        let signature = signature::sign(APP_SECRET, &raw).unwrap();
        self.client
            .post(self.url("/webhooks/whatsapp"))
            .header("content-type", "application/json")
            .header(signature::SIGNATURE_HEADER, signature)
            .body(raw)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Polls until `check` holds or two seconds pass.
    pub async fn eventually<F>(&self, check: F) -> bool
    where
        F: Fn() -> bool,
    {
        for _ in 0..100 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

pub fn text_message(id: &str, from: &str, body: &str) -> Value {
    json!({
        "from": from,
        "id": id,
        "timestamp": chrono::Utc::now().timestamp().to_string(),
        "type": "text",
        "text": { "body": body }
    })
}

pub fn envelope(phone_number_id: &str, messages: Vec<Value>) -> Value {
    json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "WABA1",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": { "display_phone_number": "261340000001", "phone_number_id": phone_number_id },
                    "contacts": [{ "profile": { "name": "Rivo" }, "wa_id": "261340000000" }],
                    "messages": messages
                }
            }]
        }]
    })
}

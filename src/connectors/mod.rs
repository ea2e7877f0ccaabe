//! External service connectors
//!
//! Every collaborator outside the process sits behind a trait so the pipeline and the routes
//! never depend on the HTTP or SMTP implementation:
//!
//! 1. Trait + shared types in `{service}/mod.rs`
//! 2. Real client in `{service}/client.rs` (or `smtp.rs`)
//! 3. In-process double in `{service}/mock.rs` for tests
//! 4. `init` builds the client from [`ConnectorConfig`] and returns `None` when the section is
//!    missing, disabled or lacks its secret.

pub mod completion;
pub mod config;
pub mod errors;
pub mod identity;
pub mod mailer;
pub mod renderer;
pub mod whatsapp;

pub use completion::{ChatMessage, ChatRole, CompletionConnector};
pub use config::{
    CompletionConfig, ConnectorConfig, IdentityConfig, MailerConfig, RendererConfig,
    WhatsAppConfig,
};
pub use errors::ConnectorError;
pub use identity::{IdentityClaims, IdentityProvider};
pub use mailer::{LeadNotice, LeadNotifier};
pub use renderer::{DocumentRenderer, RenderedDocument};
pub use whatsapp::{normalize_recipient, OutboundDocument, WhatsAppConnector};

use crate::connectors::ConnectorConfig;
use crate::models::Language;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub app_host: String,
    #[serde(default = "default_port")]
    pub app_port: u16,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
    #[serde(default)]
    pub webhook: WebhookSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub connectors: ConnectorConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_host: default_host(),
            app_port: default_port(),
            environment: Environment::default(),
            database: None,
            webhook: WebhookSettings::default(),
            pipeline: PipelineSettings::default(),
            connectors: ConnectorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Provider webhook verification
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookSettings {
    /// Echoed handshake token. From env: WHATSAPP_VERIFY_TOKEN
    pub verify_token: Option<String>,
    /// HMAC key for `x-hub-signature-256`. From env: WHATSAPP_APP_SECRET
    #[serde(skip)]
    pub app_secret: Option<String>,
    /// Reject deliveries without a signature header when a secret is set
    pub require_signature: bool,
}

/// Inbound message processing knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub history_window: i64,
    pub product_limit: i64,
    pub preview_length: usize,
    pub call_timeout_secs: u64,
    pub workers: usize,
    pub queue_capacity: usize,
    pub shutdown_grace_secs: u64,
    pub default_language: Language,
    pub default_currency: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            history_window: 6,
            product_limit: 5,
            preview_length: 200,
            call_timeout_secs: 30,
            workers: 8,
            queue_capacity: 1024,
            shutdown_grace_secs: 20,
            default_language: Language::Fr,
            default_currency: "MGA".to_string(),
        }
    }
}

impl PipelineSettings {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .build()?;

    let mut config: Settings = settings.try_deserialize()?;
    apply_env_secrets(&mut config);

    Ok(config)
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Secrets never live in the configuration file.
fn apply_env_secrets(config: &mut Settings) {
    if let Some(token) = env_var("WHATSAPP_VERIFY_TOKEN") {
        config.webhook.verify_token = Some(token);
    }
    config.webhook.app_secret = env_var("WHATSAPP_APP_SECRET");

    if let Some(environment) = env_var("APP_ENVIRONMENT") {
        config.environment = match environment.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };
    }

    if let Some(whatsapp) = config.connectors.whatsapp.as_mut() {
        whatsapp.access_token = env_var("WHATSAPP_ACCESS_TOKEN");
    }
    if let Some(completion) = config.connectors.completion.as_mut() {
        completion.api_key = env_var("OPENAI_API_KEY");
    }
    if let Some(renderer) = config.connectors.renderer.as_mut() {
        renderer.auth_token = env_var("RENDERER_AUTH_TOKEN");
    }
    if let Some(mailer) = config.connectors.mailer.as_mut() {
        mailer.password = env_var("SMTP_PASSWORD");
    }
}

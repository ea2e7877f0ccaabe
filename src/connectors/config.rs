use serde::{Deserialize, Serialize};

/// Configuration for external service connectors. A missing or disabled section leaves
/// the collaborator unconfigured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub whatsapp: Option<WhatsAppConfig>,
    pub completion: Option<CompletionConfig>,
    pub renderer: Option<RendererConfig>,
    pub mailer: Option<MailerConfig>,
    pub identity: Option<IdentityConfig>,
}

/// WhatsApp Cloud API (Graph) gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    pub enabled: bool,
    /// Graph API root including the version, e.g. https://graph.facebook.com/v18.0
    pub api_url: String,
    pub timeout_secs: u64,
    /// From env: WHATSAPP_ACCESS_TOKEN
    #[serde(skip)]
    pub access_token: Option<String>,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://graph.facebook.com/v18.0".to_string(),
            timeout_secs: 15,
            access_token: None,
        }
    }
}

/// OpenAI-compatible chat completion provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub enabled: bool,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// From env: OPENAI_API_KEY
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

/// Document rendering + blob storage service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Prefix for stored documents' public links
    pub public_base_url: String,
    pub timeout_secs: u64,
    /// From env: RENDERER_AUTH_TOKEN
    #[serde(skip)]
    pub auth_token: Option<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:4200".to_string(),
            public_base_url: "http://localhost:4200/files".to_string(),
            timeout_secs: 30,
            auth_token: None,
        }
    }
}

/// SMTP lead notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailerConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub from_address: String,
    /// Dashboard root used in notification links
    pub frontend_url: String,
    /// From env: SMTP_PASSWORD
    #[serde(skip)]
    pub password: Option<String>,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            username: String::new(),
            from_address: "noreply@localhost".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            password: None,
        }
    }
}

/// Bearer token verification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub enabled: bool,
    /// GET endpoint answering `{uid|sub, email}` for a valid bearer token
    pub verify_url: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            verify_url: "http://localhost:9099/verify".to_string(),
            timeout_secs: 10,
            cache_ttl_secs: 60,
        }
    }
}

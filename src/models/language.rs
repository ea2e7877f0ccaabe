use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Reply language of a tenant. Drives persona, fallback text and classifier keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    Mg,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::Mg => "mg",
        }
    }

    /// Reads the tenant `language` setting, unknown values fall back to `default`.
    pub fn from_setting(value: Option<&str>, default: Language) -> Language {
        value
            .and_then(|v| v.parse::<Language>().ok())
            .unwrap_or(default)
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fr" => Ok(Language::Fr),
            "mg" => Ok(Language::Mg),
            other => Err(format!("unsupported language {other}")),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

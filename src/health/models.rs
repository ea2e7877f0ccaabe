use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
    /// Optional collaborator that was left out of the configuration.
    NotConfigured,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl ComponentHealth {
    pub fn healthy(response_time_ms: Option<u64>) -> Self {
        Self {
            status: ComponentStatus::Healthy,
            configured: true,
            message: None,
            response_time_ms,
        }
    }

    pub fn unhealthy(error: String) -> Self {
        Self {
            status: ComponentStatus::Unhealthy,
            configured: true,
            message: Some(error),
            response_time_ms: None,
        }
    }

    pub fn degraded(message: String, response_time_ms: Option<u64>) -> Self {
        Self {
            status: ComponentStatus::Degraded,
            configured: true,
            message: Some(message),
            response_time_ms,
        }
    }

    pub fn not_configured() -> Self {
        Self {
            status: ComponentStatus::NotConfigured,
            configured: false,
            message: None,
            response_time_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: ComponentStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthCheckResponse {
    pub fn new(version: String, uptime_seconds: u64) -> Self {
        Self {
            status: ComponentStatus::Healthy,
            timestamp: Utc::now(),
            version,
            uptime_seconds,
            components: HashMap::new(),
        }
    }

    /// Unhealthy wins over degraded. Unconfigured connectors leave the status alone.
    pub fn add_component(&mut self, name: &str, health: ComponentHealth) {
        match health.status {
            ComponentStatus::Unhealthy => self.status = ComponentStatus::Unhealthy,
            ComponentStatus::Degraded if self.status != ComponentStatus::Unhealthy => {
                self.status = ComponentStatus::Degraded
            }
            _ => {}
        }
        self.components.insert(name.to_string(), health);
    }

    pub fn is_unhealthy(&self) -> bool {
        self.status == ComponentStatus::Unhealthy
    }
}

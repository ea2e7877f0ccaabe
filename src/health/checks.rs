use super::models::{ComponentHealth, HealthCheckResponse};
use crate::state::AppState;
use std::time::{Duration, Instant};
use tokio::time::timeout;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const SLOW_RESPONSE_THRESHOLD_MS: u64 = 1000;

pub struct HealthChecker {
    state: AppState,
    start_time: Instant,
}

impl HealthChecker {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            start_time: Instant::now(),
        }
    }

    pub async fn check_all(&self) -> HealthCheckResponse {
        let version = env!("CARGO_PKG_VERSION").to_string();
        let uptime = self.start_time.elapsed().as_secs();
        let mut response = HealthCheckResponse::new(version, uptime);

        let store_health = timeout(CHECK_TIMEOUT, self.check_store())
            .await
            .unwrap_or_else(|_| ComponentHealth::unhealthy("Timeout".to_string()));
        response.add_component("store", store_health);

        let connectors = [
            ("whatsapp", self.state.whatsapp.is_some()),
            ("completion", self.state.completion.is_some()),
            ("renderer", self.state.renderer.is_some()),
            ("mailer", self.state.notifier.is_some()),
            ("identity", self.state.identity.is_some()),
        ];
        for (name, configured) in connectors {
            let health = if configured {
                ComponentHealth::healthy(None)
            } else {
                ComponentHealth::not_configured()
            };
            response.add_component(name, health);
        }

        response
    }

    #[tracing::instrument(name = "Check store health", skip(self))]
    async fn check_store(&self) -> ComponentHealth {
        let Some(store) = self.state.store.as_ref() else {
            return ComponentHealth::not_configured();
        };

        let start = Instant::now();
        match store.ping().await {
            Ok(()) => {
                let elapsed = start.elapsed().as_millis() as u64;
                if elapsed > SLOW_RESPONSE_THRESHOLD_MS {
                    ComponentHealth::degraded("Store responding slowly".to_string(), Some(elapsed))
                } else {
                    ComponentHealth::healthy(Some(elapsed))
                }
            }
            Err(err) => {
                tracing::error!("Store health check failed: {:?}", err);
                ComponentHealth::unhealthy(format!("Store error: {}", err))
            }
        }
    }
}

use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Subscription handshake. Echoes the challenge when the token matches.
#[tracing::instrument(name = "Verify webhook subscription", skip(state, query))]
#[get("")]
pub async fn verify_handler(
    state: web::Data<AppState>,
    query: web::Query<VerifyQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    let expected = state.webhook.verify_token.as_deref();
    let token_matches = matches!(
        (expected, query.verify_token.as_deref()),
        (Some(expected), Some(given)) if expected == given
    );

    if query.mode.as_deref() == Some("subscribe") && token_matches {
        tracing::info!("Webhook verified");
        HttpResponse::Ok()
            .content_type("text/plain")
            .body(query.challenge.unwrap_or_default())
    } else {
        tracing::warn!("Webhook verification failed");
        HttpResponse::Forbidden().finish()
    }
}

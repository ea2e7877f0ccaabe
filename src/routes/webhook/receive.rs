use crate::configuration::WebhookSettings;
use crate::errors::AppError;
use crate::forms::WebhookEnvelope;
use crate::helpers::signature::{self, SIGNATURE_HEADER};
use crate::ingress::IngressQueue;
use crate::state::AppState;
use actix_web::{post, web, HttpRequest, HttpResponse};

fn check_signature(
    settings: &WebhookSettings,
    req: &HttpRequest,
    body: &[u8],
) -> Result<(), AppError> {
    let Some(secret) = settings.app_secret.as_deref() else {
        return Ok(());
    };
    match req.headers().get(SIGNATURE_HEADER) {
        Some(header) => {
            let header = header.to_str().map_err(|_| AppError::Signature)?;
            if signature::verify(secret, body, header) {
                Ok(())
            } else {
                Err(AppError::Signature)
            }
        }
        None if settings.require_signature => Err(AppError::Signature),
        None => Ok(()),
    }
}

/// Acknowledges a delivery as soon as its messages are queued. Processing happens on the
/// ingress workers, so the provider always gets `200 OK` once the signature holds.
#[tracing::instrument(name = "Receive webhook", skip_all)]
#[post("")]
pub async fn receive_handler(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
    queue: web::Data<IngressQueue>,
) -> Result<HttpResponse, AppError> {
    if let Err(err) = check_signature(&state.webhook, &req, &body) {
        tracing::warn!("Rejected webhook delivery: invalid signature");
        return Err(err);
    }

    let envelope = match serde_path_to_error::deserialize::<_, WebhookEnvelope>(
        &mut serde_json::Deserializer::from_slice(&body),
    ) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::warn!(path = %err.path(), "Unreadable webhook body: {}", err.inner());
            return Ok(HttpResponse::Ok().body("OK"));
        }
    };

    let extracted = envelope.extract();
    for reason in &extracted.rejected {
        tracing::warn!("Skipped webhook message: {}", reason);
    }
    for status in &extracted.statuses {
        tracing::info!(
            wa_message_id = status.id.as_deref().unwrap_or_default(),
            status = status.status.as_deref().unwrap_or_default(),
            recipient = status.recipient_id.as_deref().unwrap_or_default(),
            "Delivery status"
        );
    }

    let received = extracted.messages.len();
    let queued = extracted
        .messages
        .into_iter()
        .map(|message| queue.enqueue(message))
        .filter(|queued| *queued)
        .count();
    if received > 0 {
        tracing::info!(received, queued, "Queued inbound messages");
    }

    Ok(HttpResponse::Ok().body("OK"))
}

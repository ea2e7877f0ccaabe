use crate::errors::AppError;
use crate::forms::{self, validate_form};
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::ReplyDelivery;
use crate::state::AppState;
use actix_web::{post, web, HttpResponse};
use serde_json::json;
use std::sync::Arc;

/// Manual message from the dashboard. Recorded on the conversation when one is given.
#[tracing::instrument(name = "Send manual message", skip(tenant, state, form))]
#[post("/send")]
pub async fn send_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    form: web::Json<forms::SendMessageForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    validate_form(&form)?;

    let store = state.store()?;
    let account = store
        .fetch_active_account(tenant.id)
        .await?
        .ok_or(AppError::NotFound("WhatsApp account"))?;
    let conversation = match form.conversation_id {
        Some(id) => Some(
            store
                .fetch_conversation(tenant.id, id)
                .await?
                .ok_or(AppError::NotFound("Conversation"))?,
        ),
        None => None,
    };

    let delivery = ReplyDelivery::new(
        store.as_ref(),
        state.whatsapp.as_deref(),
        state.pipeline.preview_length,
        state.pipeline.call_timeout(),
    );
    let wa_message_id = delivery
        .send_text(&account.phone_number_id, &form.phone, &form.message)
        .await?;

    let recorded = match conversation {
        Some(conversation) => Some(
            delivery
                .record_outbound(
                    &conversation,
                    &form.message,
                    wa_message_id.clone(),
                    json!({ "sent_manually": true }),
                )
                .await?,
        ),
        None => None,
    };

    let mut response = JsonResponse::build().set_meta(json!({ "message_id": wa_message_id }));
    if let Some(message) = recorded {
        response = response.set_item(message);
    }
    Ok(response.ok("Message sent successfully"))
}

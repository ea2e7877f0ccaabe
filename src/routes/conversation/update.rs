use crate::errors::AppError;
use crate::forms::{self, validate_form};
use crate::helpers::JsonResponse;
use crate::models;
use crate::state::AppState;
use actix_web::{put, web, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "Update conversation status", skip(tenant, state, form))]
#[put("/{id}/status")]
pub async fn status_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    path: web::Path<(Uuid,)>,
    form: web::Json<forms::ConversationStatusForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (id,) = path.into_inner();
    let form = form.into_inner();
    validate_form(&form)?;
    let update = form.into_update()?;

    let conversation = state
        .store()?
        .update_conversation_status(tenant.id, id, update.status, update.prospect_status)
        .await?
        .ok_or(AppError::NotFound("Conversation"))?;

    tracing::info!(
        conversation_id = %conversation.id,
        status = ?conversation.status,
        "Conversation status updated"
    );
    Ok(JsonResponse::build()
        .set_item(conversation)
        .ok("Conversation updated"))
}

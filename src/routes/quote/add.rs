use crate::errors::AppError;
use crate::forms::{self, validate_form};
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::render_document;
use crate::state::AppState;
use actix_web::{post, web, HttpResponse};
use serde_json::json;
use std::sync::Arc;

/// Creates a quote and renders its PDF right away. A render failure keeps the quote;
/// the PDF is then produced on first download.
#[tracing::instrument(name = "Add quote", skip(tenant, state, form))]
#[post("")]
pub async fn add_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    form: web::Json<forms::QuoteForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    validate_form(&form)?;

    let store = state.store()?;
    if let Some(conversation_id) = form.conversation_id {
        store
            .fetch_conversation(tenant.id, conversation_id)
            .await?
            .ok_or(AppError::NotFound("Conversation"))?;
    }

    let quote = form.into_quote(tenant.id, &state.pipeline.default_currency);
    let mut quote = store.insert_quote(quote).await?;
    tracing::info!(quote_id = %quote.id, total = quote.total, "Quote created");

    let mut pdf_url = None;
    match state.renderer() {
        Ok(renderer) => {
            match render_document(
                store.as_ref(),
                renderer.as_ref(),
                &mut quote,
                &tenant,
                state.pipeline.call_timeout(),
            )
            .await
            {
                Ok(document) => pdf_url = Some(document.url),
                Err(err) => {
                    tracing::error!(quote_id = %quote.id, "Failed to render quote document: {}", err)
                }
            }
        }
        Err(_) => tracing::warn!(quote_id = %quote.id, "Document renderer not configured"),
    }

    Ok(JsonResponse::build()
        .set_item(quote)
        .set_meta(json!({ "pdf_url": pdf_url }))
        .created("Quote created"))
}

use crate::errors::AppError;
use crate::models;
use crate::services::render_document;
use crate::state::AppState;
use actix_web::{get, http::header::LOCATION, web, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;

/// Redirects to the stored document, rendering it first when the quote has none yet.
#[tracing::instrument(name = "Download quote PDF", skip(tenant, state))]
#[get("/{id}/pdf")]
pub async fn pdf_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    path: web::Path<(Uuid,)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (id,) = path.into_inner();
    let store = state.store()?;
    let mut quote = store
        .fetch_quote(tenant.id, id)
        .await?
        .ok_or(AppError::NotFound("Quote"))?;
    let renderer = state.renderer()?;

    let url = match quote.pdf_path.as_deref() {
        Some(path) => renderer.public_url(path),
        None => {
            render_document(
                store.as_ref(),
                renderer.as_ref(),
                &mut quote,
                &tenant,
                state.pipeline.call_timeout(),
            )
            .await?
            .url
        }
    };

    Ok(HttpResponse::Found()
        .insert_header((LOCATION, url))
        .finish())
}

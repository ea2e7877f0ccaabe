use crate::errors::AppError;
use crate::forms::parse_products_csv;
use crate::helpers::JsonResponse;
use crate::models;
use crate::state::AppState;
use actix_web::{post, web, HttpResponse};
use serde_json::json;
use std::sync::Arc;

/// Bulk import from a raw CSV body. The size cap is the scope's `PayloadConfig`.
#[tracing::instrument(name = "Upload products CSV", skip_all)]
#[post("/upload")]
pub async fn upload_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let products = parse_products_csv(&body, tenant.id, &state.pipeline.default_currency)?;
    let inserted = state.store()?.insert_products(products).await?;
    tracing::info!(count = inserted.len(), "Imported products");

    let count = inserted.len();
    Ok(JsonResponse::build()
        .set_list(inserted)
        .set_meta(json!({ "count": count }))
        .created(format!("{count} products imported")))
}

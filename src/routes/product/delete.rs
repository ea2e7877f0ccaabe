use crate::errors::AppError;
use crate::helpers::JsonResponse;
use crate::models;
use crate::state::AppState;
use actix_web::{delete, web, HttpResponse};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "Delete product", skip(tenant, state))]
#[delete("/{id}")]
pub async fn delete_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    path: web::Path<(Uuid,)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (id,) = path.into_inner();
    match state.store()?.delete_product(tenant.id, id).await? {
        true => Ok(JsonResponse::<Value>::build().ok("Product deleted")),
        false => Err(AppError::NotFound("Product")),
    }
}

use crate::errors::AppError;
use crate::forms::{self, validate_form};
use crate::helpers::JsonResponse;
use crate::models;
use crate::state::AppState;
use actix_web::{put, web, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "Update product", skip(tenant, state, form))]
#[put("/{id}")]
pub async fn update_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    path: web::Path<(Uuid,)>,
    form: web::Json<forms::ProductForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (id,) = path.into_inner();
    let form = form.into_inner();
    validate_form(&form)?;

    let store = state.store()?;
    let existing = store
        .fetch_product(tenant.id, id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    let product = store
        .update_product(form.apply_to(existing, &state.pipeline.default_currency))
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    Ok(JsonResponse::build()
        .set_item(product)
        .ok("Product updated"))
}

use crate::errors::AppError;
use crate::forms::{self, validate_form};
use crate::helpers::JsonResponse;
use crate::models;
use crate::state::AppState;
use crate::store::StoreError;
use actix_web::{post, web, HttpResponse};
use std::sync::Arc;

#[tracing::instrument(name = "Add product", skip(tenant, state, form))]
#[post("")]
pub async fn add_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    form: web::Json<forms::ProductForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    validate_form(&form)?;

    let product = form.into_product(tenant.id, &state.pipeline.default_currency);
    let product = state
        .store()?
        .insert_products(vec![product])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::Database("product insert returned no row".to_string()))?;

    Ok(JsonResponse::build()
        .set_item(product)
        .created("Product created"))
}

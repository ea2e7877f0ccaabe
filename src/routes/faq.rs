use crate::errors::AppError;
use crate::forms::{self, validate_form};
use crate::helpers::JsonResponse;
use crate::models::{self, Language};
use crate::state::AppState;
use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "List FAQ", skip(tenant, state))]
#[get("")]
pub async fn list_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    query: web::Query<forms::FaqQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let language = query.language.unwrap_or(Language::Fr);
    let items = state.store()?.list_faq(tenant.id, language).await?;
    Ok(JsonResponse::build().set_list(items).ok("OK"))
}

#[tracing::instrument(name = "Add FAQ item", skip(tenant, state, form))]
#[post("")]
pub async fn add_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    form: web::Json<forms::FaqForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    validate_form(&form)?;

    let item = state.store()?.insert_faq(form.into_item(tenant.id)).await?;
    Ok(JsonResponse::build().set_item(item).created("FAQ created"))
}

#[tracing::instrument(name = "Update FAQ item", skip(tenant, state, form))]
#[put("/{id}")]
pub async fn update_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    path: web::Path<(Uuid,)>,
    form: web::Json<forms::FaqForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (id,) = path.into_inner();
    let form = form.into_inner();
    validate_form(&form)?;

    let store = state.store()?;
    let existing = store
        .fetch_faq(tenant.id, id)
        .await?
        .ok_or(AppError::NotFound("FAQ"))?;

    let item = store
        .update_faq(form.apply_to(existing))
        .await?
        .ok_or(AppError::NotFound("FAQ"))?;
    Ok(JsonResponse::build().set_item(item).ok("FAQ updated"))
}

#[tracing::instrument(name = "Delete FAQ item", skip(tenant, state))]
#[delete("/{id}")]
pub async fn delete_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    path: web::Path<(Uuid,)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (id,) = path.into_inner();
    match state.store()?.delete_faq(tenant.id, id).await? {
        true => Ok(JsonResponse::<Value>::build().ok("FAQ deleted")),
        false => Err(AppError::NotFound("FAQ")),
    }
}

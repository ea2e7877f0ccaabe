use crate::errors::AppError;
use crate::forms::QuoteListQuery;
use crate::helpers::{JsonResponse, PageQuery};
use crate::models;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "List quotes", skip(tenant, state))]
#[get("")]
pub async fn list_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    query: web::Query<QuoteListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .page();
    let (quotes, total) = state
        .store()?
        .list_quotes(tenant.id, query.conversation_id, page)
        .await?;

    Ok(JsonResponse::build()
        .set_list(quotes)
        .set_pagination(page.describe(total))
        .ok("OK"))
}

#[tracing::instrument(name = "Get quote", skip(tenant, state))]
#[get("/{id}")]
pub async fn item_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    path: web::Path<(Uuid,)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (id,) = path.into_inner();
    let quote = state
        .store()?
        .fetch_quote(tenant.id, id)
        .await?
        .ok_or(AppError::NotFound("Quote"))?;

    Ok(JsonResponse::build().set_item(quote).ok("OK"))
}

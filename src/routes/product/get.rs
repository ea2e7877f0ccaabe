use crate::errors::AppError;
use crate::forms::ProductListQuery;
use crate::helpers::{JsonResponse, PageQuery};
use crate::models;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "List products", skip(tenant, state))]
#[get("")]
pub async fn list_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    query: web::Query<ProductListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .page();
    let (products, total) = state
        .store()?
        .list_products(tenant.id, query.search(), page)
        .await?;

    Ok(JsonResponse::build()
        .set_list(products)
        .set_pagination(page.describe(total))
        .ok("OK"))
}

#[tracing::instrument(name = "Get product", skip(tenant, state))]
#[get("/{id}")]
pub async fn item_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    path: web::Path<(Uuid,)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (id,) = path.into_inner();
    let product = state
        .store()?
        .fetch_product(tenant.id, id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    Ok(JsonResponse::build().set_item(product).ok("OK"))
}

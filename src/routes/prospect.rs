use crate::errors::AppError;
use crate::helpers::{JsonResponse, PageQuery};
use crate::models;
use crate::state::AppState;
use crate::store::ConversationFilter;
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct ProspectQuery {
    pub prospect_status: Option<models::ProspectStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Conversations carrying a prospect label, optionally narrowed to one stage.
#[tracing::instrument(name = "List prospects", skip(tenant, state))]
#[get("")]
pub async fn list_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    query: web::Query<ProspectQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .page();
    let filter = ConversationFilter {
        status: None,
        prospect_status: query.prospect_status,
        prospects_only: true,
    };

    let (prospects, total) = state
        .store()?
        .list_conversations(tenant.id, &filter, page)
        .await?;

    Ok(JsonResponse::build()
        .set_list(prospects)
        .set_pagination(page.describe(total))
        .ok("OK"))
}

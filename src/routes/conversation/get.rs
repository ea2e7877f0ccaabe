use crate::errors::AppError;
use crate::forms::ConversationListQuery;
use crate::helpers::{JsonResponse, PageQuery};
use crate::models;
use crate::state::AppState;
use crate::store::ConversationFilter;
use actix_web::{get, web, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;

const MESSAGES_PAGE_LIMIT: i64 = 100;

#[tracing::instrument(name = "List conversations", skip(tenant, state))]
#[get("")]
pub async fn list_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    query: web::Query<ConversationListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .page();
    let filter = ConversationFilter {
        status: query.status,
        prospect_status: query.prospect_status,
        prospects_only: false,
    };

    let (conversations, total) = state
        .store()?
        .list_conversations(tenant.id, &filter, page)
        .await?;

    Ok(JsonResponse::build()
        .set_list(conversations)
        .set_pagination(page.describe(total))
        .ok("OK"))
}

#[tracing::instrument(name = "Get conversation", skip(tenant, state))]
#[get("/{id}")]
pub async fn item_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    path: web::Path<(Uuid,)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (id,) = path.into_inner();
    let conversation = state
        .store()?
        .fetch_conversation(tenant.id, id)
        .await?
        .ok_or(AppError::NotFound("Conversation"))?;

    Ok(JsonResponse::build().set_item(conversation).ok("OK"))
}

/// Oldest first, 100 per page by default.
#[tracing::instrument(name = "List conversation messages", skip(tenant, state))]
#[get("/{id}/messages")]
pub async fn messages_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    path: web::Path<(Uuid,)>,
    query: web::Query<PageQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (id,) = path.into_inner();
    let store = state.store()?;
    let conversation = store
        .fetch_conversation(tenant.id, id)
        .await?
        .ok_or(AppError::NotFound("Conversation"))?;

    let page = query.page_with_default(MESSAGES_PAGE_LIMIT);
    let (messages, total) = store.list_messages(conversation.id, page).await?;

    Ok(JsonResponse::build()
        .set_list(messages)
        .set_pagination(page.describe(total))
        .ok("OK"))
}

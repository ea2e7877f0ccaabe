use crate::db::failed;
use crate::helpers::Page;
use crate::models;
use crate::store::{ConversationFilter, StoreError};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn find(
    pool: &PgPool,
    wa_account_id: Uuid,
    contact_phone: &str,
) -> Result<Option<models::Conversation>, StoreError> {
    let query_span = tracing::info_span!("Find conversation by contact", %wa_account_id);
    sqlx::query_as::<_, models::Conversation>(
        "SELECT * FROM conversations WHERE wa_account_id = $1 AND contact_phone = $2",
    )
    .bind(wa_account_id)
    .bind(contact_phone)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(failed("find conversation"))
}

pub async fn insert(
    pool: &PgPool,
    conversation: models::Conversation,
) -> Result<models::Conversation, StoreError> {
    let query_span = tracing::info_span!("Open conversation", id = %conversation.id);
    sqlx::query_as::<_, models::Conversation>(
        r#"
        INSERT INTO conversations (
            id, wa_account_id, contact_phone, contact_name, status, prospect_status,
            last_message, last_message_at, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(conversation.id)
    .bind(conversation.wa_account_id)
    .bind(&conversation.contact_phone)
    .bind(&conversation.contact_name)
    .bind(conversation.status)
    .bind(conversation.prospect_status)
    .bind(&conversation.last_message)
    .bind(conversation.last_message_at)
    .bind(conversation.created_at)
    .bind(conversation.updated_at)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(failed("insert conversation"))
}

pub async fn touch(
    pool: &PgPool,
    id: Uuid,
    preview: &str,
    at: DateTime<Utc>,
) -> Result<bool, StoreError> {
    let query_span = tracing::info_span!("Update conversation preview", %id);
    sqlx::query(
        r#"
        UPDATE conversations
        SET last_message = $2, last_message_at = $3, updated_at = NOW()
        WHERE id = $1 AND (last_message_at IS NULL OR last_message_at <= $3)
        "#,
    )
    .bind(id)
    .bind(preview)
    .bind(at)
    .execute(pool)
    .instrument(query_span)
    .await
    .map(|result| result.rows_affected() > 0)
    .map_err(failed("update conversation preview"))
}

pub async fn fill_contact_name(
    pool: &PgPool,
    id: Uuid,
    contact_name: &str,
) -> Result<bool, StoreError> {
    let query_span = tracing::info_span!("Fill conversation contact name", %id);
    sqlx::query(
        "UPDATE conversations SET contact_name = $2, updated_at = NOW() WHERE id = $1 AND contact_name IS NULL",
    )
    .bind(id)
    .bind(contact_name)
    .execute(pool)
    .instrument(query_span)
    .await
    .map(|result| result.rows_affected() > 0)
    .map_err(failed("fill contact name"))
}

pub async fn set_prospect_status(
    pool: &PgPool,
    id: Uuid,
    prospect_status: models::ProspectStatus,
) -> Result<(), StoreError> {
    let query_span = tracing::info_span!("Set prospect status", %id, %prospect_status);
    sqlx::query(
        "UPDATE conversations SET prospect_status = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(prospect_status)
    .execute(pool)
    .instrument(query_span)
    .await
    .map(|_| ())
    .map_err(failed("set prospect status"))
}

pub async fn fetch(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<models::Conversation>, StoreError> {
    let query_span = tracing::info_span!("Fetch conversation", %id);
    sqlx::query_as::<_, models::Conversation>(
        r#"
        SELECT c.* FROM conversations c
        JOIN wa_accounts a ON a.id = c.wa_account_id
        WHERE c.id = $1 AND a.user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(failed("fetch conversation"))
}

pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    filter: &ConversationFilter,
    page: Page,
) -> Result<(Vec<models::Conversation>, i64), StoreError> {
    let query_span = tracing::info_span!("List conversations", %user_id);
    let conditions = r#"
        FROM conversations c
        JOIN wa_accounts a ON a.id = c.wa_account_id
        WHERE a.user_id = $1
          AND ($2::text IS NULL OR c.status = $2)
          AND ($3::text IS NULL OR c.prospect_status = $3)
          AND (NOT $4 OR c.prospect_status IS NOT NULL)
    "#;

    let items = sqlx::query_as::<_, models::Conversation>(&format!(
        "SELECT c.* {conditions} ORDER BY c.last_message_at DESC NULLS LAST, c.updated_at DESC LIMIT $5 OFFSET $6"
    ))
    .bind(user_id)
    .bind(filter.status)
    .bind(filter.prospect_status)
    .bind(filter.prospects_only)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .instrument(query_span.clone())
    .await
    .map_err(failed("list conversations"))?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {conditions}"))
        .bind(user_id)
        .bind(filter.status)
        .bind(filter.prospect_status)
        .bind(filter.prospects_only)
        .fetch_one(pool)
        .instrument(query_span)
        .await
        .map_err(failed("count conversations"))?;

    Ok((items, total))
}

pub async fn update_status(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    status: models::ConversationStatus,
    prospect_status: Option<Option<models::ProspectStatus>>,
) -> Result<Option<models::Conversation>, StoreError> {
    let query_span = tracing::info_span!("Update conversation status", %id);
    let (replace_prospect, prospect_status) = match prospect_status {
        Some(value) => (true, value),
        None => (false, None),
    };
    sqlx::query_as::<_, models::Conversation>(
        r#"
        UPDATE conversations c
        SET status = $3,
            prospect_status = CASE WHEN $4 THEN $5::text ELSE c.prospect_status END,
            updated_at = NOW()
        FROM wa_accounts a
        WHERE c.id = $1 AND a.id = c.wa_account_id AND a.user_id = $2
        RETURNING c.*
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(status)
    .bind(replace_prospect)
    .bind(prospect_status)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(failed("update conversation status"))
}

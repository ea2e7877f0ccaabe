use crate::db::failed;
use crate::helpers::Page;
use crate::models;
use crate::store::StoreError;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn insert(pool: &PgPool, message: models::Message) -> Result<models::Message, StoreError> {
    let query_span = tracing::info_span!(
        "Record message",
        conversation_id = %message.conversation_id,
        direction = ?message.direction
    );
    sqlx::query_as::<_, models::Message>(
        r#"
        INSERT INTO messages (
            id, conversation_id, direction, message_type, content, media_url,
            timestamp, wa_message_id, metadata, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(message.id)
    .bind(message.conversation_id)
    .bind(message.direction)
    .bind(message.message_type)
    .bind(&message.content)
    .bind(&message.media_url)
    .bind(message.timestamp)
    .bind(&message.wa_message_id)
    .bind(&message.metadata)
    .bind(message.created_at)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(failed("insert message"))
}

pub async fn recent(
    pool: &PgPool,
    conversation_id: Uuid,
    limit: i64,
) -> Result<Vec<models::Message>, StoreError> {
    let query_span = tracing::info_span!("Fetch recent messages", %conversation_id, limit);
    sqlx::query_as::<_, models::Message>(
        r#"
        SELECT * FROM messages
        WHERE conversation_id = $1
        ORDER BY timestamp DESC, created_at DESC
        LIMIT $2
        "#,
    )
    .bind(conversation_id)
    .bind(limit)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(failed("fetch recent messages"))
}

pub async fn list(
    pool: &PgPool,
    conversation_id: Uuid,
    page: Page,
) -> Result<(Vec<models::Message>, i64), StoreError> {
    let query_span = tracing::info_span!("List messages", %conversation_id);
    let items = sqlx::query_as::<_, models::Message>(
        r#"
        SELECT * FROM messages
        WHERE conversation_id = $1
        ORDER BY timestamp ASC, created_at ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(conversation_id)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .instrument(query_span.clone())
    .await
    .map_err(failed("list messages"))?;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
            .bind(conversation_id)
            .fetch_one(pool)
            .instrument(query_span)
            .await
            .map_err(failed("count messages"))?;

    Ok((items, total))
}

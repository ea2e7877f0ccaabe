use crate::db::failed;
use crate::models;
use crate::store::StoreError;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    language: models::Language,
) -> Result<Vec<models::FaqItem>, StoreError> {
    let query_span = tracing::info_span!("List FAQ", %user_id, %language);
    sqlx::query_as::<_, models::FaqItem>(
        "SELECT * FROM faq WHERE user_id = $1 AND language = $2 ORDER BY created_at DESC, id",
    )
    .bind(user_id)
    .bind(language)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(failed("list faq"))
}

pub async fn fetch(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<models::FaqItem>, StoreError> {
    let query_span = tracing::info_span!("Fetch FAQ item", %id);
    sqlx::query_as::<_, models::FaqItem>("SELECT * FROM faq WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(failed("fetch faq"))
}

pub async fn insert(pool: &PgPool, item: models::FaqItem) -> Result<models::FaqItem, StoreError> {
    let query_span = tracing::info_span!("Insert FAQ item", id = %item.id);
    sqlx::query_as::<_, models::FaqItem>(
        r#"
        INSERT INTO faq (id, user_id, question, answer, language, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(item.id)
    .bind(item.user_id)
    .bind(&item.question)
    .bind(&item.answer)
    .bind(item.language)
    .bind(item.created_at)
    .bind(item.updated_at)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(failed("insert faq"))
}

pub async fn update(
    pool: &PgPool,
    item: models::FaqItem,
) -> Result<Option<models::FaqItem>, StoreError> {
    let query_span = tracing::info_span!("Update FAQ item", id = %item.id);
    sqlx::query_as::<_, models::FaqItem>(
        r#"
        UPDATE faq
        SET question = $3, answer = $4, language = $5, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(item.id)
    .bind(item.user_id)
    .bind(&item.question)
    .bind(&item.answer)
    .bind(item.language)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(failed("update faq"))
}

pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
    let query_span = tracing::info_span!("Delete FAQ item", %id);
    sqlx::query("DELETE FROM faq WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(failed("delete faq"))
}

use crate::db::failed;
use crate::helpers::Page;
use crate::models;
use crate::store::StoreError;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn insert(pool: &PgPool, quote: models::Quote) -> Result<models::Quote, StoreError> {
    let query_span = tracing::info_span!("Save quote", id = %quote.id, total = quote.total);
    sqlx::query_as::<_, models::Quote>(
        r#"
        INSERT INTO devis (
            id, user_id, conversation_id, contact_phone, contact_name, items,
            subtotal, tax, total, currency, status, pdf_path, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING *
        "#,
    )
    .bind(quote.id)
    .bind(quote.user_id)
    .bind(quote.conversation_id)
    .bind(&quote.contact_phone)
    .bind(&quote.contact_name)
    .bind(Json(&quote.items))
    .bind(quote.subtotal)
    .bind(quote.tax)
    .bind(quote.total)
    .bind(&quote.currency)
    .bind(quote.status)
    .bind(&quote.pdf_path)
    .bind(quote.created_at)
    .bind(quote.updated_at)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(failed("insert quote"))
}

pub async fn fetch(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<models::Quote>, StoreError> {
    let query_span = tracing::info_span!("Fetch quote", %id);
    sqlx::query_as::<_, models::Quote>("SELECT * FROM devis WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(failed("fetch quote"))
}

pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    conversation_id: Option<Uuid>,
    page: Page,
) -> Result<(Vec<models::Quote>, i64), StoreError> {
    let query_span = tracing::info_span!("List quotes", %user_id);
    let conditions = "FROM devis WHERE user_id = $1 AND ($2::uuid IS NULL OR conversation_id = $2)";

    let items = sqlx::query_as::<_, models::Quote>(&format!(
        "SELECT * {conditions} ORDER BY created_at DESC, id LIMIT $3 OFFSET $4"
    ))
    .bind(user_id)
    .bind(conversation_id)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .instrument(query_span.clone())
    .await
    .map_err(failed("list quotes"))?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {conditions}"))
        .bind(user_id)
        .bind(conversation_id)
        .fetch_one(pool)
        .instrument(query_span)
        .await
        .map_err(failed("count quotes"))?;

    Ok((items, total))
}

pub async fn set_document(pool: &PgPool, id: Uuid, pdf_path: &str) -> Result<(), StoreError> {
    let query_span = tracing::info_span!("Attach quote document", %id);
    sqlx::query("UPDATE devis SET pdf_path = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(pdf_path)
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|_| ())
        .map_err(failed("attach quote document"))
}

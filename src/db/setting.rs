use crate::db::failed;
use crate::models;
use crate::store::StoreError;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn fetch_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<models::Setting>, StoreError> {
    let query_span = tracing::info_span!("Fetch settings", %user_id);
    sqlx::query_as::<_, models::Setting>("SELECT * FROM settings WHERE user_id = $1 ORDER BY key")
        .bind(user_id)
        .fetch_all(pool)
        .instrument(query_span)
        .await
        .map_err(failed("fetch settings"))
}

pub async fn fetch_one(
    pool: &PgPool,
    user_id: Uuid,
    key: &str,
) -> Result<Option<models::Setting>, StoreError> {
    let query_span = tracing::info_span!("Fetch setting", %user_id, %key);
    sqlx::query_as::<_, models::Setting>("SELECT * FROM settings WHERE user_id = $1 AND key = $2")
        .bind(user_id)
        .bind(key)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(failed("fetch setting"))
}

pub async fn upsert_many(
    pool: &PgPool,
    user_id: Uuid,
    values: Vec<(String, Option<String>)>,
) -> Result<(), StoreError> {
    let query_span = tracing::info_span!("Upsert settings", %user_id, count = values.len());
    let mut tx = pool.begin().await.map_err(failed("begin transaction"))?;

    for (key, value) in values {
        sqlx::query(
            r#"
            INSERT INTO settings (user_id, key, value, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(&key)
        .bind(&value)
        .execute(&mut *tx)
        .instrument(query_span.clone())
        .await
        .map_err(failed("upsert setting"))?;
    }

    tx.commit().await.map_err(failed("commit settings"))
}

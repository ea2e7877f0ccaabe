use crate::db::failed;
use crate::models;
use crate::store::StoreError;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn insert(
    pool: &PgPool,
    account: models::MessagingAccount,
) -> Result<models::MessagingAccount, StoreError> {
    let query_span = tracing::info_span!(
        "Register messaging account",
        phone_number_id = %account.phone_number_id
    );
    sqlx::query_as::<_, models::MessagingAccount>(
        r#"
        INSERT INTO wa_accounts (id, user_id, phone_number_id, display_phone, is_active, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(account.id)
    .bind(account.user_id)
    .bind(&account.phone_number_id)
    .bind(&account.display_phone)
    .bind(account.is_active)
    .bind(account.created_at)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(failed("insert messaging account"))
}

pub async fn fetch_by_phone_number_id(
    pool: &PgPool,
    phone_number_id: &str,
) -> Result<Option<models::MessagingAccount>, StoreError> {
    let query_span = tracing::info_span!("Fetch account by phone number id", %phone_number_id);
    sqlx::query_as::<_, models::MessagingAccount>(
        "SELECT * FROM wa_accounts WHERE phone_number_id = $1",
    )
    .bind(phone_number_id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(failed("fetch account by phone number id"))
}

pub async fn fetch_active(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<models::MessagingAccount>, StoreError> {
    let query_span = tracing::info_span!("Fetch active account", %user_id);
    sqlx::query_as::<_, models::MessagingAccount>(
        r#"
        SELECT * FROM wa_accounts
        WHERE user_id = $1 AND is_active
        ORDER BY created_at
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(failed("fetch active account"))
}

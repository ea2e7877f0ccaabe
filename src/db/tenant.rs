use crate::db::failed;
use crate::models;
use crate::store::StoreError;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<Option<models::Tenant>, StoreError> {
    let query_span = tracing::info_span!("Fetch tenant by id", %id);
    sqlx::query_as::<_, models::Tenant>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(failed("fetch tenant"))
}

pub async fn fetch_by_subject(
    pool: &PgPool,
    subject: &str,
) -> Result<Option<models::Tenant>, StoreError> {
    let query_span = tracing::info_span!("Fetch tenant by identity subject");
    sqlx::query_as::<_, models::Tenant>("SELECT * FROM users WHERE subject = $1")
        .bind(subject)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(failed("fetch tenant by subject"))
}

pub async fn insert(pool: &PgPool, tenant: models::Tenant) -> Result<models::Tenant, StoreError> {
    let query_span = tracing::info_span!("Provision tenant", subject = %tenant.subject);
    // the no-op update makes RETURNING yield the existing row on conflict
    sqlx::query_as::<_, models::Tenant>(
        r#"
        INSERT INTO users (id, subject, email, company_name, phone, plan, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (subject) DO UPDATE SET subject = EXCLUDED.subject
        RETURNING *
        "#,
    )
    .bind(tenant.id)
    .bind(&tenant.subject)
    .bind(&tenant.email)
    .bind(&tenant.company_name)
    .bind(&tenant.phone)
    .bind(&tenant.plan)
    .bind(tenant.created_at)
    .bind(tenant.updated_at)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(failed("insert tenant"))
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    company_name: Option<String>,
    phone: Option<String>,
) -> Result<models::Tenant, StoreError> {
    let query_span = tracing::info_span!("Update tenant profile", %id);
    sqlx::query_as::<_, models::Tenant>(
        r#"
        UPDATE users
        SET company_name = COALESCE($2, company_name),
            phone = COALESCE($3, phone),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(company_name)
    .bind(phone)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(failed("update tenant profile"))
}

use crate::db::failed;
use crate::helpers::Page;
use crate::models;
use crate::store::StoreError;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    search: Option<&str>,
    page: Page,
) -> Result<(Vec<models::Product>, i64), StoreError> {
    let query_span = tracing::info_span!("List products", %user_id, search = ?search);
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s));
    let conditions = r#"
        FROM products
        WHERE user_id = $1
          AND ($2::text IS NULL OR title ILIKE $2 OR description ILIKE $2 OR sku ILIKE $2)
    "#;

    let items = sqlx::query_as::<_, models::Product>(&format!(
        "SELECT * {conditions} ORDER BY created_at DESC, id LIMIT $3 OFFSET $4"
    ))
    .bind(user_id)
    .bind(&pattern)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .instrument(query_span.clone())
    .await
    .map_err(failed("list products"))?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {conditions}"))
        .bind(user_id)
        .bind(&pattern)
        .fetch_one(pool)
        .instrument(query_span)
        .await
        .map_err(failed("count products"))?;

    Ok((items, total))
}

pub async fn fetch(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<models::Product>, StoreError> {
    let query_span = tracing::info_span!("Fetch product", %id);
    sqlx::query_as::<_, models::Product>("SELECT * FROM products WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
        .map_err(failed("fetch product"))
}

pub async fn insert_many(
    pool: &PgPool,
    products: Vec<models::Product>,
) -> Result<Vec<models::Product>, StoreError> {
    let query_span = tracing::info_span!("Insert products", count = products.len());
    let mut tx = pool.begin().await.map_err(failed("begin transaction"))?;
    let mut inserted = Vec::with_capacity(products.len());

    for product in products {
        let row = sqlx::query_as::<_, models::Product>(
            r#"
            INSERT INTO products (
                id, user_id, sku, title, description, price, currency, stock,
                image_path, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(product.user_id)
        .bind(&product.sku)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.currency)
        .bind(product.stock)
        .bind(&product.image_path)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&mut *tx)
        .instrument(query_span.clone())
        .await
        .map_err(failed("insert product"))?;
        inserted.push(row);
    }

    tx.commit().await.map_err(failed("commit products"))?;
    Ok(inserted)
}

pub async fn update(
    pool: &PgPool,
    product: models::Product,
) -> Result<Option<models::Product>, StoreError> {
    let query_span = tracing::info_span!("Update product", id = %product.id);
    sqlx::query_as::<_, models::Product>(
        r#"
        UPDATE products
        SET sku = $3, title = $4, description = $5, price = $6, currency = $7,
            stock = $8, image_path = $9, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(product.id)
    .bind(product.user_id)
    .bind(&product.sku)
    .bind(&product.title)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.currency)
    .bind(product.stock)
    .bind(&product.image_path)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(failed("update product"))
}

pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
    let query_span = tracing::info_span!("Delete product", %id);
    sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(failed("delete product"))
}

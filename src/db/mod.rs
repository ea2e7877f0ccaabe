pub mod account;
pub mod conversation;
pub mod faq;
pub mod message;
pub mod product;
pub mod quote;
pub mod setting;
pub mod tenant;

use crate::store::StoreError;
use sqlx::PgPool;
use tracing::Instrument;

/// Logs the failed action and converts it. Unique violations are expected traffic and only traced.
pub(crate) fn failed(action: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| {
        let err = StoreError::from(err);
        match &err {
            StoreError::Duplicate(constraint) => {
                tracing::debug!("Skipped {}: duplicate {}", action, constraint)
            }
            StoreError::Database(msg) => tracing::error!("Failed to {}, error: {}", action, msg),
        }
        err
    }
}

pub async fn ping(pool: &PgPool) -> Result<(), StoreError> {
    let query_span = tracing::info_span!("Database ping");
    sqlx::query("SELECT 1")
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|_| ())
        .map_err(failed("ping database"))
}

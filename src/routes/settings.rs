use crate::errors::{AppError, FieldError};
use crate::helpers::JsonResponse;
use crate::models::{self, Language, LANGUAGE_KEY};
use crate::state::AppState;
use actix_web::{get, put, web, HttpResponse};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

#[tracing::instrument(name = "Get settings", skip(tenant, state))]
#[get("")]
pub async fn get_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let settings: BTreeMap<String, Option<String>> = state
        .store()?
        .fetch_settings(tenant.id)
        .await?
        .into_iter()
        .map(|setting| (setting.key, setting.value))
        .collect();

    Ok(JsonResponse::build().set_item(settings).ok("OK"))
}

/// Scalars are stored as text, `null` clears the value.
fn setting_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn parse_settings(body: Map<String, Value>) -> Result<Vec<(String, Option<String>)>, AppError> {
    let mut errors = vec![];
    let mut values = vec![];
    for (key, value) in body {
        let key = key.trim().to_string();
        if key.is_empty() {
            errors.push(FieldError::new("key", "must not be empty"));
            continue;
        }
        let value = setting_value(value);
        if key == LANGUAGE_KEY {
            if let Some(language) = value.as_deref() {
                if language.parse::<Language>().is_err() {
                    errors.push(FieldError::new(LANGUAGE_KEY, "must be one of fr, mg"));
                    continue;
                }
            }
        }
        values.push((key, value));
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(AppError::Validation(errors))
    }
}

#[tracing::instrument(name = "Update settings", skip(tenant, state, body))]
#[put("")]
pub async fn update_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    body: web::Json<Map<String, Value>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let values = parse_settings(body.into_inner())?;
    let saved: BTreeMap<String, Option<String>> = values.iter().cloned().collect();

    state.store()?.upsert_settings(tenant.id, values).await?;

    Ok(JsonResponse::build()
        .set_item(saved)
        .ok("Settings updated"))
}

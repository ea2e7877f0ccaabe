use crate::connectors::ConnectorError;
use crate::errors::AppError;
use crate::middleware::authentication::get_header;
use crate::services::provision_tenant;
use crate::state::AppState;
use actix_web::{dev::ServiceRequest, web, HttpMessage};
use std::sync::Arc;

fn try_extract_token(authorization: &str) -> Result<String, AppError> {
    let mut parts = authorization.splitn(2, ' ');
    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => {}
        _ => return Err(AppError::Unauthorized("Bearer scheme missing".to_string())),
    }
    match parts.next().map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => {
            tracing::debug!("Bearer token is missing");
            Err(AppError::Unauthorized("Authentication required".to_string()))
        }
    }
}

/// Resolves the calling tenant from `Authorization: Bearer <token>`.
#[tracing::instrument(name = "Authenticate with bearer token", skip(req))]
pub async fn try_bearer(req: &mut ServiceRequest) -> Result<(), AppError> {
    let authorization = get_header::<String>(req, "authorization")
        .map_err(AppError::Unauthorized)?
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
    let token = try_extract_token(&authorization)?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or(AppError::Unavailable("identity provider"))?;
    let identity = state.identity()?;
    let store = state.store()?;

    let timeout = state.pipeline.call_timeout();
    let claims = tokio::time::timeout(timeout, identity.verify(&token))
        .await
        .map_err(|_| AppError::Timeout("identity provider"))?
        .map_err(|err| match err {
            ConnectorError::Unauthorized(_) | ConnectorError::NotFound(_) => {
                AppError::Unauthorized("Invalid or expired token".to_string())
            }
            other => AppError::upstream("identity provider", other),
        })?;

    let tenant = provision_tenant(store.as_ref(), &claims).await?;
    tracing::debug!(tenant_id = %tenant.id, "Authenticated tenant");

    if req.extensions_mut().insert(Arc::new(tenant)).is_some() {
        tracing::error!("tenant already attached to the request");
    }

    Ok(())
}

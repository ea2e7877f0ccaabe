use crate::connectors::ConnectorError;
use crate::helpers::json::error_body;
use crate::store::StoreError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use std::sync::OnceLock;

static EXPOSE_DETAILS: OnceLock<bool> = OnceLock::new();

/// Set once at start-up. Outside production, 500 responses carry the underlying error.
pub fn expose_details(enabled: bool) {
    let _ = EXPOSE_DETAILS.set(enabled);
}

fn details_exposed() -> bool {
    EXPOSE_DETAILS.get().copied().unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("invalid webhook signature")]
    Signature,
    #[error("{0} is not configured")]
    Unavailable(&'static str),
    #[error("{service} failed: {source}")]
    Upstream {
        service: &'static str,
        #[source]
        source: ConnectorError,
    },
    #[error("{0} timed out")]
    Timeout(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn upstream(service: &'static str, source: ConnectorError) -> Self {
        AppError::Upstream { service, source }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Signature => StatusCode::FORBIDDEN,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream { .. } | AppError::Timeout(_) | AppError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            AppError::Validation(errors) => json!({ "errors": errors }),
            AppError::Upstream { .. } | AppError::Timeout(_) | AppError::Store(_) => {
                tracing::error!(error = %self, "request failed");
                if details_exposed() {
                    json!({ "error": "Internal server error", "details": self.to_string() })
                } else {
                    error_body("Internal server error")
                }
            }
            other => error_body(&other.to_string()),
        };
        HttpResponse::build(status).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn maps_taxonomy_to_statuses() {
        assert_eq!(AppError::NotFound("Product").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Signature.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Unavailable("data store").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Unauthorized("Authentication required".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn renders_not_found_message() {
        let response = AppError::NotFound("Conversation").error_response();
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Conversation not found");
    }

    #[actix_web::test]
    async fn renders_validation_list() {
        let response =
            AppError::Validation(vec![FieldError::new("title", "required")]).error_response();
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errors"][0]["field"], "title");
        assert_eq!(json["errors"][0]["message"], "required");
    }
}

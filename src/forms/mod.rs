mod auth;
mod conversation;
mod faq;
mod message;
mod product;
mod product_csv;
mod quote;
pub mod webhook;

pub use auth::*;
pub use conversation::*;
pub use faq::*;
pub use message::*;
pub use product::*;
pub use product_csv::*;
pub use quote::*;
pub use webhook::{InboundMessage, StatusEvent, WebhookEnvelope};

use crate::errors::AppError;
use crate::helpers::validation_errors;
use serde_valid::Validate;

/// Runs the derived rules and maps failures to the `{errors: [...]}` response.
pub fn validate_form<T: Validate>(form: &T) -> Result<(), AppError> {
    form.validate()
        .map_err(|errors| AppError::Validation(validation_errors(&errors)))
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

use super::deserialize_some;
use crate::errors::{AppError, FieldError};
use crate::models::{ConversationStatus, ProspectStatus};
use serde::Deserialize;
use serde_valid::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConversationStatusForm {
    #[validate(pattern = r"^(open|closed|archived)$")]
    pub status: String,
    /// Absent keeps the stored label, `null` clears it.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub prospect_status: Option<Option<String>>,
}

pub struct StatusUpdate {
    pub status: ConversationStatus,
    pub prospect_status: Option<Option<ProspectStatus>>,
}

fn parse_status<T: serde::de::DeserializeOwned>(value: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).ok()
}

impl ConversationStatusForm {
    pub fn into_update(self) -> Result<StatusUpdate, AppError> {
        let status = parse_status::<ConversationStatus>(&self.status).ok_or_else(|| {
            AppError::Validation(vec![FieldError::new("status", "unknown status")])
        })?;

        let prospect_status = match self.prospect_status {
            None => None,
            Some(None) => Some(None),
            Some(Some(value)) => {
                let parsed = parse_status::<ProspectStatus>(&value).ok_or_else(|| {
                    AppError::Validation(vec![FieldError::new(
                        "prospect_status",
                        "must be one of new, contacted, qualified, converted, lost",
                    )])
                })?;
                Some(Some(parsed))
            }
        };

        Ok(StatusUpdate {
            status,
            prospect_status,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConversationListQuery {
    pub status: Option<ConversationStatus>,
    pub prospect_status: Option<ProspectStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::validate_form;
    use serde_json::json;

    fn form(body: serde_json::Value) -> ConversationStatusForm {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn prospect_status_absent_null_or_set() {
        let kept = form(json!({ "status": "closed" })).into_update().unwrap();
        assert_eq!(kept.status, ConversationStatus::Closed);
        assert!(kept.prospect_status.is_none());

        let cleared = form(json!({ "status": "open", "prospect_status": null }))
            .into_update()
            .unwrap();
        assert_eq!(cleared.prospect_status, Some(None));

        let set = form(json!({ "status": "open", "prospect_status": "lost" }))
            .into_update()
            .unwrap();
        assert_eq!(set.prospect_status, Some(Some(ProspectStatus::Lost)));
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(validate_form(&form(json!({ "status": "deleted" }))).is_err());
        assert!(form(json!({ "status": "open", "prospect_status": "hot" }))
            .into_update()
            .is_err());
    }
}

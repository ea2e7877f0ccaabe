use serde::{Deserialize, Serialize};
use serde_valid::Validate;

/// Optional profile details sent on sign-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(max_length = 255)]
    pub company_name: Option<String>,
    #[serde(default)]
    #[validate(max_length = 50)]
    pub phone: Option<String>,
}

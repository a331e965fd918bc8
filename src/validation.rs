//! Field Validation - Classification, Not Exceptions
//!
//! The validator is pure: it classifies, the caller decides presentation.
//! Presence is checked strictly before category membership.

use serde::{Deserialize, Serialize};

use crate::template::CategorySet;

/// Raw form fields exactly as the user typed them. Ephemeral; held only in
/// form state and never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category_code: String,
    #[serde(default)]
    pub membership_id: String,
}

impl RawInput {
    pub fn new(name: &str, category_code: &str, membership_id: &str) -> Self {
        Self {
            name: name.to_string(),
            category_code: category_code.to_string(),
            membership_id: membership_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid,
    MissingFields,
    InvalidCategory,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The user-facing message shown for a failed classification.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Valid => None,
            Self::MissingFields => Some(
                "Missing Information, Please check the information entered \
                 and make sure all fields are filled",
            ),
            Self::InvalidCategory => Some("Insert correct membership category"),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Classify the raw fields against the configured category set.
pub fn validate(raw: &RawInput, categories: &CategorySet) -> ValidationOutcome {
    if is_blank(&raw.name) || is_blank(&raw.category_code) || is_blank(&raw.membership_id) {
        log::debug!("validation: missing fields");
        return ValidationOutcome::MissingFields;
    }

    if !categories.contains(&raw.category_code) {
        log::debug!("validation: unknown category {:?}", raw.category_code);
        return ValidationOutcome::InvalidCategory;
    }

    ValidationOutcome::Valid
}

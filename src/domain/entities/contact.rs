use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use validator::Validate;

use crate::domain::validation::{
    validate_budget, validate_company, validate_consent, validate_message, validate_name,
};
use crate::errors::FailureKind;

/// Raw contact form payload as posted by the browser.
///
/// Missing fields deserialize to empty values so that they fail validation with a
/// field message instead of a JSON error.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ContactFormInput {
    #[serde(default)]
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "validate_company"))]
    pub company: String,

    #[serde(default)]
    #[validate(custom(function = "validate_budget", message = "Please select a budget range"))]
    pub budget: String,

    #[serde(default)]
    #[validate(custom(function = "validate_message"))]
    pub message: String,

    #[serde(default)]
    #[validate(custom(function = "validate_consent", message = "You must agree to the privacy policy"))]
    pub consent: bool,

    /// Honeypot. Never rendered to humans; checked by the bot filter, not the schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,

    /// Milliseconds between form load and submit, as measured by the browser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Budget {
    #[serde(rename = "under-10k")]
    Under10k,
    #[serde(rename = "10k-25k")]
    From10kTo25k,
    #[serde(rename = "25k-50k")]
    From25kTo50k,
    #[serde(rename = "50k+")]
    Over50k,
}

impl Budget {
    pub const ALL: [Budget; 4] = [
        Budget::Under10k,
        Budget::From10kTo25k,
        Budget::From25kTo50k,
        Budget::Over50k,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Budget::ALL.into_iter().find(|b| b.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Budget::Under10k => "under-10k",
            Budget::From10kTo25k => "10k-25k",
            Budget::From25kTo50k => "25k-50k",
            Budget::Over50k => "50k+",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Budget::Under10k => "Under $10k",
            Budget::From10kTo25k => "$10k - $25k",
            Budget::From25kTo50k => "$25k - $50k",
            Budget::Over50k => "$50k+",
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submission that passed the schema and had its free text sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub company: String,
    pub budget: Budget,
    pub message: String,
}

/// Request metadata captured when the submission reaches the server.
#[derive(Debug, Clone)]
pub struct SubmissionMeta {
    pub source_id: String,
    pub user_agent: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl SubmissionMeta {
    pub fn new(source_id: impl Into<String>, user_agent: Option<String>) -> Self {
        SubmissionMeta {
            source_id: source_id.into(),
            user_agent,
            received_at: Utc::now(),
        }
    }

    pub fn user_agent_or_unknown(&self) -> &str {
        self.user_agent.as_deref().unwrap_or("Unknown")
    }
}

/// Uniform outcome of one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Success,
    Failure { error: String, kind: FailureKind },
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Success)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SubmissionResult::Success => None,
            SubmissionResult::Failure { error, .. } => Some(error),
        }
    }
}

impl Serialize for SubmissionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SubmissionResult::Success => {
                let mut state = serializer.serialize_struct("SubmissionResult", 1)?;
                state.serialize_field("success", &true)?;
                state.end()
            }
            SubmissionResult::Failure { error, .. } => {
                let mut state = serializer.serialize_struct("SubmissionResult", 2)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
                state.end()
            }
        }
    }
}

/// Query for the validation endpoint; `field` narrows the check to one field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidateQuery {
    pub field: Option<String>,
}

/// Field-level validation outcome for inline form feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_parses_only_known_buckets() {
        assert_eq!(Budget::parse("10k-25k"), Some(Budget::From10kTo25k));
        assert_eq!(Budget::parse("50k+"), Some(Budget::Over50k));
        assert_eq!(Budget::parse("100k"), None);
        assert_eq!(Budget::parse(""), None);
    }

    #[test]
    fn missing_fields_deserialize_to_empty_values() {
        let input: ContactFormInput = serde_json::from_str(r#"{"name":"Jane Doe"}"#).unwrap();
        assert_eq!(input.name, "Jane Doe");
        assert!(input.email.is_empty());
        assert!(!input.consent);
        assert!(input.company_website.is_none());
        assert_eq!(input.elapsed_ms, None);
    }

    #[test]
    fn null_honeypot_is_accepted() {
        let input: ContactFormInput =
            serde_json::from_str(r#"{"name":"Jane Doe","company_website":null}"#).unwrap();
        assert!(input.company_website.is_none());
    }

    #[test]
    fn result_serializes_to_wire_shape() {
        let ok = serde_json::to_value(SubmissionResult::Success).unwrap();
        assert_eq!(ok, serde_json::json!({ "success": true }));

        let failed = SubmissionResult::Failure {
            error: "Spam detected. Please try again.".into(),
            kind: FailureKind::Rejected,
        };
        assert_eq!(
            serde_json::to_value(failed).unwrap(),
            serde_json::json!({ "success": false, "error": "Spam detected. Please try again." })
        );
    }
}

use std::collections::BTreeMap;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::entities::contact::{Budget, ContactFormInput};
use crate::errors::FieldError;

/// Schema field order; joined messages and field maps follow it.
pub const FIELD_ORDER: [&str; 6] = ["name", "email", "company", "budget", "message", "consent"];

fn length_error(message: &'static str) -> ValidationError {
    let mut error = ValidationError::new("length");
    error.message = Some(message.into());
    error
}

fn bounded_length(
    value: &str,
    min: usize,
    max: usize,
    too_short: &'static str,
    too_long: &'static str,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min {
        return Err(length_error(too_short));
    }
    if len > max {
        return Err(length_error(too_long));
    }
    Ok(())
}

pub fn validate_name(value: &str) -> Result<(), ValidationError> {
    bounded_length(
        value,
        2,
        100,
        "Name must be at least 2 characters",
        "Name must be less than 100 characters",
    )
}

pub fn validate_company(value: &str) -> Result<(), ValidationError> {
    bounded_length(
        value,
        2,
        100,
        "Company name must be at least 2 characters",
        "Company name must be less than 100 characters",
    )
}

pub fn validate_message(value: &str) -> Result<(), ValidationError> {
    bounded_length(
        value,
        10,
        1000,
        "Message must be at least 10 characters",
        "Message must be less than 1000 characters",
    )
}

pub fn validate_budget(value: &str) -> Result<(), ValidationError> {
    match Budget::parse(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("budget")),
    }
}

pub fn validate_consent(value: &bool) -> Result<(), ValidationError> {
    if *value {
        Ok(())
    } else {
        Err(ValidationError::new("consent"))
    }
}

/// Flattens validator output into schema-ordered field errors.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let by_field = errors.field_errors();

    FIELD_ORDER
        .iter()
        .filter_map(|field| by_field.get(*field).map(|errs| (*field, errs)))
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string()),
            })
        })
        .collect()
}

/// Authoritative server pass. Returns every failing field in schema order.
pub fn validate_form(input: &ContactFormInput) -> Result<(), Vec<FieldError>> {
    input.validate().map_err(|errors| field_errors(&errors))
}

/// Field-level presentation used for inline form feedback: first message per field.
pub fn field_error_map(input: &ContactFormInput) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    if let Err(errors) = validate_form(input) {
        for error in errors {
            map.entry(error.field).or_insert(error.message);
        }
    }
    map
}

/// Checks a single field on blur/change. Uses the same schema as the full pass.
pub fn validate_field(input: &ContactFormInput, field: &str) -> Option<String> {
    field_error_map(input).remove(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> ContactFormInput {
        ContactFormInput {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            company: "Acme Inc".into(),
            budget: "10k-25k".into(),
            message: "We need help automating our onboarding pipeline".into(),
            consent: true,
            company_website: Some(String::new()),
            elapsed_ms: Some(5000),
        }
    }

    #[test]
    fn valid_form_passes() {
        assert!(validate_form(&valid_input()).is_ok());
        assert!(field_error_map(&valid_input()).is_empty());
    }

    #[test]
    fn name_length_bounds() {
        let mut input = valid_input();
        input.name = "J".into();
        assert_eq!(
            validate_field(&input, "name").as_deref(),
            Some("Name must be at least 2 characters")
        );

        input.name = "Jo".into();
        assert_eq!(validate_field(&input, "name"), None);

        input.name = "x".repeat(100);
        assert_eq!(validate_field(&input, "name"), None);

        input.name = "x".repeat(101);
        assert_eq!(
            validate_field(&input, "name").as_deref(),
            Some("Name must be less than 100 characters")
        );
    }

    #[test]
    fn message_length_bounds() {
        let mut input = valid_input();
        input.message = "too short".into();
        assert!(validate_field(&input, "message").is_some());

        input.message = "x".repeat(10);
        assert!(validate_field(&input, "message").is_none());

        input.message = "x".repeat(1000);
        assert!(validate_field(&input, "message").is_none());

        input.message = "x".repeat(1001);
        assert_eq!(
            validate_field(&input, "message").as_deref(),
            Some("Message must be less than 1000 characters")
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut input = valid_input();
        input.name = "é".repeat(100);
        assert!(validate_field(&input, "name").is_none());
    }

    #[test]
    fn budget_outside_enum_is_rejected() {
        let mut input = valid_input();
        input.budget = "100k+".into();
        assert_eq!(
            validate_field(&input, "budget").as_deref(),
            Some("Please select a budget range")
        );
    }

    #[test]
    fn consent_must_be_true() {
        let mut input = valid_input();
        input.consent = false;
        assert_eq!(
            validate_field(&input, "consent").as_deref(),
            Some("You must agree to the privacy policy")
        );
    }

    #[test]
    fn invalid_email_is_rejected() {
        let mut input = valid_input();
        input.email = "jane.example.com".into();
        assert_eq!(
            validate_field(&input, "email").as_deref(),
            Some("Please enter a valid email address")
        );
    }

    #[test]
    fn honeypot_is_not_checked_by_schema() {
        let mut input = valid_input();
        input.company_website = Some("http://spam.example".into());
        assert!(validate_form(&input).is_ok());
    }

    #[test]
    fn errors_follow_schema_order() {
        let input = ContactFormInput::default();
        let errors = validate_form(&input).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, FIELD_ORDER.to_vec());
    }
}

use std::fmt;
use std::time::Duration;

use actix_web::{
    error::{JsonPayloadError, ResponseError},
    http::{header::{ContentType, ACCESS_CONTROL_ALLOW_ORIGIN}, StatusCode},
    HttpResponse
};
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::Serialize;

use crate::constants::GENERIC_FAILURE_MESSAGE;
use crate::domain::validation::field_errors;

/// How a failed submission should be presented to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The requester can act on it (slow down, fix a field, wait).
    Rejected,
    /// Something on our side failed; the requester can only retry later.
    Unavailable,
}

impl FailureKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FailureKind::Rejected => StatusCode::BAD_REQUEST,
            FailureKind::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug)]
pub enum ContactError {
    RateLimited { reset_at: DateTime<Utc> },
    SpamDetected,
    TooFast { elapsed_ms: u64 },
    Validation(Vec<FieldError>),
    NotConfigured,
    Delivery(MailError),
    Internal(String),
}

impl fmt::Display for ContactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactError::RateLimited { reset_at } => {
                write!(f, "rate limited until {}", reset_at.to_rfc3339())
            }
            ContactError::SpamDetected => write!(f, "honeypot field was filled"),
            ContactError::TooFast { elapsed_ms } => {
                write!(f, "form submitted {}ms after load", elapsed_ms)
            }
            ContactError::Validation(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            ContactError::NotConfigured => write!(f, "mail transport is not configured"),
            ContactError::Delivery(err) => write!(f, "notification delivery failed: {}", err),
            ContactError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for ContactError {}

impl ContactError {
    /// Message safe to show the requester. Never carries transport or request details.
    pub fn user_message(&self) -> String {
        match self {
            ContactError::RateLimited { reset_at } => format!(
                "Too many requests. Please try again after {}.",
                reset_at.format("%H:%M:%S UTC")
            ),
            ContactError::SpamDetected => "Spam detected. Please try again.".to_string(),
            ContactError::TooFast { .. } => {
                "Please take your time filling out the form.".to_string()
            }
            ContactError::Validation(errors) => {
                let messages = errors.iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Validation failed: {}", messages)
            }
            ContactError::NotConfigured => {
                "Email service not configured. Please try again later.".to_string()
            }
            ContactError::Delivery(_) | ContactError::Internal(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ContactError::RateLimited { .. }
            | ContactError::SpamDetected
            | ContactError::TooFast { .. }
            | ContactError::Validation(_) => FailureKind::Rejected,
            ContactError::NotConfigured
            | ContactError::Delivery(_)
            | ContactError::Internal(_) => FailureKind::Unavailable,
        }
    }
}

impl From<MailError> for ContactError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::NotConfigured => ContactError::NotConfigured,
            other => ContactError::Delivery(other),
        }
    }
}

impl From<validator::ValidationErrors> for ContactError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ContactError::Validation(field_errors(&errors))
    }
}

#[derive(Debug, Display)]
pub enum MailError {
    #[display("Mail transport is not configured")]
    NotConfigured,

    #[display("Failed to connect to {host}: {reason}")]
    Connect { host: String, reason: String },

    #[display("Failed to send message to {recipient}: {reason}")]
    Send { recipient: String, reason: String },

    #[display("Mail dispatch timed out after {_0:?}")]
    Timeout(Duration),
}

impl std::error::Error for MailError {}

#[derive(Debug, Display)]
pub enum RateLimitError {
    #[display("Rate limit backend unavailable: {_0}")]
    Backend(String),
}

impl std::error::Error for RateLimitError {}

impl From<redis::RedisError> for RateLimitError {
    fn from(err: redis::RedisError) -> Self {
        RateLimitError::Backend(err.to_string())
    }
}

impl From<deadpool_redis::PoolError> for RateLimitError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        RateLimitError::Backend(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Error returned for request bodies that are not valid JSON for the contact form.
#[derive(Debug)]
pub struct JsonError {
    message: String,
    status: StatusCode
}

impl JsonError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        JsonError {
            message: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonPayloadError> for JsonError {
    fn from(err: JsonPayloadError) -> Self {
        match err {
            JsonPayloadError::ContentType => {
                JsonError::bad_request("Request body must be JSON")
            }
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                JsonError::bad_request("Request body is too large")
            }
            _ => JsonError::bad_request("Invalid request body"),
        }
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status)
            .insert_header(ContentType::json())
            .insert_header((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
            .json(serde_json::json!({ "success": false, "error": self.message }))
    }
}

//! Error types for support-tickets
//!
//! Domain failures (validation, missing tickets, lifecycle violations) are
//! recovered by the request handlers and turned into user-facing messages.
//! Infrastructure failures (I/O, serialization, configuration) propagate.

use crate::core::Status;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for support-tickets operations
pub type Result<T> = std::result::Result<T, TicketError>;

/// A single invalid input field and why it was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Error for a required field that was missing or blank
    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, "This field is required.")
    }
}

/// Field errors collected while validating one submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Whether a given field has been rejected
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Turn the collected errors into a result
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(TicketError::Validation(self))
        }
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Main error type for support-tickets
#[derive(Error, Debug)]
pub enum TicketError {
    /// Bad or missing input, one entry per invalid field
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Record absent, soft-deleted, or not visible to the caller
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Operation not permitted in the ticket's current status
    #[error("Cannot {operation} a ticket whose status is {status}")]
    InvalidState {
        status: Status,
        operation: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl TicketError {
    /// Single-field validation failure
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(FieldError::new(field, message).into())
    }

    /// Missing ticket
    pub fn ticket_not_found(id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: "Ticket",
            id: id.to_string(),
        }
    }

    /// Missing comment
    pub fn comment_not_found(id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: "Comment",
            id: id.to_string(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the caller can fix this by changing their request
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::InvalidState { .. }
        )
    }

    /// Message suitable for end users; never reveals infrastructure details
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            Self::NotFound { entity, .. } => format!("{entity} not found!"),
            Self::InvalidState { .. } => self.to_string(),
            _ => "An internal error occurred. Please try again later.".to_string(),
        }
    }
}

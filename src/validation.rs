//! Input validation for ticket, comment and rating submissions
//!
//! Each function either returns the cleaned values or a
//! [`TicketError::Validation`] listing every rejected field.

use crate::core::{AttachmentRef, Rating};
use crate::error::{FieldError, FieldErrors, Result, TicketError};

/// Longest subject the ticket table accepts
pub const SUBJECT_MAX_LENGTH: usize = 255;

/// Cleaned ticket submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketInput {
    pub subject: String,
    pub description: String,
    pub attachment: Option<AttachmentRef>,
}

/// Cleaned comment submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentInput {
    pub comment: String,
    pub attachment: Option<AttachmentRef>,
}

/// Trim a required text field, recording an error when it is blank
fn required(field: &str, value: &str, errors: &mut FieldErrors) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        errors.push(FieldError::required(field));
        None
    } else {
        Some(value.to_string())
    }
}

fn check_subject_length(subject: &str, errors: &mut FieldErrors) {
    let length = subject.chars().count();
    if length > SUBJECT_MAX_LENGTH {
        errors.push(FieldError::new(
            "subject",
            format!(
                "Ensure this value has at most {SUBJECT_MAX_LENGTH} characters (it has {length})."
            ),
        ));
    }
}

/// Validate a new ticket
pub fn validate_ticket(
    subject: &str,
    description: &str,
    attachment: Option<AttachmentRef>,
) -> Result<TicketInput> {
    let mut errors = FieldErrors::new();
    let subject = required("subject", subject, &mut errors);
    if let Some(subject) = &subject {
        check_subject_length(subject, &mut errors);
    }
    let description = required("description", description, &mut errors);

    match (subject, description) {
        (Some(subject), Some(description)) if errors.is_empty() => Ok(TicketInput {
            subject,
            description,
            attachment,
        }),
        _ => Err(TicketError::Validation(errors)),
    }
}

/// Validate a replacement subject
pub fn validate_subject(subject: &str) -> Result<String> {
    let mut errors = FieldErrors::new();
    let subject = required("subject", subject, &mut errors);
    if let Some(subject) = &subject {
        check_subject_length(subject, &mut errors);
    }
    errors.into_result()?;
    subject.ok_or_else(|| TicketError::Validation(FieldError::required("subject").into()))
}

/// Validate a new comment
pub fn validate_comment(comment: &str, attachment: Option<AttachmentRef>) -> Result<CommentInput> {
    let mut errors = FieldErrors::new();
    match required("comment", comment, &mut errors) {
        Some(comment) => Ok(CommentInput {
            comment,
            attachment,
        }),
        None => Err(TicketError::Validation(errors)),
    }
}

/// Parse a submitted star count
///
/// A missing or blank value means the default of five stars.
pub fn parse_rating(raw: Option<&str>) -> Result<Rating> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Rating::DEFAULT);
    };
    let stars: i64 = raw.parse().map_err(|_| {
        TicketError::invalid_field("rating_stars", format!("'{raw}' is not a whole number."))
    })?;
    Rating::new(stars)
}

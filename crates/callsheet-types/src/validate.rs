//! Input validation for the public intake endpoints.
//!
//! Handlers accept raw `serde_json::Value` payloads and narrow them here, so
//! a malformed body and a well-formed body with bad fields both fail the same
//! way: a [`ValidationError`] the API layer renders as a 400 envelope.

use serde_json::Value;
use thiserror::Error;

use crate::api::{ContactSubmission, SubscribeRequest};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid input")]
    InvalidInput,
    #[error("Invalid email")]
    InvalidEmail,
}

/// Syntactic email check: one `@`, non-empty local part, and a domain with a
/// dot that neither starts nor ends one. Deliverability is not our problem.
pub fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') && domain.len() >= 3
}

/// Narrow an untyped payload into a contact submission.
///
/// Requires non-empty `fullName` and `message` and a syntactically valid
/// `email`. `phone` is optional and unconstrained; an empty string is
/// normalized away. Unknown fields are ignored. Every failure reports as
/// `Invalid input` — the contact form shows one message for the whole
/// schema, unlike the single-field subscribe endpoint.
pub fn parse_contact(payload: Value) -> Result<ContactSubmission, ValidationError> {
    let mut submission: ContactSubmission =
        serde_json::from_value(payload).map_err(|_| ValidationError::InvalidInput)?;

    submission.full_name = submission.full_name.trim().to_string();
    submission.message = submission.message.trim().to_string();
    submission.email = submission.email.trim().to_string();
    submission.phone = submission
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    if submission.full_name.is_empty() || submission.message.is_empty() {
        return Err(ValidationError::InvalidInput);
    }
    if !is_valid_email(&submission.email) {
        return Err(ValidationError::InvalidInput);
    }

    Ok(submission)
}

/// Narrow an untyped payload into a subscription request.
pub fn parse_subscribe(payload: Value) -> Result<SubscribeRequest, ValidationError> {
    let mut req: SubscribeRequest =
        serde_json::from_value(payload).map_err(|_| ValidationError::InvalidEmail)?;

    req.email = req.email.trim().to_string();
    if !is_valid_email(&req.email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(req)
}

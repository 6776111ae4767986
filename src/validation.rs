//! Form-level validation run before input reaches a service.
//!
//! Field rules live on the request types as `validator` attributes; this
//! module holds the custom checks and the helper that picks the message to
//! show.

use crate::config::{COURSES, EMAIL_DOMAINS, PERIODS, SUBJECTS, VALIDATION_RULES};
use crate::error::{ClientError, Result};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// Accept only addresses in one of the institutional domains.
pub fn institutional_email(email: &str) -> std::result::Result<(), ValidationError> {
    if EMAIL_DOMAINS.iter().any(|domain| email.ends_with(domain)) {
        Ok(())
    } else {
        Err(ValidationError::new("institutional_email").with_message(Cow::Borrowed(
            "Email must be institutional (@univali.br or @edu.univali.br)",
        )))
    }
}

/// Minimum length plus at least one lowercase, one uppercase and one digit.
pub fn password_strength(password: &str) -> std::result::Result<(), ValidationError> {
    if password.chars().count() < VALIDATION_RULES.password_min_length {
        return Err(
            ValidationError::new("password_length").with_message(Cow::Owned(format!(
                "Password must have at least {} characters",
                VALIDATION_RULES.password_min_length
            ))),
        );
    }

    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if has_lower && has_upper && has_digit {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength").with_message(Cow::Borrowed(
            "Password must contain a lowercase letter, an uppercase letter and a number",
        )))
    }
}

fn catalogue_entry(
    value: &str,
    catalogue: &[&str],
    code: &'static str,
    required: &'static str,
    unknown: &'static str,
) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(code).with_message(Cow::Borrowed(required)))
    } else if catalogue.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(code).with_message(Cow::Borrowed(unknown)))
    }
}

pub fn known_course(course: &str) -> std::result::Result<(), ValidationError> {
    catalogue_entry(course, &COURSES, "course", "Course is required", "Unknown course")
}

pub fn known_period(period: &str) -> std::result::Result<(), ValidationError> {
    catalogue_entry(period, &PERIODS, "period", "Period is required", "Unknown period")
}

pub fn known_subject(subject: &str) -> std::result::Result<(), ValidationError> {
    catalogue_entry(subject, &SUBJECTS, "subject", "Subject is required", "Unknown subject")
}

/// Validate a request, reducing failures to one display message.
pub fn check<T: Validate>(input: &T) -> Result<()> {
    input.validate().map_err(ClientError::from)
}

/// Message content bounds, checked again right before sending.
pub fn message_content(content: &str) -> Result<&str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation("Message cannot be empty".to_string()));
    }
    if trimmed.chars().count() > VALIDATION_RULES.message_max_length {
        return Err(ClientError::Validation(format!(
            "Message must have at most {} characters",
            VALIDATION_RULES.message_max_length
        )));
    }
    Ok(trimmed)
}

/// First human-readable message among the collected errors.
///
/// Fields are visited in name order so the choice is stable.
pub fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field))
            })
        })
        .next()
        .unwrap_or_else(|| "Invalid input".to_string())
}

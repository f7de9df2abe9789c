//! Input validation for submitted forms.
//!
//! Every validator checks all of its fields and reports each failure as a
//! [`FieldError`], so a client can show every problem at once. Fields are
//! checked independently and combined with [`Validated`]. Validators return
//! the cleaned values (trimmed text, normalized e-mail, parsed dates) on
//! success.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::validated::Validated;
use crate::domain::user::normalize_email;

pub const EMAIL_MAX_LENGTH: usize = 120;
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const GROUP_NAME_MIN_LENGTH: usize = 5;
pub const GROUP_NAME_MAX_LENGTH: usize = 15;
pub const TASK_TITLE_MAX_LENGTH: usize = 100;
pub const TASK_DESCRIPTION_MAX_LENGTH: usize = 1000;

const REQUIRED: &str = "This field is required.";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex pattern")
});

// =============================================================================
// Errors
// =============================================================================

/// Failure of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All field failures of one submitted form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed for {} field(s)", errors.len())]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    #[must_use]
    pub const fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }

    /// Whether `field` has at least one error.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }
}

// =============================================================================
// Field rules
// =============================================================================

fn email_rule(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(REQUIRED.to_string());
    }
    if trimmed.chars().count() > EMAIL_MAX_LENGTH {
        return Err(format!(
            "Field cannot be longer than {EMAIL_MAX_LENGTH} characters."
        ));
    }
    if !EMAIL_PATTERN.is_match(trimmed) {
        return Err("Invalid email address.".to_string());
    }
    Ok(normalize_email(trimmed))
}

fn password_rule(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err(REQUIRED.to_string());
    }
    if value.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "Field must be at least {PASSWORD_MIN_LENGTH} characters long."
        ));
    }
    let has_upper = value.chars().any(|character| character.is_ascii_uppercase());
    let has_lower = value.chars().any(|character| character.is_ascii_lowercase());
    let has_digit = value.chars().any(|character| character.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Err(
            "Password must contain an upper case letter, a lower case letter and a digit."
                .to_string(),
        );
    }
    Ok(value.to_string())
}

fn length_rule(value: &str, min: usize, max: usize) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() && min > 0 {
        return Err(REQUIRED.to_string());
    }
    let length = trimmed.chars().count();
    if length < min || length > max {
        return Err(format!(
            "Field must be between {min} and {max} characters long."
        ));
    }
    Ok(trimmed.to_string())
}

/// Empty descriptions are stored as absent.
fn description_rule(value: &str) -> Result<Option<String>, String> {
    let trimmed = value.trim();
    if trimmed.chars().count() > TASK_DESCRIPTION_MAX_LENGTH {
        return Err(format!(
            "Field cannot be longer than {TASK_DESCRIPTION_MAX_LENGTH} characters."
        ));
    }
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Compared against the password as submitted, so a weak password is not
/// also reported as a mismatch.
fn confirmation_rule(password: &str, confirmation: &str) -> Result<(), String> {
    if confirmation.is_empty() {
        return Err(REQUIRED.to_string());
    }
    if confirmation != password {
        return Err("Passwords must match.".to_string());
    }
    Ok(())
}

fn required_rule(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err(REQUIRED.to_string());
    }
    Ok(value.to_string())
}

/// Empty dates are treated as absent.
fn due_date_rule(value: &str) -> Result<Option<NaiveDate>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| "Not a valid date value, expected YYYY-MM-DD.".to_string())
}

// =============================================================================
// Forms
// =============================================================================

/// A valid registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Normalized e-mail.
    pub email: String,
    pub password: String,
}

/// Validates a registration form.
///
/// # Errors
///
/// Returns every failing field among `email`, `password` and
/// `password_confirmation`.
pub fn validate_registration(
    email: &str,
    password: &str,
    password_confirmation: &str,
) -> Result<Registration, ValidationError> {
    Validated::check("email", email_rule(email))
        .map3(
            Validated::check("password", password_rule(password)),
            Validated::check(
                "password_confirmation",
                confirmation_rule(password, password_confirmation),
            ),
            |email, password, ()| Registration { email, password },
        )
        .into_result()
}

/// A valid login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Normalized e-mail.
    pub email: String,
    pub password: String,
}

/// Validates a login form. Password strength is not rechecked here.
///
/// # Errors
///
/// Returns a field error for an invalid e-mail or an empty password.
pub fn validate_login(email: &str, password: &str) -> Result<Credentials, ValidationError> {
    Validated::check("email", email_rule(email))
        .map2(
            Validated::check("password", required_rule(password)),
            |email, password| Credentials { email, password },
        )
        .into_result()
}

/// Validates a group name and returns it trimmed.
///
/// # Errors
///
/// Returns a `name` field error unless the trimmed name has 5 to 15
/// characters.
pub fn validate_group_name(name: &str) -> Result<String, ValidationError> {
    Validated::check(
        "name",
        length_rule(name, GROUP_NAME_MIN_LENGTH, GROUP_NAME_MAX_LENGTH),
    )
    .into_result()
}

/// Validates the e-mail of a user being added to a group.
///
/// # Errors
///
/// Returns an `email` field error for a missing or malformed address.
pub fn validate_member_email(email: &str) -> Result<String, ValidationError> {
    Validated::check("email", email_rule(email)).into_result()
}

/// Cleaned fields of a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Validates the fields of a new task.
///
/// # Errors
///
/// Returns every failing field among `title`, `description` and `due_date`.
pub fn validate_new_task(
    title: &str,
    description: Option<&str>,
    due_date: Option<&str>,
) -> Result<TaskFields, ValidationError> {
    Validated::check("title", length_rule(title, 1, TASK_TITLE_MAX_LENGTH))
        .map3(
            Validated::optional("description", description, description_rule),
            Validated::optional("due_date", due_date, due_date_rule),
            |title, description, due_date| TaskFields {
                title,
                description: description.flatten(),
                due_date: due_date.flatten(),
            },
        )
        .into_result()
}

/// Cleaned changes to an existing task. `None` leaves a field unchanged;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFieldChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
}

/// Validates the submitted subset of task fields.
///
/// # Errors
///
/// Returns every failing field among the submitted ones.
pub fn validate_task_changes(
    title: Option<&str>,
    description: Option<&str>,
    due_date: Option<&str>,
) -> Result<TaskFieldChanges, ValidationError> {
    Validated::optional("title", title, |title| {
        length_rule(title, 1, TASK_TITLE_MAX_LENGTH)
    })
    .map3(
        Validated::optional("description", description, description_rule),
        Validated::optional("due_date", due_date, due_date_rule),
        |title, description, due_date| TaskFieldChanges {
            title,
            description,
            due_date,
        },
    )
    .into_result()
}

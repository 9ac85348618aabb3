// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Form input validation.
//!
//! One explicit validation function per input shape, each returning either a
//! clean result or the list of field errors to surface inline.

use feedback_common::{FeedbackForm, FormErrors, LoginForm, RegisterForm};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Field length constraints
const MIN_USERNAME_LENGTH: usize = 5;
const MAX_USERNAME_LENGTH: usize = 20;
const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 50;
const MAX_NAME_LENGTH: usize = 30;
const MAX_TITLE_LENGTH: usize = 100;

// Regex patterns for validation
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    #[error("Invalid content: {0}")]
    InvalidContent(String),
}

impl ValidationError {
    /// The bare message, without the field prefix `Display` adds.
    pub fn message(&self) -> &str {
        match self {
            ValidationError::InvalidUsername(msg)
            | ValidationError::InvalidPassword(msg)
            | ValidationError::InvalidEmail(msg)
            | ValidationError::InvalidName(msg)
            | ValidationError::InvalidTitle(msg)
            | ValidationError::InvalidContent(msg) => msg,
        }
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a username
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::InvalidUsername(format!(
            "Username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        )));
    }

    // Usernames appear in URLs and storage keys
    if !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::InvalidUsername(
            "Username must contain only letters, digits, hyphens, and underscores".to_string(),
        ));
    }

    Ok(username)
}

/// Validate a password
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password cannot exceed {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(password)
}

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email address cannot be empty".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email address cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email address format".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a first or last name
pub fn validate_name(name: &str) -> ValidationResult<&str> {
    if name.is_empty() {
        return Err(ValidationError::InvalidName(
            "Name must not be empty".to_string(),
        ));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "Name must be between 1 and {MAX_NAME_LENGTH} characters"
        )));
    }

    Ok(name)
}

/// Validate a feedback title
pub fn validate_title(title: &str) -> ValidationResult<&str> {
    if title.is_empty() {
        return Err(ValidationError::InvalidTitle(
            "Title must not be empty".to_string(),
        ));
    }

    if title.len() > MAX_TITLE_LENGTH {
        return Err(ValidationError::InvalidTitle(format!(
            "Title cannot exceed {MAX_TITLE_LENGTH} characters"
        )));
    }

    Ok(title)
}

/// Validate feedback content. Content is unbounded but required.
pub fn validate_content(content: &str) -> ValidationResult<&str> {
    if content.trim().is_empty() {
        return Err(ValidationError::InvalidContent(
            "Content must not be empty".to_string(),
        ));
    }

    Ok(content)
}

/// Validate a registration form
pub fn validate_register(form: &RegisterForm) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();

    if let Err(e) = validate_username(&form.username) {
        errors.push("username", e.message());
    }
    if let Err(e) = validate_password(&form.password) {
        errors.push("password", e.message());
    }
    if let Err(e) = validate_email(&form.email) {
        errors.push("email", e.message());
    }
    if let Err(e) = validate_name(&form.first_name) {
        errors.push("first_name", e.message());
    }
    if let Err(e) = validate_name(&form.last_name) {
        errors.push("last_name", e.message());
    }

    errors.into_result()
}

/// Validate a login form. Only presence is checked here; whether the
/// credentials are right is the user store's call.
pub fn validate_login(form: &LoginForm) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();

    if form.username.is_empty() {
        errors.push("username", "Username is required");
    }
    if form.password.is_empty() {
        errors.push("password", "Password is required");
    }

    errors.into_result()
}

/// Validate a feedback form (create and update share the shape)
pub fn validate_feedback(form: &FeedbackForm) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();

    if let Err(e) = validate_title(&form.title) {
        errors.push("title", e.message());
    }
    if let Err(e) = validate_content(&form.content) {
        errors.push("content", e.message());
    }

    errors.into_result()
}

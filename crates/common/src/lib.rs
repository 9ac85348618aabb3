// ================
// common/src/lib.rs
// ================
//! Types shared between the feedback backend and its clients:
//! persisted rows, client-safe projections, form payloads, and the
//! field-error shape returned by validation failures.

use serde::{Deserialize, Serialize};

/// Feedback id type, assigned by storage
pub type FeedbackId = u64;

/// A persisted user row.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserRecord {
    /// Primary key, immutable after registration
    pub username: String,
    /// scrypt PHC-format hash, never the plaintext password
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl UserRecord {
    /// Project to the client-safe view (drops the password hash).
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// User information safe to send to clients.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A persisted feedback row, owned by the user named in `username`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeedbackRecord {
    pub id: FeedbackId,
    pub title: String,
    pub content: String,
    /// Owner, foreign key to `UserRecord::username`
    pub username: String,
}

/// Registration form payload
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login form payload
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Feedback create/update form payload
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FeedbackForm {
    pub title: String,
    pub content: String,
}

/// A single field-level validation error
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FieldError {
    /// Form field the error belongs to
    pub field: String,
    pub message: String,
}

/// Errors for a whole form submission, surfaced inline near each field.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FormErrors {
    pub errors: Vec<FieldError>,
}

impl FormErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Collapse into a `Result`, keeping `Ok(())` for a clean form.
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Profile page payload: the user plus everything they own.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProfileResponse {
    pub user: UserInfo,
    pub feedback: Vec<FeedbackRecord>,
}

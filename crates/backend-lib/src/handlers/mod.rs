// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! Route handlers. Each one is pure orchestration: check the session,
//! validate the input, call a store operation, decide where to navigate.

pub mod auth;
pub mod feedback;
pub mod users;

use axum::response::Redirect;

/// Notice slugs carried on redirects, the flash-message analogue. The next
/// page reads the `notice` query parameter and renders it.
pub mod notice {
    pub const LOGIN_REQUIRED: &str = "login-required";
    pub const ACCOUNT_CREATED: &str = "account-created";
    pub const ACCOUNT_DELETED: &str = "account-deleted";
    pub const WELCOME_BACK: &str = "welcome-back";
    pub const GOODBYE: &str = "goodbye";
    pub const FEEDBACK_DELETED: &str = "feedback-deleted";
    pub const NOT_AUTHORIZED: &str = "not-authorized";
}

/// Redirect carrying a notice for the next page to show.
pub(crate) fn redirect_with_notice(path: &str, notice: &str) -> Redirect {
    Redirect::to(&format!("{path}?notice={notice}"))
}

pub(crate) fn profile_path(username: &str) -> String {
    format!("/users/{username}")
}

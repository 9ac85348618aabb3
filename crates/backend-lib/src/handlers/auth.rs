// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Registration, login, and logout.
use crate::auth::session::{clear_cookie, cookie_value, issue_cookie};
use crate::auth::{SessionAuth, SESSION_COOKIE};
use crate::error::AppError;
use crate::storage::Storage;
use crate::validation;
use crate::AppState;
use axum::extract::{Form, State};
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use feedback_common::{FormErrors, LoginForm, RegisterForm};
use std::sync::Arc;

use super::{notice, profile_path, redirect_with_notice};

/// GET /register
pub async fn register_page() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "form": "register" }))
}

/// POST /register
///
/// Creates the user, logs them straight in, and sends them to their
/// profile.
pub async fn register<S>(
    State(state): State<Arc<AppState<S>>>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    validation::validate_register(&form).map_err(AppError::Validation)?;

    let user = match state.users.register(&form).await {
        Ok(user) => user,
        Err(AppError::UsernameTaken(username)) => {
            // Surfaced as a field error, not an unrecovered storage fault
            tracing::warn!(%username, "registration with taken username");
            let mut errors = FormErrors::default();
            errors.push("username", "Username is already taken");
            return Err(AppError::Validation(errors));
        },
        Err(e) => return Err(e),
    };

    let token = state.sessions.login(user.username.clone()).await;
    let cookie = issue_cookie(&token, state.sessions.ttl());

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        redirect_with_notice(&profile_path(&user.username), notice::ACCOUNT_CREATED),
    )
        .into_response())
}

/// GET /login
pub async fn login_page() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "form": "login" }))
}

/// POST /login
pub async fn login<S>(
    State(state): State<Arc<AppState<S>>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    validation::validate_login(&form).map_err(AppError::Validation)?;

    let Some(user) = state
        .users
        .authenticate(&form.username, &form.password)
        .await?
    else {
        // Same answer for an unknown username and a wrong password
        return Err(AppError::AuthenticationFailed);
    };

    let token = state.sessions.login(user.username.clone()).await;
    let cookie = issue_cookie(&token, state.sessions.ttl());
    tracing::info!(username = %user.username, "login");

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        redirect_with_notice(&profile_path(&user.username), notice::WELCOME_BACK),
    )
        .into_response())
}

/// GET /logout
pub async fn logout<S>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    session: SessionAuth,
) -> Response
where
    S: Storage + Clone + Send + Sync + 'static,
{
    match session.username() {
        Some(username) => {
            if let Some(token) = cookie_value(&headers, SESSION_COOKIE) {
                state.sessions.logout(&token).await;
            }
            tracing::info!(username, "logout");
            (
                AppendHeaders([(header::SET_COOKIE, clear_cookie())]),
                redirect_with_notice("/login", notice::GOODBYE),
            )
                .into_response()
        },
        None => redirect_with_notice("/login", notice::LOGIN_REQUIRED).into_response(),
    }
}

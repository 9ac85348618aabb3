// ============================
// crates/backend-lib/src/handlers/users.rs
// ============================
//! Profile page and self-service account deletion.
use crate::auth::session::{clear_cookie, cookie_value};
use crate::auth::{SessionAuth, SESSION_COOKIE};
use crate::error::AppError;
use crate::storage::Storage;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use feedback_common::ProfileResponse;
use std::sync::Arc;

use super::{notice, redirect_with_notice};

/// GET /users/{username}
///
/// A user's profile plus everything they own. Self only.
pub async fn user_profile<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(username): Path<String>,
    session: SessionAuth,
) -> Result<Response, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    if !session.is_user(&username) {
        tracing::warn!(%username, "profile access without matching session");
        return Ok(redirect_with_notice("/login", notice::LOGIN_REQUIRED).into_response());
    }

    let user = state
        .users
        .get_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {username}")))?;
    let feedback = state.feedback.list_by_username(&username).await?;

    Ok(Json(ProfileResponse {
        user: user.to_info(),
        feedback,
    })
    .into_response())
}

/// POST /users/{username}/delete
///
/// Delete the account and, by cascade, all of its feedback. Self only;
/// the session ends with the account.
pub async fn delete_user<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(username): Path<String>,
    headers: HeaderMap,
    session: SessionAuth,
) -> Result<Response, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    if !session.is_user(&username) {
        tracing::warn!(%username, "account delete without matching session");
        return Ok(redirect_with_notice("/login", notice::LOGIN_REQUIRED).into_response());
    }

    state.users.delete(&username).await?;
    if let Some(token) = cookie_value(&headers, SESSION_COOKIE) {
        state.sessions.logout(&token).await;
    }

    Ok((
        AppendHeaders([(header::SET_COOKIE, clear_cookie())]),
        redirect_with_notice("/", notice::ACCOUNT_DELETED),
    )
        .into_response())
}

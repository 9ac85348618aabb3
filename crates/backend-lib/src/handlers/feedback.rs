// ============================
// crates/backend-lib/src/handlers/feedback.rs
// ============================
//! The home listing and ownership-scoped feedback CRUD.
use crate::auth::SessionAuth;
use crate::error::AppError;
use crate::storage::Storage;
use crate::validation;
use crate::AppState;
use axum::extract::{Form, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use feedback_common::{FeedbackForm, FeedbackId};
use std::sync::Arc;

use super::{notice, profile_path, redirect_with_notice};

/// GET /home
///
/// Every feedback record, visible to any logged-in user.
pub async fn home<S>(
    State(state): State<Arc<AppState<S>>>,
    session: SessionAuth,
) -> Result<Response, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    if session.username().is_none() {
        return Ok(redirect_with_notice("/login", notice::LOGIN_REQUIRED).into_response());
    }

    let feedback = state.feedback.list_all().await?;
    Ok(Json(feedback).into_response())
}

/// GET /users/{username}/feedback/add
pub async fn feedback_form(Path(username): Path<String>, session: SessionAuth) -> Response {
    if !session.is_user(&username) {
        return redirect_with_notice("/", notice::LOGIN_REQUIRED).into_response();
    }
    Json(serde_json::json!({ "form": "feedback" })).into_response()
}

/// POST /users/{username}/feedback/add
pub async fn add_feedback<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(username): Path<String>,
    session: SessionAuth,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    if !session.is_user(&username) {
        tracing::warn!(%username, "feedback add without matching session");
        return Ok(redirect_with_notice("/", notice::LOGIN_REQUIRED).into_response());
    }

    validation::validate_feedback(&form).map_err(AppError::Validation)?;
    let record = state
        .feedback
        .create(&form.title, &form.content, &username)
        .await?;

    Ok(Redirect::to(&profile_path(&record.username)).into_response())
}

/// GET /feedback/{id}/update
///
/// The record being edited, for pre-populating the form. Owner only.
pub async fn update_feedback_page<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<FeedbackId>,
    session: SessionAuth,
) -> Result<Response, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let record = state
        .feedback
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("feedback {id}")))?;

    if !session.is_user(&record.username) {
        return Ok(Redirect::to(&profile_path(&record.username)).into_response());
    }

    Ok(Json(record).into_response())
}

/// POST /feedback/{id}/update
pub async fn update_feedback<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<FeedbackId>,
    session: SessionAuth,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let record = state
        .feedback
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("feedback {id}")))?;

    if !session.is_user(&record.username) {
        tracing::warn!(id, owner = %record.username, "feedback update by non-owner");
        return Ok(Redirect::to(&profile_path(&record.username)).into_response());
    }

    validation::validate_feedback(&form).map_err(AppError::Validation)?;
    let updated = state.feedback.update(id, &form.title, &form.content).await?;

    Ok(Redirect::to(&profile_path(&updated.username)).into_response())
}

/// POST /feedback/{id}/delete
pub async fn delete_feedback<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<FeedbackId>,
    session: SessionAuth,
) -> Result<Response, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let SessionAuth::Authenticated(current) = session else {
        // The one authorization failure that answers 401 instead of redirecting
        return Err(AppError::Unauthorized("log in to delete feedback".to_string()));
    };

    let record = state
        .feedback
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("feedback {id}")))?;

    if record.username != current {
        tracing::warn!(id, username = %current, owner = %record.username, "feedback delete by non-owner");
        return Ok(redirect_with_notice("/login", notice::NOT_AUTHORIZED).into_response());
    }

    state.feedback.delete(id).await?;
    Ok(redirect_with_notice(&profile_path(&record.username), notice::FEEDBACK_DELETED).into_response())
}

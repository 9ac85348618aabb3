// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router: the route table plus tracing middleware.
use crate::handlers::{auth, feedback, users};
use crate::storage::Storage;
use crate::AppState;
use axum::{
    response::Redirect,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the application router
pub fn create_router<S>(state: Arc<AppState<S>>) -> Router
where
    S: Storage + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/home", get(feedback::home::<S>))
        .route(
            "/register",
            get(auth::register_page).post(auth::register::<S>),
        )
        .route("/login", get(auth::login_page).post(auth::login::<S>))
        .route("/logout", get(auth::logout::<S>))
        .route("/users/{username}", get(users::user_profile::<S>))
        .route("/users/{username}/delete", post(users::delete_user::<S>))
        .route(
            "/users/{username}/feedback/add",
            get(feedback::feedback_form).post(feedback::add_feedback::<S>),
        )
        .route(
            "/feedback/{id}/update",
            get(feedback::update_feedback_page::<S>).post(feedback::update_feedback::<S>),
        )
        .route("/feedback/{id}/delete", post(feedback::delete_feedback::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Redirect {
    Redirect::to("/home")
}

// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend functionality for the feedback board web service.

pub mod auth;
pub mod config;
pub mod error;
pub mod feedback;
pub mod handlers;
pub mod metrics;
pub mod router;
pub mod storage;
pub mod users;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;
use crate::auth::SessionManager;
use crate::config::Settings;
use crate::feedback::FeedbackStore;
use crate::storage::Storage;
use crate::users::UserStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// User store
    pub users: UserStore<S>,
    /// Feedback store
    pub feedback: FeedbackStore<S>,
    /// Session manager
    pub sessions: Arc<SessionManager>,
    /// Settings
    pub settings: Arc<Settings>,
}

impl<S: Storage + Clone> AppState<S> {
    /// Create a new application state
    pub fn new(storage: S, settings: Settings) -> Self {
        let sessions = Arc::new(SessionManager::new(Duration::from_secs(
            settings.session_ttl_secs,
        )));

        Self {
            users: UserStore::new(storage.clone()),
            feedback: FeedbackStore::new(storage),
            sessions,
            settings: Arc::new(settings),
        }
    }
}

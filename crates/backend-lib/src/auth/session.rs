// ============================
// crates/backend-lib/src/auth/session.rs
// ============================
//! Session lifecycle and the typed per-request session state.
//!
//! A client is either `Anonymous` or `Authenticated(username)`. Logging in
//! mints a uuid token mapped to a [`Session`]; the token travels in an
//! `HttpOnly` cookie and is resolved back to a [`SessionAuth`] by an axum
//! extractor on every request.
use crate::error::AppError;
use crate::metrics as keys;
use crate::storage::Storage;
use crate::AppState;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use metrics::{counter, gauge};
use std::{collections::HashMap, sync::Arc, time::{Duration, SystemTime}};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Session information
#[derive(Clone, Debug)]
pub struct Session {
    pub username: String,
    pub created_at: SystemTime,
    pub expires_at: SystemTime,
}

/// Typed session state carried through handler context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionAuth {
    Anonymous,
    Authenticated(String),
}

impl SessionAuth {
    pub fn username(&self) -> Option<&str> {
        match self {
            SessionAuth::Anonymous => None,
            SessionAuth::Authenticated(username) => Some(username),
        }
    }

    /// True iff this session is authenticated as exactly `username`.
    pub fn is_user(&self, username: &str) -> bool {
        self.username() == Some(username)
    }
}

/// Session manager for handling authentication tokens
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(ttl: Duration) -> Self {
        let manager = SessionManager {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        };

        // Spawn the session cleanup task
        let manager_clone = manager.clone();
        tokio::spawn(async move {
            manager_clone.cleanup_task().await;
        });

        manager
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Anonymous -> Authenticated(username): mint a token for a fresh session.
    pub async fn login(&self, username: String) -> String {
        let token = Uuid::new_v4().to_string();
        let now = SystemTime::now();
        let session = Session {
            username,
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), session);

        counter!(keys::SESSION_CREATED).increment(1);
        gauge!(keys::SESSION_ACTIVE).set(sessions.len() as f64);

        token
    }

    /// Get the live session behind a token, if any. Expired tokens resolve
    /// to `None`.
    pub async fn current(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(token)?;
        if SystemTime::now() < session.expires_at {
            Some(session.clone())
        } else {
            None
        }
    }

    /// Resolve an optional cookie token into the typed session state.
    pub async fn resolve(&self, token: Option<&str>) -> SessionAuth {
        match token {
            Some(token) => match self.current(token).await {
                Some(session) => SessionAuth::Authenticated(session.username),
                None => SessionAuth::Anonymous,
            },
            None => SessionAuth::Anonymous,
        }
    }

    /// Authenticated -> Anonymous: revoke the token. Returns whether a
    /// session was actually removed.
    pub async fn logout(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(token).is_some();

        if removed {
            counter!(keys::SESSION_REVOKED).increment(1);
            gauge!(keys::SESSION_ACTIVE).set(sessions.len() as f64);
        }

        removed
    }

    /// Cleanup task that runs periodically to remove expired sessions
    async fn cleanup_task(&self) {
        let cleanup_interval = Duration::from_secs(60 * 60); // 1 hour

        loop {
            tokio::time::sleep(cleanup_interval).await;

            let mut sessions = self.sessions.write().await;
            let now = SystemTime::now();
            let before_count = sessions.len();

            sessions.retain(|_, session| now < session.expires_at);

            let after_count = sessions.len();
            let removed = before_count - after_count;

            if removed > 0 {
                counter!(keys::SESSION_EXPIRED).increment(removed as u64);
                gauge!(keys::SESSION_ACTIVE).set(after_count as f64);
            }
        }
    }
}

/// Build the `Set-Cookie` value that hands the session token to the client.
pub fn issue_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.as_secs()
    )
}

/// Build the `Set-Cookie` value that removes the session cookie.
pub fn clear_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Pull a named cookie out of the request headers.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

impl<S> FromRequestParts<Arc<AppState<S>>> for SessionAuth
where
    S: Storage + Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_value(&parts.headers, SESSION_COOKIE);
        Ok(state.sessions.resolve(token.as_deref()).await)
    }
}

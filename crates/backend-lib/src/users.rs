// ============================
// crates/backend-lib/src/users.rs
// ============================
//! User store: registration, authentication, deletion.
use crate::auth::{hash_password_secure, verify_password};
use crate::error::AppError;
use crate::metrics as keys;
use crate::storage::Storage;
use feedback_common::{RegisterForm, UserRecord};
use metrics::counter;

/// Persistence and credential operations on users. The password hasher is
/// only ever reached through here.
#[derive(Clone)]
pub struct UserStore<S> {
    storage: S,
}

impl<S: Storage> UserStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Hash the password and persist a new user row. A duplicate username
    /// surfaces as `AppError::UsernameTaken`.
    pub async fn register(&self, form: &RegisterForm) -> Result<UserRecord, AppError> {
        let mut plain = form.password.clone();
        let password_hash =
            hash_password_secure(&mut plain).map_err(|e| AppError::Internal(e.to_string()))?;

        let user = UserRecord {
            username: form.username.clone(),
            password_hash,
            email: form.email.clone(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
        };

        self.storage.put_user(&user).await?;
        counter!(keys::USER_REGISTERED).increment(1);
        tracing::info!(username = %user.username, "user registered");
        Ok(user)
    }

    /// Look up the user and verify the password. `None` covers both an
    /// unknown username and a wrong password, so callers cannot tell the
    /// two apart.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        match self.storage.get_user(username).await? {
            Some(user) if verify_password(&user.password_hash, password) => {
                counter!(keys::LOGIN_SUCCEEDED).increment(1);
                Ok(Some(user))
            },
            _ => {
                counter!(keys::LOGIN_FAILED).increment(1);
                Ok(None)
            },
        }
    }

    /// Remove the user row; storage cascades to all owned feedback.
    pub async fn delete(&self, username: &str) -> Result<(), AppError> {
        self.storage.delete_user(username).await?;
        counter!(keys::USER_DELETED).increment(1);
        tracing::info!(username, "user deleted");
        Ok(())
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        self.storage.get_user(username).await
    }
}

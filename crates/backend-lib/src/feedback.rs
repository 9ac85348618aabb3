// ============================
// crates/backend-lib/src/feedback.rs
// ============================
//! Feedback store: ownership-scoped CRUD over feedback rows.
use crate::error::AppError;
use crate::metrics as keys;
use crate::storage::Storage;
use feedback_common::{FeedbackId, FeedbackRecord};
use metrics::counter;

#[derive(Clone)]
pub struct FeedbackStore<S> {
    storage: S,
}

impl<S: Storage> FeedbackStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Persist a new feedback row owned by `username`; the id is assigned
    /// by storage.
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        username: &str,
    ) -> Result<FeedbackRecord, AppError> {
        let record = self.storage.insert_feedback(title, content, username).await?;
        counter!(keys::FEEDBACK_CREATED).increment(1);
        tracing::info!(id = record.id, username, "feedback created");
        Ok(record)
    }

    pub async fn get_by_id(&self, id: FeedbackId) -> Result<Option<FeedbackRecord>, AppError> {
        self.storage.get_feedback(id).await
    }

    /// All feedback, for the home-page listing.
    pub async fn list_all(&self) -> Result<Vec<FeedbackRecord>, AppError> {
        self.storage.list_feedback().await
    }

    pub async fn list_by_username(
        &self,
        username: &str,
    ) -> Result<Vec<FeedbackRecord>, AppError> {
        self.storage.list_feedback_by_user(username).await
    }

    /// Rewrite title/content in place; `NotFound` if the id is absent,
    /// never a silent success.
    pub async fn update(
        &self,
        id: FeedbackId,
        title: &str,
        content: &str,
    ) -> Result<FeedbackRecord, AppError> {
        let record = self.storage.update_feedback(id, title, content).await?;
        counter!(keys::FEEDBACK_UPDATED).increment(1);
        Ok(record)
    }

    pub async fn delete(&self, id: FeedbackId) -> Result<(), AppError> {
        self.storage.delete_feedback(id).await?;
        counter!(keys::FEEDBACK_DELETED).increment(1);
        tracing::info!(id, "feedback deleted");
        Ok(())
    }
}

// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Storage abstraction with flat-file implementation.
//!
//! Two "tables" live under the data root: `users/<username>.json` and
//! `feedback/<id>.json`. The storage layer, not its callers, enforces the
//! relational constraints: username uniqueness, the feedback -> user foreign
//! key, and cascade delete of a user's feedback.
use std::{fs, path::{Path, PathBuf}};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::{fs as tokio_fs, sync::Mutex};
use async_trait::async_trait;
use crate::error::AppError;
use feedback_common::{FeedbackId, FeedbackRecord, UserRecord};

/// Trait for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist a new user row; fails with `UsernameTaken` on duplicates
    async fn put_user(&self, user: &UserRecord) -> Result<(), AppError>;

    /// Read a user row by username
    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, AppError>;

    /// Remove a user row and, by cascade, every feedback row it owns
    async fn delete_user(&self, username: &str) -> Result<(), AppError>;

    /// Persist a new feedback row with a storage-assigned id; the owner
    /// must exist
    async fn insert_feedback(
        &self,
        title: &str,
        content: &str,
        username: &str,
    ) -> Result<FeedbackRecord, AppError>;

    /// Read a feedback row by id
    async fn get_feedback(&self, id: FeedbackId) -> Result<Option<FeedbackRecord>, AppError>;

    /// Read all feedback rows in insertion order
    async fn list_feedback(&self) -> Result<Vec<FeedbackRecord>, AppError>;

    /// Read all feedback rows owned by a user, in insertion order
    async fn list_feedback_by_user(
        &self,
        username: &str,
    ) -> Result<Vec<FeedbackRecord>, AppError>;

    /// Rewrite title/content of an existing feedback row
    async fn update_feedback(
        &self,
        id: FeedbackId,
        title: &str,
        content: &str,
    ) -> Result<FeedbackRecord, AppError>;

    /// Remove a feedback row
    async fn delete_feedback(&self, id: FeedbackId) -> Result<(), AppError>;
}

/// Flat-file implementation of the Storage trait
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
    next_id: Arc<AtomicU64>,
    // Serializes mutations so uniqueness, FK, and cascade checks are atomic
    write_lock: Arc<Mutex<()>>,
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("users"))?;
        fs::create_dir_all(root.join("feedback"))?;

        // Seed the id counter from whatever already exists on disk
        let mut max_id = 0u64;
        for entry in fs::read_dir(root.join("feedback"))? {
            let entry = entry?;
            if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                if let Ok(id) = stem.parse::<u64>() {
                    max_id = max_id.max(id);
                }
            }
        }

        Ok(Self {
            root,
            next_id: Arc::new(AtomicU64::new(max_id + 1)),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn user_path(&self, username: &str) -> PathBuf {
        self.root.join("users").join(format!("{username}.json"))
    }

    fn feedback_path(&self, id: FeedbackId) -> PathBuf {
        self.root.join("feedback").join(format!("{id}.json"))
    }

    // Usernames land in file paths; reject anything that could escape the
    // users directory. Validation upstream is stricter than this.
    fn is_safe_key(username: &str) -> bool {
        !username.is_empty()
            && !username.contains(['/', '\\'])
            && username != "."
            && username != ".."
    }

    async fn read_user(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        if !Self::is_safe_key(username) {
            return Ok(None);
        }
        let path = self.user_path(username);
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio_fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn read_feedback(&self, id: FeedbackId) -> Result<Option<FeedbackRecord>, AppError> {
        let path = self.feedback_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio_fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn write_feedback(&self, feedback: &FeedbackRecord) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(feedback)?;
        tokio_fs::write(self.feedback_path(feedback.id), json).await?;
        Ok(())
    }

    async fn collect_feedback(
        &self,
        owner: Option<&str>,
    ) -> Result<Vec<FeedbackRecord>, AppError> {
        let mut records = Vec::new();
        let mut dir = tokio_fs::read_dir(self.root.join("feedback")).await?;
        while let Some(entry) = dir.next_entry().await? {
            let content = tokio_fs::read_to_string(entry.path()).await?;
            let record: FeedbackRecord = serde_json::from_str(&content)?;
            if owner.is_none() || owner == Some(record.username.as_str()) {
                records.push(record);
            }
        }
        // Ids are monotonic, so this is insertion order
        records.sort_by_key(|record| record.id);
        Ok(records)
    }
}

#[async_trait]
impl Storage for FlatFileStorage {
    async fn put_user(&self, user: &UserRecord) -> Result<(), AppError> {
        if !Self::is_safe_key(&user.username) {
            return Err(AppError::Internal(format!(
                "unstorable username: {}",
                user.username
            )));
        }

        let _guard = self.write_lock.lock().await;

        let path = self.user_path(&user.username);
        if path.exists() {
            return Err(AppError::UsernameTaken(user.username.clone()));
        }

        let json = serde_json::to_string_pretty(user)?;
        tokio_fs::write(&path, json).await?;
        Ok(())
    }

    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        self.read_user(username).await
    }

    async fn delete_user(&self, username: &str) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        let path = self.user_path(username);
        if !Self::is_safe_key(username) || !path.exists() {
            return Err(AppError::NotFound(format!("user {username}")));
        }

        tokio_fs::remove_file(&path).await?;

        // Cascade: no feedback row may outlive its owner
        for record in self.collect_feedback(Some(username)).await? {
            tokio_fs::remove_file(self.feedback_path(record.id)).await?;
        }

        Ok(())
    }

    async fn insert_feedback(
        &self,
        title: &str,
        content: &str,
        username: &str,
    ) -> Result<FeedbackRecord, AppError> {
        let _guard = self.write_lock.lock().await;

        // Foreign key: the owner must exist at insert time
        if self.read_user(username).await?.is_none() {
            return Err(AppError::NotFound(format!("user {username}")));
        }

        let record = FeedbackRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            title: title.to_string(),
            content: content.to_string(),
            username: username.to_string(),
        };

        self.write_feedback(&record).await?;
        Ok(record)
    }

    async fn get_feedback(&self, id: FeedbackId) -> Result<Option<FeedbackRecord>, AppError> {
        self.read_feedback(id).await
    }

    async fn list_feedback(&self) -> Result<Vec<FeedbackRecord>, AppError> {
        self.collect_feedback(None).await
    }

    async fn list_feedback_by_user(
        &self,
        username: &str,
    ) -> Result<Vec<FeedbackRecord>, AppError> {
        self.collect_feedback(Some(username)).await
    }

    async fn update_feedback(
        &self,
        id: FeedbackId,
        title: &str,
        content: &str,
    ) -> Result<FeedbackRecord, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut record = self
            .read_feedback(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("feedback {id}")))?;

        record.title = title.to_string();
        record.content = content.to_string();
        self.write_feedback(&record).await?;
        Ok(record)
    }

    async fn delete_feedback(&self, id: FeedbackId) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        let path = self.feedback_path(id);
        if !path.exists() {
            return Err(AppError::NotFound(format!("feedback {id}")));
        }

        tokio_fs::remove_file(&path).await?;
        Ok(())
    }
}

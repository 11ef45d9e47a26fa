use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use lesson_core::model::{LessonId, ProgressRecord, UserId};

/// Retention window for cached progress records. Older records are
/// treated as absent on read.
pub const PROGRESS_RETENTION_DAYS: i64 = 365;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Payload pushed to the remote progress endpoint.
///
/// Mirrors the sync API's JSON shape; `user_id` is omitted for anonymous
/// sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub lesson_id: LessonId,
    pub step_index: usize,
    pub completed: bool,
    pub timestamp: DateTime<Utc>,
}

/// Durable local cache of the latest lesson position.
///
/// Keyed by user (anonymous allowed) and lesson. Absent, expired, or
/// malformed entries resolve to `None` on read; they must never fail a
/// lesson load.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Persist or replace the cached position for a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_progress(
        &self,
        user_id: Option<&UserId>,
        record: &ProgressRecord,
    ) -> Result<(), StorageError>;

    /// Fetch the cached position for a lesson, if any survives the
    /// retention window.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for storage-level failures; a missing
    /// or stale record is `Ok(None)`.
    async fn load_progress(
        &self,
        user_id: Option<&UserId>,
        lesson_id: &LessonId,
    ) -> Result<Option<ProgressRecord>, StorageError>;
}

/// Best-effort remote sync of progress updates.
///
/// Callers treat failures as log-and-forget; retry policy, if any,
/// belongs behind this trait, not in front of it.
#[async_trait]
pub trait ProgressSync: Send + Sync {
    /// Push one update to the remote endpoint.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the push does not succeed.
    async fn push(&self, update: &SyncUpdate) -> Result<(), StorageError>;
}

pub(crate) fn user_key(user_id: Option<&UserId>) -> String {
    user_id.map(ToString::to_string).unwrap_or_default()
}

fn is_stale(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - timestamp > Duration::days(PROGRESS_RETENTION_DAYS)
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Implements both the cache and the sync halves; pushed updates are
/// recorded so tests can assert on them.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<(String, LessonId), ProgressRecord>>>,
    pushed: Arc<Mutex<Vec<SyncUpdate>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates pushed through the sync half so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn pushed_updates(&self) -> Vec<SyncUpdate> {
        self.pushed.lock().expect("sync log lock poisoned").clone()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn save_progress(
        &self,
        user_id: Option<&UserId>,
        record: &ProgressRecord,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(
            (user_key(user_id), record.lesson_id.clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn load_progress(
        &self,
        user_id: Option<&UserId>,
        lesson_id: &LessonId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let record = guard.get(&(user_key(user_id), lesson_id.clone())).cloned();
        Ok(record.filter(|r| !is_stale(r.timestamp, Utc::now())))
    }
}

#[async_trait]
impl ProgressSync for InMemoryRepository {
    async fn push(&self, update: &SyncUpdate) -> Result<(), StorageError> {
        let mut guard = self
            .pushed
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(update.clone());
        Ok(())
    }
}

/// Aggregates the progress cache behind a trait object for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { progress }
    }
}

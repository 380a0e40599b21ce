//! Local key-value port backing the per-device dismiss flag.

use crate::alert::domain::AlertId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for dismiss flag storage.
pub type DismissFlagResult<T> = Result<T, DismissFlagError>;

/// Stored value of the dismiss flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissRecord {
    /// Alert that was on screen when the viewer dismissed it.
    pub alert_id: AlertId,
    /// When the viewer dismissed the alarm presentation.
    pub dismissed_at: DateTime<Utc>,
}

/// Single-key storage for the dismiss flag.
pub trait DismissFlagStore: Send + Sync {
    /// Reads the stored flag.
    ///
    /// # Errors
    ///
    /// Returns [`DismissFlagError`] when the backing store cannot be read
    /// or holds an unreadable value.
    fn load(&self) -> DismissFlagResult<Option<DismissRecord>>;

    /// Overwrites the stored flag.
    ///
    /// # Errors
    ///
    /// Returns [`DismissFlagError::Storage`] when the write fails.
    fn save(&self, record: DismissRecord) -> DismissFlagResult<()>;

    /// Removes the stored flag. Clearing an absent flag succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`DismissFlagError::Storage`] when the removal fails.
    fn clear(&self) -> DismissFlagResult<()>;
}

/// Errors returned by dismiss flag stores.
#[derive(Debug, Clone, Error)]
pub enum DismissFlagError {
    /// The stored value could not be decoded.
    #[error("corrupt dismiss flag: {0}")]
    Corrupt(String),

    /// The backing store failed.
    #[error("dismiss flag storage error: {0}")]
    Storage(Arc<dyn std::error::Error + Send + Sync>),
}

impl DismissFlagError {
    /// Wraps a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Arc::new(err))
    }
}

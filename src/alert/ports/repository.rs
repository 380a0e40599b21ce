//! Repository port for alert documents and their change feed.

use crate::alert::domain::{Alert, AlertId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Result type for alert repository operations.
pub type AlertRepositoryResult<T> = Result<T, AlertRepositoryError>;

/// Notification published by the store after every write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertChange {
    /// A new alert document was written.
    Created(AlertId),
    /// An existing alert document was rewritten.
    Updated(AlertId),
    /// The transport reported a failure; the feed stays attached.
    Interrupted(String),
}

/// Receiving half of an alert change feed.
pub type AlertChangeFeed = broadcast::Receiver<AlertChange>;

/// Alert persistence contract.
#[async_trait]
pub trait AlertRepository: Send + Sync {
    /// Stores a new alert.
    ///
    /// # Errors
    ///
    /// Returns [`AlertRepositoryError::DuplicateAlert`] when the identifier
    /// already exists or [`AlertRepositoryError::Persistence`] when the store
    /// is unreachable.
    async fn store(&self, alert: &Alert) -> AlertRepositoryResult<()>;

    /// Persists changes to an existing alert.
    ///
    /// # Errors
    ///
    /// Returns [`AlertRepositoryError::NotFound`] when the alert does not
    /// exist.
    async fn update(&self, alert: &Alert) -> AlertRepositoryResult<()>;

    /// Finds an alert by identifier.
    async fn find_by_id(&self, id: AlertId) -> AlertRepositoryResult<Option<Alert>>;

    /// Returns the most recent active alert.
    ///
    /// Equivalent to `status = active ORDER BY createdAt DESC LIMIT 1`.
    async fn latest_active(&self) -> AlertRepositoryResult<Option<Alert>>;

    /// Returns every alert, newest first.
    async fn list(&self) -> AlertRepositoryResult<Vec<Alert>>;

    /// Opens a new receiver on the change feed.
    fn changes(&self) -> AlertChangeFeed;
}

/// Errors returned by alert repository implementations.
#[derive(Debug, Clone, Error)]
pub enum AlertRepositoryError {
    /// An alert with the same identifier already exists.
    #[error("duplicate alert identifier: {0}")]
    DuplicateAlert(AlertId),

    /// The alert was not found.
    #[error("alert not found: {0}")]
    NotFound(AlertId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AlertRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

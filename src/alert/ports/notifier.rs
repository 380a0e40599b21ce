//! Push-delivery trigger invoked after an alert has been stored.

use crate::alert::domain::Alert;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notifier operations.
pub type AlertNotifierResult<T> = Result<T, AlertNotifierError>;

/// Hands freshly created alerts to the push-delivery service.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    /// Requests push delivery for a stored alert.
    ///
    /// # Errors
    ///
    /// Returns [`AlertNotifierError`] when the delivery request is rejected.
    async fn alert_raised(&self, alert: &Alert) -> AlertNotifierResult<()>;
}

/// Errors returned by push-delivery adapters.
#[derive(Debug, Clone, Error)]
pub enum AlertNotifierError {
    /// The delivery service rejected the request.
    #[error("push delivery rejected: {0}")]
    Rejected(String),

    /// Transport failure talking to the delivery service.
    #[error("push delivery transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl AlertNotifierError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}

//! Push-delivery double that remembers which alerts it was handed.

use crate::alert::{
    domain::{Alert, AlertId},
    ports::{AlertNotifier, AlertNotifierError, AlertNotifierResult},
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

/// Notifier that records alert identifiers instead of sending pushes.
#[derive(Debug, Clone, Default)]
pub struct RecordingAlertNotifier {
    state: Arc<Mutex<NotifierState>>,
}

#[derive(Debug, Default)]
struct NotifierState {
    delivered: Vec<AlertId>,
    reject_with: Option<String>,
}

impl RecordingAlertNotifier {
    /// Creates a notifier that accepts every request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later request fail with `reason`.
    pub fn reject_all(&self, reason: impl Into<String>) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reject_with = Some(reason.into());
    }

    /// Returns the identifiers of alerts handed over so far.
    #[must_use]
    pub fn delivered(&self) -> Vec<AlertId> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .delivered
            .clone()
    }
}

#[async_trait]
impl AlertNotifier for RecordingAlertNotifier {
    async fn alert_raised(&self, alert: &Alert) -> AlertNotifierResult<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(reason) = &state.reject_with {
            return Err(AlertNotifierError::Rejected(reason.clone()));
        }
        state.delivered.push(alert.id());
        Ok(())
    }
}

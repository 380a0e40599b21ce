//! Raising an alert and handing it to push delivery.

use crate::alert::{
    domain::{Alert, NewAlert},
    ports::{AlertNotifier, AlertRepository, DismissFlagStore},
    services::{AlertBroker, AlertBrokerResult},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Stores alerts through the broker, then triggers push delivery.
///
/// Push delivery only starts once the alert document exists. Its outcome is
/// logged and never changes the result of [`Self::raise`].
pub struct AlertDispatchService<R, F, C, N>
where
    R: AlertRepository + 'static,
    F: DismissFlagStore + 'static,
    C: Clock + Send + Sync + 'static,
    N: AlertNotifier,
{
    broker: Arc<AlertBroker<R, F, C>>,
    notifier: Arc<N>,
}

impl<R, F, C, N> AlertDispatchService<R, F, C, N>
where
    R: AlertRepository + 'static,
    F: DismissFlagStore + 'static,
    C: Clock + Send + Sync + 'static,
    N: AlertNotifier,
{
    /// Creates a dispatch service.
    #[must_use]
    pub const fn new(broker: Arc<AlertBroker<R, F, C>>, notifier: Arc<N>) -> Self {
        Self { broker, notifier }
    }

    /// Raises an alert and requests push delivery for it.
    ///
    /// # Errors
    ///
    /// Returns the broker's error when the alert cannot be stored; push
    /// delivery is not attempted in that case.
    pub async fn raise(&self, request: NewAlert) -> AlertBrokerResult<Alert> {
        let alert = self.broker.raise(request).await?;
        match self.notifier.alert_raised(&alert).await {
            Ok(()) => info!(alert_id = %alert.id(), "push delivery requested"),
            Err(err) => warn!(alert_id = %alert.id(), error = %err, "push delivery request failed"),
        }
        Ok(alert)
    }
}

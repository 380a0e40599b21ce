//! Per-device dismiss flag for the full-screen alarm presentation.

use crate::alert::domain::AlertId;
use crate::alert::ports::{DismissFlagResult, DismissFlagStore, DismissRecord};
use crate::config::DismissScope;
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

/// Records whether the local viewer has hidden the alarm presentation.
///
/// Dismissal never changes the alert on the server; it only suppresses the
/// local full-screen view until the flag is cleared.
pub struct DismissStateStore<S, C>
where
    S: DismissFlagStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    scope: DismissScope,
}

impl<S, C> DismissStateStore<S, C>
where
    S: DismissFlagStore,
    C: Clock + Send + Sync,
{
    /// Creates a dismiss state over the given flag store.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, scope: DismissScope) -> Self {
        Self {
            store,
            clock,
            scope,
        }
    }

    /// Returns the configured reach of a dismissal.
    #[must_use]
    pub const fn scope(&self) -> DismissScope {
        self.scope
    }

    /// Returns `true` when the presentation of `alert_id` is suppressed.
    ///
    /// With [`DismissScope::Device`] any stored flag suppresses the alert,
    /// including alerts raised after the dismissal.
    ///
    /// # Errors
    ///
    /// Returns the flag store's error when the flag cannot be read.
    pub fn is_dismissed(&self, alert_id: AlertId) -> DismissFlagResult<bool> {
        let record = self.store.load()?;
        Ok(match (self.scope, record) {
            (_, None) => false,
            (DismissScope::Device, Some(_)) => true,
            (DismissScope::PerAlert, Some(record)) => record.alert_id == alert_id,
        })
    }

    /// Returns `true` when any dismissal is stored.
    ///
    /// # Errors
    ///
    /// Returns the flag store's error when the flag cannot be read.
    pub fn is_flag_set(&self) -> DismissFlagResult<bool> {
        Ok(self.store.load()?.is_some())
    }

    /// Stores a dismissal for `alert_id`.
    ///
    /// # Errors
    ///
    /// Returns the flag store's error when the write fails.
    pub fn set_dismissed(&self, alert_id: AlertId) -> DismissFlagResult<()> {
        self.store.save(DismissRecord {
            alert_id,
            dismissed_at: self.clock.utc(),
        })?;
        debug!(%alert_id, "alarm presentation dismissed");
        Ok(())
    }

    /// Removes any stored dismissal.
    ///
    /// # Errors
    ///
    /// Returns the flag store's error when the removal fails.
    pub fn clear(&self) -> DismissFlagResult<()> {
        self.store.clear()?;
        debug!("dismiss flag cleared");
        Ok(())
    }
}

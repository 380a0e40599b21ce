//! Live distribution of the tracked current alert.
//!
//! Each broker instance owns its tracked alert, its listeners, and a pump
//! task reading the repository's change feed. On every change the broker
//! asks the store for the latest active alert once, runs edge detection
//! once (audio and dismiss flag), then pushes the audience-filtered value to
//! every listener on the pump task.

use crate::alert::{
    domain::{Alert, AlertDomainError, AlertId, NewAlert},
    ports::{
        AlertChange, AlertChangeFeed, AlertRepository, AlertRepositoryError, DismissFlagError,
        DismissFlagStore,
    },
    services::{AudioAlarmController, AudioError, DismissStateStore},
};
use crate::config::AlarmConfig;
use crate::identity::{Role, Viewer};
use crate::subscription::{Listener, ListenerRegistry, Subscription, SubscriptionId};
use mockable::Clock;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Failure delivered through a subscription callback after establishment.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The store closed the change feed; no further updates will arrive.
    #[error("alert change feed closed")]
    FeedClosed,

    /// The transport reported a failure; the feed is still attached.
    #[error("alert change feed interrupted: {0}")]
    Interrupted(String),

    /// Loading the latest active alert failed.
    #[error("failed to load the current alert: {0}")]
    Query(String),
}

/// Value pushed to alert listeners: the filtered current alert, `None`, or
/// a subscription failure.
pub type AlertUpdate = Result<Option<Alert>, SubscriptionError>;

/// Service-level errors for alert operations.
#[derive(Debug, Error)]
pub enum AlertBrokerError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] AlertDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] AlertRepositoryError),
    /// The alarm controller rejected a request.
    #[error(transparent)]
    Audio(#[from] AudioError),
    /// The dismiss flag could not be read or written.
    #[error(transparent)]
    Dismiss(#[from] DismissFlagError),
}

/// Result type for alert broker operations.
pub type AlertBrokerResult<T> = Result<T, AlertBrokerError>;

/// Alert broker for one device.
pub struct AlertBroker<R, F, C>
where
    R: AlertRepository + 'static,
    F: DismissFlagStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    inner: Arc<BrokerInner<R, F, C>>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

struct BrokerInner<R, F, C>
where
    R: AlertRepository,
    F: DismissFlagStore,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    audio: AudioAlarmController,
    dismiss: DismissStateStore<F, C>,
    clock: Arc<C>,
    exempt_role: Role,
    listeners: ListenerRegistry<Viewer, AlertUpdate>,
    tracked: RwLock<Option<Alert>>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl<R, F, C> AlertBroker<R, F, C>
where
    R: AlertRepository + 'static,
    F: DismissFlagStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a broker with no listeners and no tracked alert.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        audio: AudioAlarmController,
        dismiss: DismissStateStore<F, C>,
        clock: Arc<C>,
        alarm: &AlarmConfig,
    ) -> Self {
        Self {
            inner: Arc::new(BrokerInner {
                repository,
                audio,
                dismiss,
                clock,
                exempt_role: alarm.exempt_role,
                listeners: ListenerRegistry::new(),
                tracked: RwLock::new(None),
                refresh_lock: tokio::sync::Mutex::new(()),
            }),
            pump: Mutex::new(None),
        }
    }

    /// Raises and stores a new active alert.
    ///
    /// Neither the alarm sound nor push delivery is triggered here; the
    /// sound follows from the change feed and push delivery is the caller's
    /// concern.
    ///
    /// # Errors
    ///
    /// Returns [`AlertBrokerError::Repository`] when the store rejects the
    /// write. No retry is attempted.
    pub async fn raise(&self, request: NewAlert) -> AlertBrokerResult<Alert> {
        let alert = Alert::raise(request, &*self.inner.clock);
        self.inner.repository.store(&alert).await?;
        info!(
            alert_id = %alert.id(),
            kind = %alert.kind(),
            raised_by = %alert.raised_by().user_id(),
            "alert raised"
        );
        Ok(alert)
    }

    /// Raises a new alert and returns its identifier.
    ///
    /// # Errors
    ///
    /// See [`Self::raise`].
    pub async fn create(&self, request: NewAlert) -> AlertBrokerResult<AlertId> {
        Ok(self.raise(request).await?.id())
    }

    /// Attaches a listener for `viewer`.
    ///
    /// The listener first receives the current value from an initial fetch,
    /// then one value per store change. Values are filtered by the alert's
    /// audience, so viewers outside it receive `Ok(None)`. Failures after
    /// establishment arrive as `Err`.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn subscribe<L>(&self, viewer: Viewer, on_change: L) -> Subscription
    where
        L: Fn(AlertUpdate) + Send + Sync + 'static,
    {
        self.ensure_pump();
        let listener: Listener<AlertUpdate> = Arc::new(on_change);
        let subscription = self.inner.listeners.register(viewer.clone(), listener);
        debug!(
            subscription_id = %subscription.id(),
            viewer = %viewer.user_id(),
            role = %viewer.role(),
            "alert subscription opened"
        );
        self.inner.refresh_and_notify(Some(subscription.id())).await;
        subscription
    }

    /// Resets the tracked current alert, then always stops the alarm sound.
    ///
    /// Returns the identifier of the alert that was reset, or `None` when no
    /// alert was tracked.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the status update fails, otherwise
    /// the alarm controller's error.
    pub async fn reset(&self) -> AlertBrokerResult<Option<AlertId>> {
        let outcome = self.reset_tracked().await;
        let stopped = self.inner.audio.stop().await;
        let reset_id = outcome?;
        stopped?;
        Ok(reset_id)
    }

    async fn reset_tracked(&self) -> AlertBrokerResult<Option<AlertId>> {
        let Some(mut alert) = self.current() else {
            debug!("reset requested with no tracked alert");
            return Ok(None);
        };
        alert.reset()?;
        self.inner.repository.update(&alert).await?;
        info!(alert_id = %alert.id(), "alert reset");
        Ok(Some(alert.id()))
    }

    /// Returns the tracked current alert, unfiltered.
    #[must_use]
    pub fn current(&self) -> Option<Alert> {
        self.inner.current()
    }

    /// Hides the full-screen presentation of the tracked alert on this
    /// device. Returns the dismissed alert, or `None` when nothing is
    /// tracked.
    ///
    /// # Errors
    ///
    /// Returns [`AlertBrokerError::Dismiss`] when the flag cannot be stored.
    pub fn dismiss(&self) -> AlertBrokerResult<Option<AlertId>> {
        let Some(alert) = self.current() else {
            return Ok(None);
        };
        self.inner.dismiss.set_dismissed(alert.id())?;
        Ok(Some(alert.id()))
    }

    /// Returns `true` when the tracked alert's presentation is dismissed on
    /// this device.
    ///
    /// # Errors
    ///
    /// Returns [`AlertBrokerError::Dismiss`] when the flag cannot be read.
    pub fn is_dismissed(&self) -> AlertBrokerResult<bool> {
        let Some(alert) = self.current() else {
            return Ok(false);
        };
        Ok(self.inner.dismiss.is_dismissed(alert.id())?)
    }

    /// Returns every alert ever raised, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AlertBrokerError::Repository`] when the query fails.
    pub async fn history(&self) -> AlertBrokerResult<Vec<Alert>> {
        Ok(self.inner.repository.list().await?)
    }

    /// Returns the number of attached listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Returns the alarm controller driven by this broker.
    #[must_use]
    pub fn audio(&self) -> &AudioAlarmController {
        &self.inner.audio
    }

    /// Returns the dismiss flag driven by this broker.
    #[must_use]
    pub fn dismiss_state(&self) -> &DismissStateStore<F, C> {
        &self.inner.dismiss
    }

    fn ensure_pump(&self) {
        let mut pump = self.pump.lock().unwrap_or_else(PoisonError::into_inner);
        if pump.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        let feed = self.inner.repository.changes();
        *pump = Some(tokio::spawn(run_pump(Arc::downgrade(&self.inner), feed)));
    }
}

impl<R, F, C> Drop for AlertBroker<R, F, C>
where
    R: AlertRepository + 'static,
    F: DismissFlagStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let pump = self.pump.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pump.take() {
            handle.abort();
        }
    }
}

impl<R, F, C> BrokerInner<R, F, C>
where
    R: AlertRepository,
    F: DismissFlagStore,
    C: Clock + Send + Sync,
{
    fn current(&self) -> Option<Alert> {
        self.tracked
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recomputes the tracked alert and delivers it either to every listener
    /// or only to `target`. Serialised so deliveries never go out of order.
    async fn refresh_and_notify(&self, target: Option<SubscriptionId>) {
        let _guard = self.refresh_lock.lock().await;
        let update = self.refresh().await;
        let Some(id) = target else {
            self.fan_out(&update);
            return;
        };
        let Some((viewer, listener)) = self.listeners.get(id) else {
            debug!(
                subscription_id = %id,
                "listener detached before initial fetch completed"
            );
            return;
        };
        listener(filter_for(&viewer, &update));
    }

    async fn refresh(&self) -> AlertUpdate {
        let latest = self.repository.latest_active().await.map_err(|err| {
            warn!(error = %err, "failed to load the latest active alert");
            SubscriptionError::Query(err.to_string())
        })?;
        let previous = std::mem::replace(
            &mut *self.tracked.write().unwrap_or_else(PoisonError::into_inner),
            latest.clone(),
        );
        self.on_transition(previous.as_ref(), latest.as_ref()).await;
        Ok(latest)
    }

    async fn on_transition(&self, previous: Option<&Alert>, next: Option<&Alert>) {
        match (previous, next) {
            (None, Some(alert)) => {
                info!(alert_id = %alert.id(), "tracked alert appeared");
                if self.audio_exempt(alert) {
                    debug!(alert_id = %alert.id(), "alarm sound exempt");
                } else if let Err(err) = self.audio.play().await {
                    warn!(error = %err, "failed to start alarm sound");
                }
            }
            (Some(alert), None) => {
                info!(alert_id = %alert.id(), "tracked alert cleared");
                if let Err(err) = self.audio.stop().await {
                    warn!(error = %err, "failed to stop alarm sound");
                }
                if let Err(err) = self.dismiss.clear() {
                    warn!(error = %err, "failed to clear dismiss flag");
                }
            }
            (Some(old), Some(new)) if old.id() != new.id() => {
                info!(from = %old.id(), to = %new.id(), "tracked alert superseded");
            }
            _ => {}
        }
    }

    /// The sound is skipped for alerts raised by the exempt role and on
    /// devices where every attached viewer holds the exempt role. A device
    /// with no attached viewer stays silent too.
    fn audio_exempt(&self, alert: &Alert) -> bool {
        alert.kind() == self.exempt_role
            || self
                .listeners
                .keys()
                .iter()
                .all(|viewer| viewer.role() == self.exempt_role)
    }

    fn fan_out(&self, update: &AlertUpdate) {
        for (id, viewer, listener) in self.listeners.snapshot() {
            debug!(subscription_id = %id, "delivering alert update");
            listener(filter_for(&viewer, update));
        }
    }
}

fn filter_for(viewer: &Viewer, update: &AlertUpdate) -> AlertUpdate {
    match update {
        Ok(Some(alert)) if alert.is_visible_to(viewer) => Ok(Some(alert.clone())),
        Ok(_) => Ok(None),
        Err(err) => Err(err.clone()),
    }
}

async fn run_pump<R, F, C>(inner: Weak<BrokerInner<R, F, C>>, mut feed: AlertChangeFeed)
where
    R: AlertRepository,
    F: DismissFlagStore,
    C: Clock + Send + Sync,
{
    loop {
        let change = feed.recv().await;
        let Some(broker) = inner.upgrade() else {
            break;
        };
        match change {
            Ok(AlertChange::Interrupted(reason)) => {
                warn!(%reason, "alert change feed interrupted");
                broker.fan_out(&Err(SubscriptionError::Interrupted(reason)));
            }
            Ok(change) => {
                debug!(?change, "alert store changed");
                broker.refresh_and_notify(None).await;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "alert change feed lagged, recomputing");
                broker.refresh_and_notify(None).await;
            }
            Err(RecvError::Closed) => {
                warn!("alert change feed closed");
                broker.fan_out(&Err(SubscriptionError::FeedClosed));
                break;
            }
        }
    }
}

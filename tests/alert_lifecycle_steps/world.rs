//! Shared world state for field alert BDD scenarios.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use mockable::DefaultClock;
use patrolcore::alert::{
    adapters::memory::{InMemoryAlertRepository, InMemoryDismissFlagStore, RecordingAudioDevice},
    domain::{Alert, AlertId},
    services::{AlertBroker, AlertUpdate, AudioAlarmController, DismissStateStore},
};
use patrolcore::config::{AlarmConfig, DismissScope};
use patrolcore::identity::Role;
use patrolcore::subscription::Subscription;
use rstest::fixture;

/// Broker type used by the BDD world.
pub type TestBroker = AlertBroker<InMemoryAlertRepository, InMemoryDismissFlagStore, DefaultClock>;

/// Records every update delivered to one subscribed viewer.
#[derive(Clone, Default)]
pub struct ViewerFeed(Arc<Mutex<Vec<AlertUpdate>>>);

impl ViewerFeed {
    /// Returns a listener appending into this feed.
    pub fn listener(&self) -> impl Fn(AlertUpdate) + Send + Sync + 'static {
        let sink = Arc::clone(&self.0);
        move |update| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(update);
        }
    }

    /// Returns the most recent update.
    pub fn last(&self) -> Option<AlertUpdate> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Returns the alert carried by the most recent update, if any.
    pub fn last_alert(&self) -> Option<Alert> {
        self.last().and_then(Result::ok).flatten()
    }
}

/// Scenario world for field alert behaviour tests.
pub struct AlertLifecycleWorld {
    pub repository: Arc<InMemoryAlertRepository>,
    pub device: RecordingAudioDevice,
    pub broker: Option<TestBroker>,
    pub feeds: HashMap<String, (Role, ViewerFeed, Subscription)>,
    pub last_alert: Option<AlertId>,
}

impl AlertLifecycleWorld {
    /// Creates a world with an empty store and no broker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            repository: Arc::new(InMemoryAlertRepository::new()),
            device: RecordingAudioDevice::new(),
            broker: None,
            feeds: HashMap::new(),
            last_alert: None,
        }
    }

    /// Builds the broker. Must run inside the scenario runtime.
    pub fn start_broker(&mut self) {
        let alarm = AlarmConfig::default();
        let clock = Arc::new(DefaultClock);
        let dismiss = DismissStateStore::new(
            Arc::new(InMemoryDismissFlagStore::new()),
            Arc::clone(&clock),
            DismissScope::PerAlert,
        );
        self.broker = Some(AlertBroker::new(
            Arc::clone(&self.repository),
            AudioAlarmController::spawn(self.device.clone(), alarm.volume),
            dismiss,
            clock,
            &alarm,
        ));
    }

    /// Returns the scenario broker.
    pub fn broker(&self) -> Result<&TestBroker, eyre::Report> {
        self.broker
            .as_ref()
            .ok_or_else(|| eyre::eyre!("alert broker not started"))
    }

    /// Returns the feed recorded for `user`, checking it subscribed as `role`.
    pub fn feed(&self, role: &str, user: &str) -> Result<&ViewerFeed, eyre::Report> {
        let expected = Role::try_from(role)?;
        let (subscribed_as, feed, _) = self
            .feeds
            .get(user)
            .ok_or_else(|| eyre::eyre!("{user} is not subscribed"))?;
        eyre::ensure!(
            *subscribed_as == expected,
            "{user} subscribed as {subscribed_as}, not {expected}"
        );
        Ok(feed)
    }
}

impl Default for AlertLifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> AlertLifecycleWorld {
    AlertLifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Polls `condition` until it holds or roughly a second has passed.
pub fn eventually(condition: impl Fn() -> bool) -> bool {
    run_async(async {
        for _ in 0..200 {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        condition()
    })
}

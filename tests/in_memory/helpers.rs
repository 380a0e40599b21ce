//! Shared test helpers for in-memory integration tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use patrolcore::alert::{
    adapters::memory::{InMemoryAlertRepository, InMemoryDismissFlagStore, RecordingAudioDevice},
    domain::{Alert, NewAlert, RaisedBy},
    services::{AlertBroker, AlertUpdate, AudioAlarmController, DismissStateStore},
};
use patrolcore::config::{AlarmConfig, DismissScope};
use patrolcore::identity::{Role, UserId, Viewer};

/// Clock starting at a fixed instant that moves one second per reading.
///
/// Keeps alert recency deterministic across rapid successive writes.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self {
            start: Utc
                .with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
                .single()
                .unwrap_or_default(),
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.start + TimeDelta::seconds(self.ticks.fetch_add(1, Ordering::SeqCst))
    }
}

/// Broker type shared by the alert integration tests.
pub type TestBroker = AlertBroker<InMemoryAlertRepository, InMemoryDismissFlagStore, SteppingClock>;

/// Broker wired to in-memory adapters, with handles onto each adapter.
pub struct BrokerHarness {
    pub repository: Arc<InMemoryAlertRepository>,
    pub device: RecordingAudioDevice,
    pub broker: TestBroker,
}

/// Builds a broker over fresh in-memory adapters. Must run inside a Tokio
/// runtime.
pub fn broker_harness(alarm: &AlarmConfig, scope: DismissScope) -> BrokerHarness {
    let repository = Arc::new(InMemoryAlertRepository::new());
    let device = RecordingAudioDevice::new();
    let clock = Arc::new(SteppingClock::default());
    let broker = AlertBroker::new(
        Arc::clone(&repository),
        AudioAlarmController::spawn(device.clone(), alarm.volume),
        DismissStateStore::new(
            Arc::new(InMemoryDismissFlagStore::new()),
            Arc::clone(&clock),
            scope,
        ),
        clock,
        alarm,
    );
    BrokerHarness {
        repository,
        device,
        broker,
    }
}

/// Builds a user identifier.
///
/// # Panics
///
/// Panics when `id` is blank.
pub fn user(id: &str) -> UserId {
    UserId::new(id).expect("valid user id")
}

/// Builds a viewer holding `role`.
pub fn viewer(id: &str, role: Role) -> Viewer {
    Viewer::new(user(id), role)
}

/// Builds an alert request raised by `id` holding `role`.
///
/// # Panics
///
/// Panics when `id` is blank.
pub fn alert_from(id: &str, role: Role) -> NewAlert {
    let raised_by = RaisedBy::new(user(id), format!("User {id}")).expect("valid raiser");
    NewAlert::new(role, raised_by)
}

/// Records every update delivered to one listener.
#[derive(Clone, Default)]
pub struct Updates(Arc<Mutex<Vec<AlertUpdate>>>);

impl Updates {
    /// Returns a listener appending into this recorder.
    pub fn listener(&self) -> impl Fn(AlertUpdate) + Send + Sync + 'static {
        let sink = Arc::clone(&self.0);
        move |update| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(update);
        }
    }

    /// Returns every recorded update in delivery order.
    pub fn all(&self) -> Vec<AlertUpdate> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the alert carried by the most recent update, if any.
    pub fn last_alert(&self) -> Option<Alert> {
        self.all().pop().and_then(Result::ok).flatten()
    }
}

/// Polls `condition` until it holds or roughly a second has passed.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

//! In-memory alert document store with a live change feed.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::warn;

use crate::alert::{
    adapters::document::AlertDocument,
    domain::{Alert, AlertId, tracked_alert},
    ports::{
        AlertChange, AlertChangeFeed, AlertRepository, AlertRepositoryError, AlertRepositoryResult,
    },
};
use crate::config::BrokerConfig;

const DEFAULT_FEED_CAPACITY: usize = 64;

/// Thread-safe in-memory stand-in for the `alerts` collection.
///
/// Documents are held in their JSON wire form, so every read goes through
/// the same decoding as a real document store client.
#[derive(Debug, Clone)]
pub struct InMemoryAlertRepository {
    state: Arc<RwLock<InMemoryAlertState>>,
}

#[derive(Debug)]
struct InMemoryAlertState {
    documents: BTreeMap<AlertId, Value>,
    feed: Option<broadcast::Sender<AlertChange>>,
    offline: bool,
}

impl Default for InMemoryAlertRepository {
    fn default() -> Self {
        Self::with_feed_capacity(DEFAULT_FEED_CAPACITY)
    }
}

impl InMemoryAlertRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository whose feed buffers `capacity` changes per
    /// receiver.
    #[must_use]
    pub fn with_feed_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            state: Arc::new(RwLock::new(InMemoryAlertState {
                documents: BTreeMap::new(),
                feed: Some(sender),
                offline: false,
            })),
        }
    }

    /// Creates an empty repository whose feed is sized by `config`.
    #[must_use]
    pub fn from_config(config: &BrokerConfig) -> Self {
        Self::with_feed_capacity(config.feed_capacity)
    }

    /// Simulates losing (or regaining) the connection to the store. While
    /// offline every read and write fails with a persistence error.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn set_offline(&self, offline: bool) -> AlertRepositoryResult<()> {
        self.write_state()?.offline = offline;
        Ok(())
    }

    /// Writes a raw document, as another client would, and notifies the feed.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the store is offline.
    pub fn put_raw(&self, id: AlertId, document: Value) -> AlertRepositoryResult<()> {
        let mut state = self.online_state()?;
        let change = if state.documents.insert(id, document).is_some() {
            AlertChange::Updated(id)
        } else {
            AlertChange::Created(id)
        };
        publish(&state, change);
        Ok(())
    }

    /// Returns the raw stored document.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn raw(&self, id: AlertId) -> AlertRepositoryResult<Option<Value>> {
        Ok(self.read_state()?.documents.get(&id).cloned())
    }

    /// Publishes a transport failure on the feed.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn interrupt(&self, reason: impl Into<String>) -> AlertRepositoryResult<()> {
        let state = self.read_state()?;
        publish(&state, AlertChange::Interrupted(reason.into()));
        Ok(())
    }

    /// Closes the change feed for every receiver.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn close_feed(&self) -> AlertRepositoryResult<()> {
        self.write_state()?.feed = None;
        Ok(())
    }

    fn read_state(
        &self,
    ) -> AlertRepositoryResult<std::sync::RwLockReadGuard<'_, InMemoryAlertState>> {
        self.state.read().map_err(|err| {
            AlertRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(
        &self,
    ) -> AlertRepositoryResult<std::sync::RwLockWriteGuard<'_, InMemoryAlertState>> {
        self.state.write().map_err(|err| {
            AlertRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn online_state(
        &self,
    ) -> AlertRepositoryResult<std::sync::RwLockWriteGuard<'_, InMemoryAlertState>> {
        let state = self.write_state()?;
        if state.offline {
            return Err(unreachable_store());
        }
        Ok(state)
    }

    /// Decodes every stored document. Documents that do not decode are
    /// logged and left out, so one bad record cannot hide the others.
    fn decode_all(&self) -> AlertRepositoryResult<Vec<Alert>> {
        let state = self.read_state()?;
        if state.offline {
            return Err(unreachable_store());
        }
        Ok(state
            .documents
            .iter()
            .filter_map(|(id, document)| {
                decode(*id, document)
                    .map_err(|err| {
                        warn!(alert_id = %id, error = %err, "skipping undecodable alert document");
                    })
                    .ok()
            })
            .collect())
    }
}

fn unreachable_store() -> AlertRepositoryError {
    AlertRepositoryError::persistence(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "alert store unreachable",
    ))
}

fn encode(alert: &Alert) -> AlertRepositoryResult<Value> {
    serde_json::to_value(AlertDocument::from_alert(alert))
        .map_err(AlertRepositoryError::persistence)
}

fn decode(id: AlertId, document: &Value) -> AlertRepositoryResult<Alert> {
    let parsed: AlertDocument =
        serde_json::from_value(document.clone()).map_err(AlertRepositoryError::persistence)?;
    parsed
        .into_alert(id)
        .map_err(AlertRepositoryError::persistence)
}

fn publish(state: &InMemoryAlertState, change: AlertChange) {
    if let Some(feed) = &state.feed {
        // Sending only fails when nobody is listening.
        feed.send(change).ok();
    }
}

#[async_trait]
impl AlertRepository for InMemoryAlertRepository {
    async fn store(&self, alert: &Alert) -> AlertRepositoryResult<()> {
        let document = encode(alert)?;
        let mut state = self.online_state()?;
        if state.documents.contains_key(&alert.id()) {
            return Err(AlertRepositoryError::DuplicateAlert(alert.id()));
        }
        state.documents.insert(alert.id(), document);
        publish(&state, AlertChange::Created(alert.id()));
        Ok(())
    }

    async fn update(&self, alert: &Alert) -> AlertRepositoryResult<()> {
        let document = encode(alert)?;
        let mut state = self.online_state()?;
        let slot = state
            .documents
            .get_mut(&alert.id())
            .ok_or(AlertRepositoryError::NotFound(alert.id()))?;
        *slot = document;
        publish(&state, AlertChange::Updated(alert.id()));
        Ok(())
    }

    async fn find_by_id(&self, id: AlertId) -> AlertRepositoryResult<Option<Alert>> {
        let state = self.read_state()?;
        if state.offline {
            return Err(unreachable_store());
        }
        state
            .documents
            .get(&id)
            .map(|document| decode(id, document))
            .transpose()
    }

    async fn latest_active(&self) -> AlertRepositoryResult<Option<Alert>> {
        let alerts = self.decode_all()?;
        Ok(tracked_alert(&alerts).cloned())
    }

    async fn list(&self) -> AlertRepositoryResult<Vec<Alert>> {
        let mut alerts = self.decode_all()?;
        alerts.sort_by(|left, right| right.recency_cmp(left));
        Ok(alerts)
    }

    fn changes(&self) -> AlertChangeFeed {
        let sender = self
            .state
            .read()
            .ok()
            .and_then(|state| state.feed.clone());
        // A closed store hands out receivers whose sender is already gone.
        sender.map_or_else(|| broadcast::channel(1).1, |sender| sender.subscribe())
    }
}

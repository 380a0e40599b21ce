//! Listener registry shared by the alert broker and task subscriptions.
//!
//! Listeners are plain callbacks. Fan-out clones the registered callbacks
//! out of the registry first, so a callback may unsubscribe itself (or
//! others) without deadlocking.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// Callback invoked with every value pushed to a subscription.
pub type Listener<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Identifier of one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

struct Entry<K, T> {
    key: K,
    listener: Listener<T>,
}

type Entries<K, T> = RwLock<BTreeMap<SubscriptionId, Entry<K, T>>>;

/// Registry of listeners, each tagged with a filter key.
pub struct ListenerRegistry<K, T> {
    entries: Arc<Entries<K, T>>,
    next_id: AtomicU64,
}

impl<K, T> Default for ListenerRegistry<K, T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<K, T> ListenerRegistry<K, T>
where
    K: Clone + Send + Sync + 'static,
    T: 'static,
{
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener and returns its detach handle.
    pub fn register(&self, key: K, listener: Listener<T>) -> Subscription {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Entry { key, listener });

        let registry: Weak<Entries<K, T>> = Arc::downgrade(&self.entries);
        Subscription {
            id,
            detached: AtomicBool::new(false),
            detach: Box::new(move |detached_id| {
                if let Some(entries) = registry.upgrade() {
                    entries
                        .write()
                        .unwrap_or_else(PoisonError::into_inner)
                        .remove(&detached_id);
                }
            }),
        }
    }

    /// Returns `true` while the listener is attached.
    #[must_use]
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    /// Returns the number of attached listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when no listener is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the filter keys of all attached listeners.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Returns the listener registered under `id`, if still attached.
    #[must_use]
    pub fn get(&self, id: SubscriptionId) -> Option<(K, Listener<T>)> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .map(|entry| (entry.key.clone(), Arc::clone(&entry.listener)))
    }

    /// Clones every attached listener out of the registry, in registration
    /// order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(SubscriptionId, K, Listener<T>)> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, entry)| (*id, entry.key.clone(), Arc::clone(&entry.listener)))
            .collect()
    }
}

/// Handle returned by `subscribe`; detaches its listener when unsubscribed
/// or dropped.
pub struct Subscription {
    id: SubscriptionId,
    detached: AtomicBool,
    detach: Box<dyn Fn(SubscriptionId) + Send + Sync>,
}

impl Subscription {
    /// Returns the listener identifier.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns `true` once the listener has been detached through this
    /// handle.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    /// Detaches the listener. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if !self.detached.swap(true, Ordering::AcqRel) {
            (self.detach)(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("detached", &self.is_detached())
            .finish_non_exhaustive()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

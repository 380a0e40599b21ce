//! In-memory dismiss flag.

use crate::alert::ports::{DismissFlagError, DismissFlagResult, DismissFlagStore, DismissRecord};
use std::sync::{Arc, RwLock};

/// Dismiss flag kept in process memory; lost on restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDismissFlagStore {
    record: Arc<RwLock<Option<DismissRecord>>>,
}

impl InMemoryDismissFlagStore {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> DismissFlagError {
    DismissFlagError::storage(std::io::Error::other(err.to_string()))
}

impl DismissFlagStore for InMemoryDismissFlagStore {
    fn load(&self) -> DismissFlagResult<Option<DismissRecord>> {
        Ok(*self.record.read().map_err(lock_error)?)
    }

    fn save(&self, record: DismissRecord) -> DismissFlagResult<()> {
        *self.record.write().map_err(lock_error)? = Some(record);
        Ok(())
    }

    fn clear(&self) -> DismissFlagResult<()> {
        *self.record.write().map_err(lock_error)? = None;
        Ok(())
    }
}

//! In-memory task document store.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::identity::UserId;
use crate::task::{
    adapters::document::TaskDocument,
    domain::{Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory stand-in for the `tasks` collection.
///
/// Tasks are held as JSON documents and decoded on every read.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    documents: HashMap<TaskId, Value>,
    offline: bool,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing (or regaining) the connection to the store.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn set_offline(&self, offline: bool) -> TaskRepositoryResult<()> {
        self.write_state()?.offline = offline;
        Ok(())
    }

    /// Returns the raw stored document.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn raw(&self, id: TaskId) -> TaskRepositoryResult<Option<Value>> {
        Ok(self.read_state()?.documents.get(&id).cloned())
    }

    fn read_state(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        let state = self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.offline {
            return Err(unreachable_store());
        }
        Ok(state)
    }

    fn write_state(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn online_state(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        let state = self.write_state()?;
        if state.offline {
            return Err(unreachable_store());
        }
        Ok(state)
    }
}

fn unreachable_store() -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "task store unreachable",
    ))
}

fn encode(task: &Task) -> TaskRepositoryResult<Value> {
    serde_json::to_value(TaskDocument::from_task(task)).map_err(TaskRepositoryError::persistence)
}

fn decode(id: TaskId, document: &Value) -> TaskRepositoryResult<Task> {
    let parsed: TaskDocument =
        serde_json::from_value(document.clone()).map_err(TaskRepositoryError::persistence)?;
    parsed
        .into_task(id)
        .map_err(TaskRepositoryError::persistence)
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let document = encode(task)?;
        let mut state = self.online_state()?;
        if state.documents.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.documents.insert(task.id(), document);
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let document = encode(task)?;
        let mut state = self.online_state()?;
        let slot = state
            .documents
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        *slot = document;
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.read_state()?
            .documents
            .get(&id)
            .map(|document| decode(id, document))
            .transpose()
    }

    async fn list_for_agent(&self, agent: &UserId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read_state()?;
        let mut tasks = state
            .documents
            .iter()
            .map(|(id, document)| decode(*id, document))
            .filter(|decoded| {
                decoded
                    .as_ref()
                    .map_or(true, |task| task.assigned_to() == agent)
            })
            .collect::<TaskRepositoryResult<Vec<_>>>()?;
        tasks.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| right.id().cmp(&left.id()))
        });
        Ok(tasks)
    }
}

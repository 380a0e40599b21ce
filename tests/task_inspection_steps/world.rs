//! Shared world state for inspection task BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use patrolcore::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::Task,
    services::{TaskLifecycleError, TaskLifecycleManager},
};
use rstest::fixture;

/// Manager type used by the BDD world.
pub type TestTaskManager = TaskLifecycleManager<InMemoryTaskRepository, DefaultClock>;

/// Scenario world for inspection task behaviour tests.
pub struct TaskInspectionWorld {
    pub manager: TestTaskManager,
    pub task: Option<Task>,
    pub last_result: Option<Result<Task, TaskLifecycleError>>,
}

impl TaskInspectionWorld {
    /// Creates a world with no task.
    #[must_use]
    pub fn new() -> Self {
        Self {
            manager: TaskLifecycleManager::new(
                Arc::new(InMemoryTaskRepository::new()),
                Arc::new(DefaultClock),
            ),
            task: None,
            last_result: None,
        }
    }

    /// Returns the scenario task.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Records an action result, keeping the latest persisted task.
    pub fn record(&mut self, result: Result<Task, TaskLifecycleError>) {
        if let Ok(ref updated) = result {
            self.task = Some(updated.clone());
        }
        self.last_result = Some(result);
    }
}

impl Default for TaskInspectionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskInspectionWorld {
    TaskInspectionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

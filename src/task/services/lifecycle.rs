//! Service layer for inspection task lifecycle and task subscriptions.

use crate::identity::UserId;
use crate::subscription::{Listener, ListenerRegistry, Subscription};
use crate::task::{
    domain::{NewTask, Task, TaskDomainError, TaskId, TaskObject, TaskObjectId},
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    assigned_to: String,
    assigned_to_name: Option<String>,
    objects: Vec<ObjectRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ObjectRequest {
    id: String,
    name: String,
    address: String,
}

impl CreateTaskRequest {
    /// Creates a request for a task assigned to the agent `assigned_to`.
    #[must_use]
    pub fn new(title: impl Into<String>, assigned_to: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            assigned_to: assigned_to.into(),
            assigned_to_name: None,
            objects: Vec::new(),
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the assignee's display name.
    #[must_use]
    pub fn with_assignee_name(mut self, name: impl Into<String>) -> Self {
        self.assigned_to_name = Some(name.into());
        self
    }

    /// Appends an object to inspect.
    #[must_use]
    pub fn with_object(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        self.objects.push(ObjectRequest {
            id: id.into(),
            name: name.into(),
            address: address.into(),
        });
        self
    }

    fn into_new_task(self) -> Result<NewTask, TaskDomainError> {
        let objects = self
            .objects
            .into_iter()
            .map(|object| {
                TaskObject::new(TaskObjectId::new(object.id)?, object.name, object.address)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut task = NewTask::new(self.title, UserId::new(self.assigned_to)?, objects)?;
        if let Some(description) = self.description {
            task = task.with_description(description);
        }
        if let Some(name) = self.assigned_to_name {
            task = task.with_assignee_name(name);
        }
        Ok(task)
    }
}

/// Which task changes a subscriber receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFilter {
    /// Every task.
    All,
    /// One task.
    Task(TaskId),
    /// Tasks assigned to one agent.
    Agent(UserId),
}

impl TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Task(id) => task.id() == *id,
            Self::Agent(agent) => task.assigned_to() == agent,
        }
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation or a state machine edge was rejected.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
}

impl TaskLifecycleError {
    /// Returns `true` for rejected task or object state machine edges.
    #[must_use]
    pub const fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::Domain(err) if err.is_invalid_transition())
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Every mutation loads the task, applies one domain transition, persists
/// the result, then pushes the persisted task to matching subscribers.
#[derive(Clone)]
pub struct TaskLifecycleManager<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    listeners: Arc<ListenerRegistry<TaskFilter, Task>>,
}

impl<R, C> TaskLifecycleManager<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            listeners: Arc::new(ListenerRegistry::new()),
        }
    }

    /// Creates a pending task for an agent.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when the request is invalid or
    /// [`TaskLifecycleError::Repository`] when the store rejects the write.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let task = Task::create(request.into_new_task()?, &*self.clock);
        self.repository.store(&task).await?;
        info!(
            task_id = %task.id(),
            assigned_to = %task.assigned_to(),
            objects = task.objects().len(),
            "task created"
        );
        self.publish(&task);
        Ok(task)
    }

    /// Agent accepts a pending task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks and
    /// [`TaskLifecycleError::Domain`] unless the task is pending.
    pub async fn accept(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.apply(task_id, "accept", |task, clock| task.accept(clock))
            .await
    }

    /// Marks an object as checked, recording optional comments.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when the task is not in
    /// progress, the object is unknown, or it was already resolved.
    pub async fn check_object(
        &self,
        task_id: TaskId,
        object_id: &TaskObjectId,
        comments: Option<String>,
    ) -> TaskLifecycleResult<Task> {
        self.apply(task_id, "check_object", |task, clock| {
            task.check_object(object_id, comments, clock)
        })
        .await
    }

    /// Marks an object as skipped, recording optional comments.
    ///
    /// # Errors
    ///
    /// Same as [`Self::check_object`].
    pub async fn skip_object(
        &self,
        task_id: TaskId,
        object_id: &TaskObjectId,
        comments: Option<String>,
    ) -> TaskLifecycleResult<Task> {
        self.apply(task_id, "skip_object", |task, clock| {
            task.skip_object(object_id, comments, clock)
        })
        .await
    }

    /// Completes an in-progress task whose objects are all checked.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when the task is not in
    /// progress or an object is still unchecked.
    pub async fn complete(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.apply(task_id, "complete", |task, clock| task.complete(clock))
            .await
    }

    /// Cancels a pending or in-progress task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] once the task is terminal.
    pub async fn cancel(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.apply(task_id, "cancel", |task, clock| task.cancel(clock))
            .await
    }

    /// Retrieves a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn find(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(task_id).await?)
    }

    /// Lists the tasks assigned to an agent, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the query fails.
    pub async fn list_for_agent(&self, agent: &UserId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.list_for_agent(agent).await?)
    }

    /// Attaches a listener receiving every persisted task matching `filter`.
    ///
    /// A single-task subscription first receives the task's current state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the initial fetch
    /// fails; nothing stays attached in that case.
    pub async fn subscribe<L>(
        &self,
        filter: TaskFilter,
        on_change: L,
    ) -> TaskLifecycleResult<Subscription>
    where
        L: Fn(Task) + Send + Sync + 'static,
    {
        let listener: Listener<Task> = Arc::new(on_change);
        let initial = match &filter {
            TaskFilter::Task(id) => self.repository.find_by_id(*id).await?,
            TaskFilter::All | TaskFilter::Agent(_) => None,
        };
        let subscription = self.listeners.register(filter, Arc::clone(&listener));
        debug!(subscription_id = %subscription.id(), "task subscription opened");
        if let Some(task) = initial {
            listener(task);
        }
        Ok(subscription)
    }

    /// Returns the number of attached task listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    async fn apply<F>(
        &self,
        task_id: TaskId,
        action: &'static str,
        transition: F,
    ) -> TaskLifecycleResult<Task>
    where
        F: FnOnce(&mut Task, &C) -> Result<(), TaskDomainError> + Send,
    {
        let mut task = self
            .repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))?;
        let from = task.status();
        transition(&mut task, &*self.clock)?;
        self.repository.update(&task).await?;
        info!(
            task_id = %task_id,
            action,
            from = %from,
            to = %task.status(),
            "task updated"
        );
        self.publish(&task);
        Ok(task)
    }

    fn publish(&self, task: &Task) {
        for (id, filter, listener) in self.listeners.snapshot() {
            if filter.matches(task) {
                debug!(subscription_id = %id, task_id = %task.id(), "delivering task update");
                listener(task.clone());
            }
        }
    }
}

//! Task aggregate root.

use super::{ObjectStatus, TaskDomainError, TaskId, TaskObject, TaskObjectId, TaskStatus};
use crate::identity::UserId;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::collections::BTreeSet;

/// Validated input for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    description: String,
    assigned_to: UserId,
    assigned_to_name: Option<String>,
    objects: Vec<TaskObject>,
}

impl NewTask {
    /// Creates task input for the given agent.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] for a blank title,
    /// [`TaskDomainError::EmptyObjects`] when no object is listed, and
    /// [`TaskDomainError::DuplicateObject`] when an object repeats.
    pub fn new(
        title: impl Into<String>,
        assigned_to: UserId,
        objects: Vec<TaskObject>,
    ) -> Result<Self, TaskDomainError> {
        let trimmed_title = title.into().trim().to_owned();
        if trimmed_title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        if objects.is_empty() {
            return Err(TaskDomainError::EmptyObjects);
        }
        let mut seen = BTreeSet::new();
        for object in &objects {
            if !seen.insert(object.id()) {
                return Err(TaskDomainError::DuplicateObject(object.id().clone()));
            }
        }
        Ok(Self {
            title: trimmed_title,
            description: String::new(),
            assigned_to,
            assigned_to_name: None,
            objects,
        })
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Caches the assignee's display name on the task.
    #[must_use]
    pub fn with_assignee_name(mut self, name: impl Into<String>) -> Self {
        self.assigned_to_name = Some(name.into());
        self
    }
}

/// Inspection task assigned to one field agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    status: TaskStatus,
    assigned_to: UserId,
    assigned_to_name: Option<String>,
    created_at: DateTime<Utc>,
    assigned_at: Option<DateTime<Utc>>,
    accepted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    objects: Vec<TaskObject>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Assigned agent.
    pub assigned_to: UserId,
    /// Cached assignee display name.
    pub assigned_to_name: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Assignment timestamp.
    pub assigned_at: Option<DateTime<Utc>>,
    /// Acceptance timestamp.
    pub accepted_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Cancellation timestamp.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Objects in inspection order.
    pub objects: Vec<TaskObject>,
}

impl Task {
    /// Creates a pending task, stamping creation and assignment with the
    /// clock's current time.
    #[must_use]
    pub fn create(request: NewTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title: request.title,
            description: request.description,
            status: TaskStatus::Pending,
            assigned_to: request.assigned_to,
            assigned_to_name: request.assigned_to_name,
            created_at: timestamp,
            assigned_at: Some(timestamp),
            accepted_at: None,
            completed_at: None,
            cancelled_at: None,
            objects: request.objects,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            assigned_to: data.assigned_to,
            assigned_to_name: data.assigned_to_name,
            created_at: data.created_at,
            assigned_at: data.assigned_at,
            accepted_at: data.accepted_at,
            completed_at: data.completed_at,
            cancelled_at: data.cancelled_at,
            objects: data.objects,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the assigned agent.
    #[must_use]
    pub const fn assigned_to(&self) -> &UserId {
        &self.assigned_to
    }

    /// Returns the cached assignee display name, if any.
    #[must_use]
    pub fn assigned_to_name(&self) -> Option<&str> {
        self.assigned_to_name.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the assignment timestamp.
    #[must_use]
    pub const fn assigned_at(&self) -> Option<DateTime<Utc>> {
        self.assigned_at
    }

    /// Returns the acceptance timestamp.
    #[must_use]
    pub const fn accepted_at(&self) -> Option<DateTime<Utc>> {
        self.accepted_at
    }

    /// Returns the completion timestamp.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the cancellation timestamp.
    #[must_use]
    pub const fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    /// Returns the objects in inspection order.
    #[must_use]
    pub fn objects(&self) -> &[TaskObject] {
        &self.objects
    }

    /// Returns the object with the given identifier.
    #[must_use]
    pub fn object(&self, object_id: &TaskObjectId) -> Option<&TaskObject> {
        self.objects.iter().find(|object| object.id() == object_id)
    }

    /// Returns how many objects are checked.
    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.objects.iter().filter(|object| object.is_checked()).count()
    }

    /// Agent accepts the task: `pending → in_progress`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] unless the task is
    /// pending.
    pub fn accept(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.transition(TaskStatus::InProgress)?;
        self.accepted_at = Some(self.stamp(clock));
        Ok(())
    }

    /// Marks an object as checked with optional comments.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotInProgress`] unless the task is in
    /// progress, [`TaskDomainError::ObjectNotFound`] for an unknown object,
    /// and [`TaskDomainError::InvalidObjectTransition`] when the object was
    /// already checked or skipped.
    pub fn check_object(
        &mut self,
        object_id: &TaskObjectId,
        comments: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.resolve_object(object_id, ObjectStatus::Checked, comments, clock)
    }

    /// Marks an object as skipped with optional comments.
    ///
    /// # Errors
    ///
    /// Same as [`Self::check_object`].
    pub fn skip_object(
        &mut self,
        object_id: &TaskObjectId,
        comments: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.resolve_object(object_id, ObjectStatus::Skipped, comments, clock)
    }

    /// Completes the task: `in_progress → completed`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] unless the task is in
    /// progress and [`TaskDomainError::IncompleteInspection`] while any
    /// object is unchecked.
    pub fn complete(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(TaskStatus::Completed) {
            return Err(self.invalid_transition(TaskStatus::Completed));
        }
        let unchecked = self.objects.len() - self.checked_count();
        if unchecked > 0 {
            return Err(TaskDomainError::IncompleteInspection {
                task_id: self.id,
                unchecked,
            });
        }
        self.transition(TaskStatus::Completed)?;
        self.completed_at = Some(self.stamp(clock));
        Ok(())
    }

    /// Cancels the task from `pending` or `in_progress`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] once the task is
    /// terminal.
    pub fn cancel(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.transition(TaskStatus::Cancelled)?;
        self.cancelled_at = Some(self.stamp(clock));
        Ok(())
    }

    fn resolve_object(
        &mut self,
        object_id: &TaskObjectId,
        target: ObjectStatus,
        comments: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.status != TaskStatus::InProgress {
            return Err(TaskDomainError::NotInProgress {
                task_id: self.id,
                status: self.status,
            });
        }
        let at = self.stamp(clock);
        let task_id = self.id;
        let object = self
            .objects
            .iter_mut()
            .find(|object| object.id() == object_id)
            .ok_or_else(|| TaskDomainError::ObjectNotFound {
                task_id,
                object_id: object_id.clone(),
            })?;
        object
            .resolve(target, at, comments)
            .map_err(|(from, to)| TaskDomainError::InvalidObjectTransition {
                task_id,
                object_id: object_id.clone(),
                from,
                to,
            })
    }

    fn transition(&mut self, target: TaskStatus) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(self.invalid_transition(target));
        }
        self.status = target;
        Ok(())
    }

    const fn invalid_transition(&self, target: TaskStatus) -> TaskDomainError {
        TaskDomainError::InvalidTransition {
            task_id: self.id,
            from: self.status,
            to: target,
        }
    }

    /// Current time, strictly later than every timestamp already recorded.
    ///
    /// A clock that has not moved past the latest stamp yields that stamp
    /// plus one millisecond.
    fn stamp(&self, clock: &impl Clock) -> DateTime<Utc> {
        let now = clock.utc();
        let latest = [self.assigned_at, self.accepted_at]
            .into_iter()
            .flatten()
            .chain(self.objects.iter().filter_map(TaskObject::checked_at))
            .fold(self.created_at, Ord::max);
        if now > latest {
            return now;
        }
        latest
            .checked_add_signed(TimeDelta::milliseconds(1))
            .unwrap_or(latest)
    }
}

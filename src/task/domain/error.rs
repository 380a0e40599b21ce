//! Error types for task domain validation, transitions, and parsing.

use super::{ObjectStatus, TaskId, TaskObjectId, TaskStatus};
use crate::identity::IdentityError;
use thiserror::Error;

/// Errors returned while constructing or transitioning tasks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// An identity value was rejected.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// A task must carry at least one object to inspect.
    #[error("task must contain at least one object")]
    EmptyObjects,

    /// An object identifier is empty after trimming.
    #[error("task object identifier must not be empty")]
    EmptyObjectId,

    /// An object name is empty after trimming.
    #[error("task object {0} must have a name")]
    EmptyObjectName(TaskObjectId),

    /// The same object appears twice in one task.
    #[error("task object {0} is listed more than once")]
    DuplicateObject(TaskObjectId),

    /// The task state machine does not allow the requested edge.
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// The object state machine does not allow the requested edge.
    #[error("object {object_id} of task {task_id} cannot move from {from} to {to}")]
    InvalidObjectTransition {
        /// Task owning the object.
        task_id: TaskId,
        /// Object being transitioned.
        object_id: TaskObjectId,
        /// Current object status.
        from: ObjectStatus,
        /// Requested object status.
        to: ObjectStatus,
    },

    /// Objects can only be checked or skipped while the task is in progress.
    #[error("task {task_id} is {status}, objects can only change while in progress")]
    NotInProgress {
        /// Task owning the object.
        task_id: TaskId,
        /// Current status.
        status: TaskStatus,
    },

    /// The object is not part of the task.
    #[error("object {object_id} not found in task {task_id}")]
    ObjectNotFound {
        /// Task that was searched.
        task_id: TaskId,
        /// Missing object.
        object_id: TaskObjectId,
    },

    /// Completion requires every object to be checked.
    #[error("task {task_id} still has {unchecked} unchecked object(s)")]
    IncompleteInspection {
        /// Task that cannot complete.
        task_id: TaskId,
        /// Objects not yet checked.
        unchecked: usize,
    },
}

impl TaskDomainError {
    /// Returns `true` when the task or object state does not permit the
    /// requested operation.
    ///
    /// Covers rejected edges as well as the narrower precondition failures:
    /// changing objects outside `in_progress` and completing with unchecked
    /// objects.
    #[must_use]
    pub const fn is_invalid_transition(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. }
                | Self::InvalidObjectTransition { .. }
                | Self::NotInProgress { .. }
                | Self::IncompleteInspection { .. }
        )
    }
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing object statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task object status: {0}")]
pub struct ParseObjectStatusError(pub String);

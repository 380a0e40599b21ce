//! Wire format of `tasks/{id}` documents.

use crate::identity::{IdentityError, UserId};
use crate::task::domain::{
    ObjectStatus, ParseObjectStatusError, ParseTaskStatusError, PersistedTaskData,
    PersistedTaskObjectData, Task, TaskDomainError, TaskId, TaskObject, TaskObjectId, TaskStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decoding a task document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDocumentError {
    /// The assignee identifier is invalid.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// An object identifier is invalid.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The task status string is unknown.
    #[error(transparent)]
    Status(#[from] ParseTaskStatusError),
    /// An object status string is unknown.
    #[error(transparent)]
    ObjectStatus(#[from] ParseObjectStatusError),
}

/// Stored task document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDocument {
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// `pending`, `in_progress`, `completed`, or `cancelled`.
    pub status: String,
    /// Assigned agent identifier.
    pub assigned_to: String,
    /// Cached assignee display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_name: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Assignment timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    /// Acceptance timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Cancellation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Object identifiers, denormalised for list queries. Ignored on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_ids: Option<Vec<String>>,
    /// Objects in inspection order.
    pub objects: Vec<TaskObjectDocument>,
}

/// Stored task object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskObjectDocument {
    /// Object identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// `pending`, `checked`, or `skipped`.
    pub status: String,
    /// Check timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
    /// Agent comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl TaskDocument {
    /// Encodes a task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title().to_owned(),
            description: task.description().to_owned(),
            status: task.status().as_str().to_owned(),
            assigned_to: task.assigned_to().as_str().to_owned(),
            assigned_to_name: task.assigned_to_name().map(str::to_owned),
            created_at: task.created_at(),
            assigned_at: task.assigned_at(),
            accepted_at: task.accepted_at(),
            completed_at: task.completed_at(),
            cancelled_at: task.cancelled_at(),
            object_ids: Some(
                task.objects()
                    .iter()
                    .map(|object| object.id().as_str().to_owned())
                    .collect(),
            ),
            objects: task
                .objects()
                .iter()
                .map(TaskObjectDocument::from_object)
                .collect(),
        }
    }

    /// Decodes the document stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDocumentError`] for unknown statuses or blank
    /// identifiers.
    pub fn into_task(self, id: TaskId) -> Result<Task, TaskDocumentError> {
        let objects = self
            .objects
            .into_iter()
            .map(TaskObjectDocument::into_object)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Task::from_persisted(PersistedTaskData {
            id,
            title: self.title,
            description: self.description,
            status: TaskStatus::try_from(self.status.as_str())?,
            assigned_to: UserId::new(self.assigned_to)?,
            assigned_to_name: self.assigned_to_name,
            created_at: self.created_at,
            assigned_at: self.assigned_at,
            accepted_at: self.accepted_at,
            completed_at: self.completed_at,
            cancelled_at: self.cancelled_at,
            objects,
        }))
    }
}

impl TaskObjectDocument {
    /// Encodes a task object.
    #[must_use]
    pub fn from_object(object: &TaskObject) -> Self {
        Self {
            id: object.id().as_str().to_owned(),
            name: object.name().to_owned(),
            address: object.address().to_owned(),
            status: object.status().as_str().to_owned(),
            checked_at: object.checked_at(),
            comments: object.comments().map(str::to_owned),
        }
    }

    fn into_object(self) -> Result<TaskObject, TaskDocumentError> {
        Ok(TaskObject::from_persisted(PersistedTaskObjectData {
            id: TaskObjectId::new(self.id)?,
            name: self.name,
            address: self.address,
            status: ObjectStatus::try_from(self.status.as_str())?,
            checked_at: self.checked_at,
            comments: self.comments,
        }))
    }
}

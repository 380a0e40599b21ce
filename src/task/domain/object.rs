//! Patrol objects listed on a task.

use super::{ObjectStatus, TaskDomainError, TaskObjectId};
use chrono::{DateTime, Utc};

/// One site the agent must inspect as part of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskObject {
    id: TaskObjectId,
    name: String,
    address: String,
    status: ObjectStatus,
    checked_at: Option<DateTime<Utc>>,
    comments: Option<String>,
}

/// Parameter object for reconstructing a persisted task object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskObjectData {
    /// Object identifier.
    pub id: TaskObjectId,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Inspection status.
    pub status: ObjectStatus,
    /// When the object was checked, if it was.
    pub checked_at: Option<DateTime<Utc>>,
    /// Agent comments, if any.
    pub comments: Option<String>,
}

impl TaskObject {
    /// Creates a pending object.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyObjectName`] when the name is blank.
    pub fn new(
        id: TaskObjectId,
        name: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self, TaskDomainError> {
        let display_name = name.into().trim().to_owned();
        if display_name.is_empty() {
            return Err(TaskDomainError::EmptyObjectName(id));
        }
        Ok(Self {
            id,
            name: display_name,
            address: address.into().trim().to_owned(),
            status: ObjectStatus::Pending,
            checked_at: None,
            comments: None,
        })
    }

    /// Reconstructs an object from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskObjectData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            address: data.address,
            status: data.status,
            checked_at: data.checked_at,
            comments: data.comments,
        }
    }

    /// Returns the object identifier.
    #[must_use]
    pub const fn id(&self) -> &TaskObjectId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the street address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the inspection status.
    #[must_use]
    pub const fn status(&self) -> ObjectStatus {
        self.status
    }

    /// Returns when the object was checked, if it was.
    #[must_use]
    pub const fn checked_at(&self) -> Option<DateTime<Utc>> {
        self.checked_at
    }

    /// Returns the agent's comments, if any.
    #[must_use]
    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    /// Returns `true` once the object has been checked.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.status == ObjectStatus::Checked
    }

    /// Moves the object to `target`. Returns the rejected edge on failure so
    /// the task can report it with its own identifier.
    pub(super) fn resolve(
        &mut self,
        target: ObjectStatus,
        at: DateTime<Utc>,
        comments: Option<String>,
    ) -> Result<(), (ObjectStatus, ObjectStatus)> {
        if !self.status.can_transition_to(target) {
            return Err((self.status, target));
        }
        self.status = target;
        if target == ObjectStatus::Checked {
            self.checked_at = Some(at);
        }
        if let Some(text) = comments.filter(|text| !text.trim().is_empty()) {
            self.comments = Some(text);
        }
        Ok(())
    }
}

//! Roles, user identifiers, and the viewer identity shared by the alert and
//! task contexts.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors returned while constructing identity values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The user identifier is empty after trimming.
    #[error("user identifier must not be empty")]
    EmptyUserId,

    /// The role name is not one of the known roles.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Role held by a user of the field-operations system.
///
/// Roles serialise with the names used by the document store: operators
/// are `admin`, field agents are `inspector`, and supervisors are
/// `curator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Control-room operator dispatching tasks and raising alerts.
    #[serde(rename = "admin")]
    Operator,
    /// Field agent performing patrol inspections.
    #[serde(rename = "inspector")]
    Agent,
    /// Supervisor overseeing a group of agents.
    #[serde(rename = "curator")]
    Supervisor,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Self; 3] = [Self::Operator, Self::Agent, Self::Supervisor];

    /// Returns the document-store representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Operator => "admin",
            Self::Agent => "inspector",
            Self::Supervisor => "curator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = IdentityError;

    /// Parses either the stored name or the descriptive role name.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "admin" | "operator" => Ok(Self::Operator),
            "inspector" | "agent" => Ok(Self::Agent),
            "curator" | "supervisor" => Ok(Self::Supervisor),
            _ => Err(IdentityError::UnknownRole(value.to_owned())),
        }
    }
}

/// Opaque identifier of a user account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmptyUserId`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::EmptyUserId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of whoever is looking at a live stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Viewer {
    user_id: UserId,
    role: Role,
}

impl Viewer {
    /// Creates a viewer identity.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Returns the viewer's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the viewer's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

//! Audience targeting for alerts.

use crate::identity::{Role, UserId, Viewer};
use std::collections::BTreeSet;

/// Who an alert is shown to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Audience {
    /// Every viewer sees the alert.
    #[default]
    Everyone,
    /// Only viewers holding one of the roles see the alert.
    Roles(BTreeSet<Role>),
    /// Only the listed users see the alert.
    Users(BTreeSet<UserId>),
}

impl Audience {
    /// Targets the given roles.
    #[must_use]
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self::Roles(roles.into_iter().collect())
    }

    /// Targets the given users.
    #[must_use]
    pub fn users(users: impl IntoIterator<Item = UserId>) -> Self {
        Self::Users(users.into_iter().collect())
    }

    /// Builds an audience from the optional stored sets.
    ///
    /// The role set wins when both are present; an empty set still counts as
    /// present and therefore matches nobody.
    #[must_use]
    pub fn from_parts(roles: Option<Vec<Role>>, users: Option<Vec<UserId>>) -> Self {
        match (roles, users) {
            (Some(role_set), _) => Self::roles(role_set),
            (None, Some(user_set)) => Self::users(user_set),
            (None, None) => Self::Everyone,
        }
    }

    /// Returns `true` when the viewer is part of this audience.
    #[must_use]
    pub fn includes(&self, viewer: &Viewer) -> bool {
        match self {
            Self::Everyone => true,
            Self::Roles(roles) => roles.contains(&viewer.role()),
            Self::Users(users) => users.contains(viewer.user_id()),
        }
    }

    /// Returns the targeted role set, if any.
    #[must_use]
    pub const fn role_set(&self) -> Option<&BTreeSet<Role>> {
        match self {
            Self::Roles(roles) => Some(roles),
            _ => None,
        }
    }

    /// Returns the targeted user set, if any.
    #[must_use]
    pub const fn user_set(&self) -> Option<&BTreeSet<UserId>> {
        match self {
            Self::Users(users) => Some(users),
            _ => None,
        }
    }
}

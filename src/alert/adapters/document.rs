//! Wire format of `alerts/{id}` documents.
//!
//! Field names follow the document store contract. Enumerations are kept as
//! strings here and parsed when the document is turned into an [`Alert`], so
//! an unknown value surfaces as a typed error instead of a serde failure.

use crate::alert::domain::{
    Alert, AlertDomainError, AlertId, AlertStatus, Audience, Coordinates, ObjectRef,
    ParseAlertStatusError, PersistedAlertData, RaisedBy,
};
use crate::identity::{IdentityError, Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decoding an alert document.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AlertDocumentError {
    /// A role or user identifier is invalid.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// A domain value is invalid.
    #[error(transparent)]
    Domain(#[from] AlertDomainError),
    /// The status string is unknown.
    #[error(transparent)]
    Status(#[from] ParseAlertStatusError),
}

/// Stored alert document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDocument {
    /// Role of the raising user (`admin`, `inspector`, or `curator`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Raising user's identifier.
    pub user_id: String,
    /// Raising user's display name.
    pub user_name: String,
    /// Referenced patrol object identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    /// Referenced patrol object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Advisory `[lat, lng]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<[f64; 2]>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// `active` or `reset`.
    pub status: String,
    /// Targeted roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_roles: Option<Vec<String>>,
    /// Targeted user identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_user_ids: Option<Vec<String>>,
}

impl AlertDocument {
    /// Encodes an alert.
    #[must_use]
    pub fn from_alert(alert: &Alert) -> Self {
        let object_ref = alert.object_ref();
        let audience = alert.audience();
        Self {
            kind: alert.kind().as_str().to_owned(),
            user_id: alert.raised_by().user_id().as_str().to_owned(),
            user_name: alert.raised_by().display_name().to_owned(),
            object_id: object_ref.map(|object| object.object_id().to_owned()),
            object_name: object_ref.map(|object| object.object_name().to_owned()),
            description: alert.description().map(str::to_owned),
            coordinates: alert.coordinates().map(|point| [point.lat(), point.lng()]),
            created_at: alert.created_at(),
            status: alert.status().as_str().to_owned(),
            for_roles: audience
                .role_set()
                .map(|roles| roles.iter().map(|role| role.as_str().to_owned()).collect()),
            for_user_ids: audience
                .user_set()
                .map(|users| users.iter().map(|user| user.as_str().to_owned()).collect()),
        }
    }

    /// Decodes the document stored under `id`.
    ///
    /// When both audience sets are present the role set wins.
    ///
    /// # Errors
    ///
    /// Returns [`AlertDocumentError`] for unknown roles or statuses, blank
    /// identities, or invalid coordinates.
    pub fn into_alert(self, id: AlertId) -> Result<Alert, AlertDocumentError> {
        let kind = Role::try_from(self.kind.as_str())?;
        let raised_by = RaisedBy::new(UserId::new(self.user_id)?, self.user_name)?;
        let object_ref = object_ref_from(self.object_id, self.object_name)?;
        let coordinates = self
            .coordinates
            .map(|[lat, lng]| Coordinates::new(lat, lng))
            .transpose()?;
        let status = AlertStatus::try_from(self.status.as_str())?;
        let roles = self
            .for_roles
            .map(|roles| {
                roles
                    .iter()
                    .map(|role| Role::try_from(role.as_str()))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        let users = self
            .for_user_ids
            .map(|users| users.into_iter().map(UserId::new).collect::<Result<Vec<_>, _>>())
            .transpose()?;

        Ok(Alert::from_persisted(PersistedAlertData {
            id,
            kind,
            raised_by,
            object_ref,
            description: self.description.filter(|text| !text.trim().is_empty()),
            coordinates,
            created_at: self.created_at,
            status,
            audience: Audience::from_parts(roles, users),
        }))
    }
}

/// Builds the object reference from its independently optional parts.
///
/// Blank parts count as absent. When only one part is present it stands in
/// for the other.
fn object_ref_from(
    object_id: Option<String>,
    object_name: Option<String>,
) -> Result<Option<ObjectRef>, AlertDomainError> {
    let present = |part: Option<String>| part.filter(|text| !text.trim().is_empty());
    match (present(object_id), present(object_name)) {
        (Some(id), Some(name)) => ObjectRef::new(id, name).map(Some),
        (Some(part), None) | (None, Some(part)) => ObjectRef::new(part.clone(), part).map(Some),
        (None, None) => Ok(None),
    }
}

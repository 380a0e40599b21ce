//! Alert aggregate root and related lifecycle types.

use super::{AlertDomainError, AlertId, Audience, ParseAlertStatusError};
use crate::identity::{Role, UserId, Viewer};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Alert lifecycle status. `Reset` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// The alert is raised and has not been reset.
    Active,
    /// The alert has been reset by an operator.
    Reset,
}

impl AlertStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AlertStatus {
    type Error = ParseAlertStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "reset" => Ok(Self::Reset),
            _ => Err(ParseAlertStatusError(value.to_owned())),
        }
    }
}

/// User who raised an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaisedBy {
    user_id: UserId,
    display_name: String,
}

impl RaisedBy {
    /// Creates a validated raiser identity.
    ///
    /// # Errors
    ///
    /// Returns [`AlertDomainError::EmptyDisplayName`] when the name is blank.
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Result<Self, AlertDomainError> {
        let raw = display_name.into();
        let name = raw.trim();
        if name.is_empty() {
            return Err(AlertDomainError::EmptyDisplayName);
        }
        Ok(Self {
            user_id,
            display_name: name.to_owned(),
        })
    }

    /// Returns the raiser's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the raiser's display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Patrol location an alert concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    object_id: String,
    object_name: String,
}

impl ObjectRef {
    /// Creates a validated object reference.
    ///
    /// # Errors
    ///
    /// Returns [`AlertDomainError::InvalidObjectRef`] when either part is
    /// blank.
    pub fn new(
        object_id: impl Into<String>,
        object_name: impl Into<String>,
    ) -> Result<Self, AlertDomainError> {
        let id = object_id.into().trim().to_owned();
        let name = object_name.into().trim().to_owned();
        if id.is_empty() || name.is_empty() {
            return Err(AlertDomainError::InvalidObjectRef);
        }
        Ok(Self {
            object_id: id,
            object_name: name,
        })
    }

    /// Returns the patrol object identifier.
    #[must_use]
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Returns the patrol object display name.
    #[must_use]
    pub fn object_name(&self) -> &str {
        &self.object_name
    }
}

/// Advisory latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

impl Coordinates {
    /// Creates validated coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`AlertDomainError::InvalidCoordinates`] when a component is
    /// not finite or out of range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, AlertDomainError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if !valid {
            return Err(AlertDomainError::InvalidCoordinates { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    /// Returns the latitude.
    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    /// Returns the longitude.
    #[must_use]
    pub const fn lng(self) -> f64 {
        self.lng
    }
}

/// Input for raising a new alert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    kind: Role,
    raised_by: RaisedBy,
    object_ref: Option<ObjectRef>,
    description: Option<String>,
    coordinates: Option<Coordinates>,
    audience: Audience,
}

impl NewAlert {
    /// Creates an alert request raised by a user holding `kind`.
    #[must_use]
    pub const fn new(kind: Role, raised_by: RaisedBy) -> Self {
        Self {
            kind,
            raised_by,
            object_ref: None,
            description: None,
            coordinates: None,
            audience: Audience::Everyone,
        }
    }

    /// Sets the patrol object the alert concerns.
    #[must_use]
    pub fn with_object(mut self, object_ref: ObjectRef) -> Self {
        self.object_ref = Some(object_ref);
        self
    }

    /// Sets the free-text description. Blank text is ignored.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let text = description.into();
        let trimmed = text.trim();
        self.description = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Sets advisory coordinates.
    #[must_use]
    pub const fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Restricts the alert to an audience.
    #[must_use]
    pub fn with_audience(mut self, audience: Audience) -> Self {
        self.audience = audience;
        self
    }
}

/// Alert aggregate root.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    id: AlertId,
    kind: Role,
    raised_by: RaisedBy,
    object_ref: Option<ObjectRef>,
    description: Option<String>,
    coordinates: Option<Coordinates>,
    created_at: DateTime<Utc>,
    status: AlertStatus,
    audience: Audience,
}

/// Parameter object for reconstructing a persisted alert.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedAlertData {
    /// Persisted alert identifier.
    pub id: AlertId,
    /// Role of the user who raised the alert.
    pub kind: Role,
    /// Raising user.
    pub raised_by: RaisedBy,
    /// Referenced patrol object, if any.
    pub object_ref: Option<ObjectRef>,
    /// Free-text description, if any.
    pub description: Option<String>,
    /// Advisory coordinates, if any.
    pub coordinates: Option<Coordinates>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: AlertStatus,
    /// Audience targeting.
    pub audience: Audience,
}

impl Alert {
    /// Raises a new active alert stamped with the clock's current time.
    #[must_use]
    pub fn raise(request: NewAlert, clock: &impl Clock) -> Self {
        Self {
            id: AlertId::new(),
            kind: request.kind,
            raised_by: request.raised_by,
            object_ref: request.object_ref,
            description: request.description,
            coordinates: request.coordinates,
            created_at: clock.utc(),
            status: AlertStatus::Active,
            audience: request.audience,
        }
    }

    /// Reconstructs an alert from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAlertData) -> Self {
        Self {
            id: data.id,
            kind: data.kind,
            raised_by: data.raised_by,
            object_ref: data.object_ref,
            description: data.description,
            coordinates: data.coordinates,
            created_at: data.created_at,
            status: data.status,
            audience: data.audience,
        }
    }

    /// Returns the alert identifier.
    #[must_use]
    pub const fn id(&self) -> AlertId {
        self.id
    }

    /// Returns the role of the user who raised the alert.
    #[must_use]
    pub const fn kind(&self) -> Role {
        self.kind
    }

    /// Returns the raising user.
    #[must_use]
    pub const fn raised_by(&self) -> &RaisedBy {
        &self.raised_by
    }

    /// Returns the referenced patrol object, if any.
    #[must_use]
    pub const fn object_ref(&self) -> Option<&ObjectRef> {
        self.object_ref.as_ref()
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the advisory coordinates, if any.
    #[must_use]
    pub const fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> AlertStatus {
        self.status
    }

    /// Returns the audience targeting.
    #[must_use]
    pub const fn audience(&self) -> &Audience {
        &self.audience
    }

    /// Returns `true` while the alert has not been reset.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    /// Returns `true` when the viewer belongs to the alert's audience.
    #[must_use]
    pub fn is_visible_to(&self, viewer: &Viewer) -> bool {
        self.audience.includes(viewer)
    }

    /// Orders alerts by recency: creation time, then identifier so equal
    /// timestamps still produce a single winner.
    #[must_use]
    pub fn recency_cmp(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Marks the alert as reset.
    ///
    /// # Errors
    ///
    /// Returns [`AlertDomainError::AlreadyReset`] when the alert is no longer
    /// active.
    pub fn reset(&mut self) -> Result<(), AlertDomainError> {
        if !self.is_active() {
            return Err(AlertDomainError::AlreadyReset(self.id));
        }
        self.status = AlertStatus::Reset;
        Ok(())
    }
}

/// Picks the tracked current alert: the most recent alert still active.
pub fn tracked_alert<'a>(alerts: impl IntoIterator<Item = &'a Alert>) -> Option<&'a Alert> {
    alerts
        .into_iter()
        .filter(|alert| alert.is_active())
        .max_by(|left, right| left.recency_cmp(right))
}

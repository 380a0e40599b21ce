//! Error types for alert domain validation and parsing.

use super::AlertId;
use crate::identity::IdentityError;
use thiserror::Error;

/// Errors returned while constructing or mutating alert values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AlertDomainError {
    /// An identity value was rejected.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The display name of the raising user is empty after trimming.
    #[error("display name must not be empty")]
    EmptyDisplayName,

    /// The referenced patrol object has an empty identifier or name.
    #[error("object reference requires a non-empty id and name")]
    InvalidObjectRef,

    /// The coordinates are outside the valid latitude/longitude range.
    #[error("invalid coordinates [{lat}, {lng}]")]
    InvalidCoordinates {
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lng: f64,
    },

    /// The alert was already reset.
    #[error("alert {0} has already been reset")]
    AlreadyReset(AlertId),
}

/// Error returned while parsing alert statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown alert status: {0}")]
pub struct ParseAlertStatusError(pub String);

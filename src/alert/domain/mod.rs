//! Domain model for alert distribution.
//!
//! Alerts are raised once, reset once, and never deleted. The tracked current
//! alert is computed from the set of active alerts rather than stored.

mod alert;
mod audience;
mod error;
mod ids;

pub use alert::{
    Alert, AlertStatus, Coordinates, NewAlert, ObjectRef, PersistedAlertData, RaisedBy,
    tracked_alert,
};
pub use audience::Audience;
pub use error::{AlertDomainError, ParseAlertStatusError};
pub use ids::AlertId;

//! Runtime configuration for the alert and task services.
//!
//! Every section has defaults, so a configuration document only needs the
//! values it overrides.
//!
//! # Example
//!
//! ```
//! use patrolcore::config::{DismissScope, FieldOpsConfig};
//! use patrolcore::identity::Role;
//!
//! let config = FieldOpsConfig::default();
//! assert_eq!(config.alarm.exempt_role, Role::Operator);
//! assert_eq!(config.dismiss.scope, DismissScope::PerAlert);
//!
//! let custom = FieldOpsConfig::from_json_str(r#"{"dismiss": {"scope": "device"}}"#)
//!     .expect("valid configuration");
//! assert_eq!(custom.dismiss.scope, DismissScope::Device);
//! ```

use crate::alert::ports::Volume;
use crate::identity::Role;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for [`FieldOpsConfig`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value parsed but is not usable.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Offending field path.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldOpsConfig {
    /// Audio alarm settings.
    pub alarm: AlarmConfig,
    /// Dismiss flag settings.
    pub dismiss: DismissConfig,
    /// Alert broker settings.
    pub broker: BrokerConfig,
}

impl FieldOpsConfig {
    /// Parses a JSON configuration document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents and
    /// [`ConfigError::Invalid`] for unusable values.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broker.feed_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "broker.feed_capacity",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.dismiss.file_name.trim().is_empty() || self.dismiss.file_name.contains('/') {
            return Err(ConfigError::Invalid {
                field: "dismiss.file_name",
                reason: format!("'{}' is not a plain file name", self.dismiss.file_name),
            });
        }
        Ok(())
    }
}

/// Audio alarm settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlarmConfig {
    /// Volume applied when the controller starts.
    pub volume: Volume,
    /// Role that never triggers the alarm sound.
    pub exempt_role: Role,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            volume: Volume::MAX,
            exempt_role: Role::Operator,
        }
    }
}

/// How far a dismissal reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissScope {
    /// A dismissal only hides the alert that was dismissed.
    #[default]
    PerAlert,
    /// A dismissal hides whichever alert is tracked until the flag clears.
    Device,
}

/// Dismiss flag settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DismissConfig {
    /// Reach of a dismissal.
    pub scope: DismissScope,
    /// Directory holding the flag file.
    pub storage_dir: Utf8PathBuf,
    /// Name of the flag file inside `storage_dir`.
    pub file_name: String,
}

impl Default for DismissConfig {
    fn default() -> Self {
        Self {
            scope: DismissScope::PerAlert,
            storage_dir: Utf8PathBuf::from(".patrolcore"),
            file_name: "alarm-dismissed.json".to_owned(),
        }
    }
}

/// Alert broker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    /// Buffered change notifications per feed receiver.
    pub feed_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self { feed_capacity: 64 }
    }
}

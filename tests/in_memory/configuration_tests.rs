//! Integration tests wiring services from configuration documents.

use std::sync::Arc;

use camino::Utf8PathBuf;
use mockable::DefaultClock;
use patrolcore::alert::{
    adapters::{FileDismissFlagStore, memory::InMemoryAlertRepository},
    domain::{Alert, AlertId},
    ports::{AlertChange, AlertRepository, DismissFlagStore},
    services::DismissStateStore,
};
use patrolcore::config::{ConfigError, DismissScope, FieldOpsConfig};
use patrolcore::identity::Role;
use rstest::{fixture, rstest};

use super::helpers::alert_from;

/// Removes its directory when dropped.
struct ScratchDir(Utf8PathBuf);

impl Drop for ScratchDir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.0).ok();
    }
}

#[fixture]
fn scratch() -> ScratchDir {
    let base = Utf8PathBuf::from_path_buf(std::env::temp_dir()).expect("utf-8 temp dir");
    ScratchDir(base.join(format!("patrolcore-config-{}", uuid::Uuid::new_v4())))
}

fn config_for(scratch: &ScratchDir, scope: &str) -> Result<FieldOpsConfig, ConfigError> {
    let document = serde_json::json!({
        "dismiss": {
            "scope": scope,
            "storage_dir": scratch.0.as_str(),
            "file_name": "dismissed.json",
        },
    });
    FieldOpsConfig::from_json_str(&document.to_string())
}

#[rstest]
fn dismissal_persists_across_store_instances(scratch: ScratchDir) -> eyre::Result<()> {
    let config = config_for(&scratch, "per_alert")?;
    let alert_id = AlertId::new();

    let first = DismissStateStore::new(
        Arc::new(FileDismissFlagStore::from_config(&config.dismiss)?),
        Arc::new(DefaultClock),
        config.dismiss.scope,
    );
    first.set_dismissed(alert_id)?;

    let second = DismissStateStore::new(
        Arc::new(FileDismissFlagStore::from_config(&config.dismiss)?),
        Arc::new(DefaultClock),
        config.dismiss.scope,
    );
    eyre::ensure!(second.is_dismissed(alert_id)?, "dismissal was lost on reopen");
    eyre::ensure!(
        !second.is_dismissed(AlertId::new())?,
        "per-alert dismissal leaked to another alert"
    );

    second.clear()?;
    eyre::ensure!(
        FileDismissFlagStore::from_config(&config.dismiss)?
            .load()?
            .is_none(),
        "cleared flag still on disk"
    );
    Ok(())
}

#[rstest]
fn device_scope_is_read_from_configuration(scratch: ScratchDir) -> eyre::Result<()> {
    let config = config_for(&scratch, "device")?;
    eyre::ensure!(config.dismiss.scope == DismissScope::Device, "scope not applied");

    let state = DismissStateStore::new(
        Arc::new(FileDismissFlagStore::from_config(&config.dismiss)?),
        Arc::new(DefaultClock),
        config.dismiss.scope,
    );
    state.set_dismissed(AlertId::new())?;

    eyre::ensure!(state.is_dismissed(AlertId::new())?, "device scope ignored");
    Ok(())
}

#[rstest]
fn unknown_fields_are_rejected() {
    let result = FieldOpsConfig::from_json_str(r#"{"alarm": {"loudness": 3}}"#);

    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn configured_feed_capacity_still_delivers_changes() -> eyre::Result<()> {
    let config = FieldOpsConfig::from_json_str(r#"{"broker": {"feed_capacity": 2}}"#)?;
    let repository = InMemoryAlertRepository::from_config(&config.broker);
    let mut feed = repository.changes();

    let alert = Alert::raise(alert_from("agent-1", Role::Agent), &DefaultClock);
    repository.store(&alert).await?;

    let change = feed.recv().await?;
    eyre::ensure!(
        change == AlertChange::Created(alert.id()),
        "unexpected change {change:?}"
    );
    Ok(())
}

//! Then steps for field alert BDD scenarios.

use super::world::{AlertLifecycleWorld, eventually, run_async};
use patrolcore::alert::{
    adapters::memory::DeviceCall,
    domain::{AlertStatus, ObjectRef},
    ports::AlertRepository,
};
use rstest_bdd_macros::then;

#[then(r#"{role} "{user}" sees an active alert for "{object_name}""#)]
fn sees_alert_for(
    world: &AlertLifecycleWorld,
    role: String,
    user: String,
    object_name: String,
) -> Result<(), eyre::Report> {
    let feed = world.feed(&role, &user)?;
    let matched = eventually(|| {
        feed.last_alert().is_some_and(|alert| {
            alert.status() == AlertStatus::Active
                && alert.object_ref().map(ObjectRef::object_name) == Some(object_name.as_str())
        })
    });
    eyre::ensure!(matched, "{user} never saw an alert for {object_name}");
    Ok(())
}

#[then(r#"{role} "{user}" sees an alert"#)]
fn sees_alert(world: &AlertLifecycleWorld, role: String, user: String) -> Result<(), eyre::Report> {
    let feed = world.feed(&role, &user)?;
    let expected = world.last_alert;
    let matched = eventually(|| feed.last_alert().map(|alert| alert.id()) == expected);
    eyre::ensure!(matched, "{user} never saw alert {expected:?}");
    Ok(())
}

#[then(r#"{role} "{user}" sees no alert"#)]
fn sees_no_alert(
    world: &AlertLifecycleWorld,
    role: String,
    user: String,
) -> Result<(), eyre::Report> {
    let feed = world.feed(&role, &user)?;
    let cleared = eventually(|| matches!(feed.last(), Some(Ok(None))));
    eyre::ensure!(cleared, "{user} last saw {:?}", feed.last());
    Ok(())
}

#[then("the alarm is sounding")]
fn alarm_sounding(world: &AlertLifecycleWorld) -> Result<(), eyre::Report> {
    let broker = world.broker()?;
    eyre::ensure!(
        eventually(|| broker.audio().is_playing()),
        "alarm is not playing"
    );
    Ok(())
}

#[then("the alarm never started")]
fn alarm_never_started(world: &AlertLifecycleWorld) -> Result<(), eyre::Report> {
    let starts = world.device.count(&DeviceCall::Start);
    eyre::ensure!(starts == 0, "alarm started {starts} times");
    eyre::ensure!(!world.broker()?.audio().is_playing(), "alarm reports playing");
    Ok(())
}

#[then("the alarm was paused {times:usize} time")]
fn alarm_paused(world: &AlertLifecycleWorld, times: usize) -> Result<(), eyre::Report> {
    let broker = world.broker()?;
    eyre::ensure!(
        eventually(|| broker.current().is_none()),
        "alert still tracked"
    );
    let pauses = world.device.count(&DeviceCall::Pause);
    eyre::ensure!(pauses == times, "expected {times} pauses, found {pauses}");
    eyre::ensure!(!broker.audio().is_playing(), "alarm still playing");
    Ok(())
}

#[then(r#"the stored alert status is "{status}""#)]
fn stored_status(world: &AlertLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let id = world
        .last_alert
        .ok_or_else(|| eyre::eyre!("no alert was raised"))?;
    let stored = run_async(world.repository.find_by_id(id))?
        .ok_or_else(|| eyre::eyre!("alert {id} missing from store"))?;
    eyre::ensure!(
        stored.status().as_str() == status,
        "expected status {status}, found {}",
        stored.status()
    );
    Ok(())
}

#[then("the alert is dismissed")]
fn alert_dismissed(world: &AlertLifecycleWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(world.broker()?.is_dismissed()?, "alert is not dismissed");
    Ok(())
}

#[then("the dismiss flag is cleared")]
fn dismiss_cleared(world: &AlertLifecycleWorld) -> Result<(), eyre::Report> {
    let broker = world.broker()?;
    let cleared = eventually(|| {
        broker
            .dismiss_state()
            .is_flag_set()
            .is_ok_and(|set| !set)
    });
    eyre::ensure!(cleared, "dismiss flag still set");
    Ok(())
}

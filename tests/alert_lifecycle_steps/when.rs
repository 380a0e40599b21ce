//! When steps for field alert BDD scenarios.

use super::world::{AlertLifecycleWorld, eventually, run_async};
use patrolcore::alert::domain::{Audience, NewAlert, ObjectRef, RaisedBy};
use patrolcore::identity::{Role, UserId};
use rstest_bdd_macros::when;

fn request(role: &str, user: &str) -> Result<NewAlert, eyre::Report> {
    let raised_by = RaisedBy::new(UserId::new(user)?, format!("User {user}"))?;
    Ok(NewAlert::new(Role::try_from(role)?, raised_by))
}

fn raise(world: &mut AlertLifecycleWorld, alert: NewAlert) -> Result<(), eyre::Report> {
    let id = run_async(world.broker()?.create(alert))?;
    world.last_alert = Some(id);
    Ok(())
}

#[when(r#"{role} "{user}" raises an alert for object "{object_id}" named "{object_name}""#)]
fn raise_for_object(
    world: &mut AlertLifecycleWorld,
    role: String,
    user: String,
    object_id: String,
    object_name: String,
) -> Result<(), eyre::Report> {
    let alert = request(&role, &user)?.with_object(ObjectRef::new(object_id, object_name)?);
    raise(world, alert)
}

#[when(r#"{role} "{user}" raises an alert for supervisors only"#)]
fn raise_for_supervisors(
    world: &mut AlertLifecycleWorld,
    role: String,
    user: String,
) -> Result<(), eyre::Report> {
    let alert = request(&role, &user)?.with_audience(Audience::roles([Role::Supervisor]));
    raise(world, alert)
}

#[when(r#"{role} "{user}" raises an alert"#)]
fn raise_plain(
    world: &mut AlertLifecycleWorld,
    role: String,
    user: String,
) -> Result<(), eyre::Report> {
    let alert = request(&role, &user)?;
    raise(world, alert)
}

#[when("the current alert is reset")]
fn reset_current(world: &mut AlertLifecycleWorld) -> Result<(), eyre::Report> {
    let expected = world.last_alert;
    let broker = world.broker()?;
    let tracked = eventually(|| broker.current().map(|alert| alert.id()) == expected);
    eyre::ensure!(tracked, "broker never tracked the raised alert");
    let reset = run_async(broker.reset())?;
    eyre::ensure!(reset == expected, "reset {reset:?}, expected {expected:?}");
    Ok(())
}

#[when("the alert is dismissed on this device")]
fn dismiss_current(world: &mut AlertLifecycleWorld) -> Result<(), eyre::Report> {
    let expected = world.last_alert;
    let broker = world.broker()?;
    let tracked = eventually(|| broker.current().map(|alert| alert.id()) == expected);
    eyre::ensure!(tracked, "broker never tracked the raised alert");
    let dismissed = broker.dismiss()?;
    eyre::ensure!(dismissed == expected, "dismissed {dismissed:?}");
    Ok(())
}

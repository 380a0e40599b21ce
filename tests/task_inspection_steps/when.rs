//! When steps for inspection task BDD scenarios.

use super::world::{TaskInspectionWorld, run_async};
use patrolcore::task::domain::TaskObjectId;
use rstest_bdd_macros::when;

#[when("the agent accepts the task")]
fn agent_accepts(world: &mut TaskInspectionWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.manager.accept(task_id));
    world.record(result);
    Ok(())
}

#[when(r#"the agent checks object "{object}""#)]
fn agent_checks(world: &mut TaskInspectionWorld, object: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let object_id = TaskObjectId::new(object)?;
    let result = run_async(world.manager.check_object(task_id, &object_id, None));
    world.record(result);
    Ok(())
}

#[when(r#"the agent skips object "{object}""#)]
fn agent_skips(world: &mut TaskInspectionWorld, object: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let object_id = TaskObjectId::new(object)?;
    let result = run_async(world.manager.skip_object(
        task_id,
        &object_id,
        Some("Access blocked".to_owned()),
    ));
    world.record(result);
    Ok(())
}

#[when("the agent completes the task")]
fn agent_completes(world: &mut TaskInspectionWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.manager.complete(task_id));
    world.record(result);
    Ok(())
}

#[when("the operator cancels the task")]
fn operator_cancels(world: &mut TaskInspectionWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.manager.cancel(task_id));
    world.record(result);
    Ok(())
}

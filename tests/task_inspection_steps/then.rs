//! Then steps for inspection task BDD scenarios.

use super::world::{TaskInspectionWorld, run_async};
use patrolcore::task::{
    domain::{TaskDomainError, TaskStatus},
    services::TaskLifecycleError,
};
use rstest_bdd_macros::then;

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskInspectionWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task_id = world.task()?.id();
    let stored = run_async(world.manager.find(task_id))?
        .ok_or_else(|| eyre::eyre!("task {task_id} missing from store"))?;

    if stored.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            stored.status()
        ));
    }
    Ok(())
}

#[then("{checked:usize} of {total:usize} objects are checked")]
fn objects_checked(
    world: &TaskInspectionWorld,
    checked: usize,
    total: usize,
) -> Result<(), eyre::Report> {
    let task = world.task()?;
    if task.objects().len() != total || task.checked_count() != checked {
        return Err(eyre::eyre!(
            "expected {checked}/{total} checked, found {}/{}",
            task.checked_count(),
            task.objects().len()
        ));
    }
    Ok(())
}

#[then("the task was completed after it was accepted")]
fn completed_after_accepted(world: &TaskInspectionWorld) -> Result<(), eyre::Report> {
    let task = world.task()?;
    let accepted = task
        .accepted_at()
        .ok_or_else(|| eyre::eyre!("acceptedAt not set"))?;
    let completed = task
        .completed_at()
        .ok_or_else(|| eyre::eyre!("completedAt not set"))?;
    if completed < accepted {
        return Err(eyre::eyre!(
            "completedAt {completed} precedes acceptedAt {accepted}"
        ));
    }
    Ok(())
}

fn last_error(world: &TaskInspectionWorld) -> Result<&TaskLifecycleError, eyre::Report> {
    match world.last_result.as_ref() {
        Some(Err(err)) => Ok(err),
        Some(Ok(task)) => Err(eyre::eyre!("expected a rejection, task is {}", task.status())),
        None => Err(eyre::eyre!("no action was attempted")),
    }
}

#[then("the action is rejected as not in progress")]
fn rejected_not_in_progress(world: &TaskInspectionWorld) -> Result<(), eyre::Report> {
    let err = last_error(world)?;
    if !matches!(
        err,
        TaskLifecycleError::Domain(TaskDomainError::NotInProgress { .. })
    ) {
        return Err(eyre::eyre!("expected NotInProgress, got {err:?}"));
    }
    if !err.is_invalid_transition() {
        return Err(eyre::eyre!("{err:?} is not classed as an invalid transition"));
    }
    Ok(())
}

#[then("the action is rejected with {unchecked:usize} unchecked objects")]
fn rejected_incomplete(world: &TaskInspectionWorld, unchecked: usize) -> Result<(), eyre::Report> {
    let err = last_error(world)?;
    match err {
        TaskLifecycleError::Domain(TaskDomainError::IncompleteInspection {
            unchecked: found,
            ..
        }) if *found == unchecked && err.is_invalid_transition() => Ok(()),
        other => Err(eyre::eyre!(
            "expected IncompleteInspection with {unchecked} unchecked, got {other:?}"
        )),
    }
}

#[then("the action is rejected as an invalid transition")]
fn rejected_invalid_transition(world: &TaskInspectionWorld) -> Result<(), eyre::Report> {
    let err = last_error(world)?;
    if !err.is_invalid_transition() {
        return Err(eyre::eyre!("expected an invalid transition, got {err:?}"));
    }
    Ok(())
}

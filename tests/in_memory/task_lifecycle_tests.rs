//! In-memory integration tests for the inspection task workflow.

use std::sync::{Arc, Mutex, PoisonError};

use patrolcore::identity::UserId;
use patrolcore::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{ObjectStatus, Task, TaskObjectId, TaskStatus},
    services::{CreateTaskRequest, TaskFilter, TaskLifecycleManager},
};
use rstest::{fixture, rstest};

use super::helpers::SteppingClock;

type TestManager = TaskLifecycleManager<InMemoryTaskRepository, SteppingClock>;

struct Harness {
    repository: Arc<InMemoryTaskRepository>,
    manager: TestManager,
}

#[fixture]
fn harness() -> Harness {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let manager =
        TaskLifecycleManager::new(Arc::clone(&repository), Arc::new(SteppingClock::default()));
    Harness {
        repository,
        manager,
    }
}

fn patrol(agent: &str) -> CreateTaskRequest {
    CreateTaskRequest::new("Warehouse round", agent)
        .with_assignee_name("Dana Reyes")
        .with_object("gate", "North Gate", "1 Quay Street")
        .with_object("pump", "Pump House", "3 Quay Street")
}

fn object(id: &str) -> TaskObjectId {
    TaskObjectId::new(id).expect("valid object id")
}

/// Collects every task delivered to one listener.
#[derive(Clone, Default)]
struct Seen(Arc<Mutex<Vec<Task>>>);

impl Seen {
    fn listener(&self) -> impl Fn(Task) + Send + Sync + 'static {
        let sink = Arc::clone(&self.0);
        move |task| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(task);
        }
    }

    fn statuses(&self) -> Vec<TaskStatus> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(Task::status)
            .collect()
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_inspection_is_persisted_in_document_form(harness: Harness) -> eyre::Result<()> {
    let created = harness.manager.create(patrol("agent-7")).await?;
    harness.manager.accept(created.id()).await?;
    harness
        .manager
        .check_object(created.id(), &object("gate"), Some("Lock replaced".to_owned()))
        .await?;
    harness
        .manager
        .check_object(created.id(), &object("pump"), None)
        .await?;
    let completed = harness.manager.complete(created.id()).await?;

    eyre::ensure!(completed.status() == TaskStatus::Completed, "not completed");
    let gate = completed
        .object(&object("gate"))
        .ok_or_else(|| eyre::eyre!("gate object missing"))?;
    eyre::ensure!(gate.status() == ObjectStatus::Checked, "gate not checked");
    eyre::ensure!(gate.comments() == Some("Lock replaced"), "comment lost");

    let raw = harness
        .repository
        .raw(created.id())?
        .ok_or_else(|| eyre::eyre!("raw document missing"))?;
    for (pointer, expected) in [
        ("/status", "completed"),
        ("/assignedTo", "agent-7"),
        ("/objects/0/status", "checked"),
        ("/objects/0/comments", "Lock replaced"),
    ] {
        let found = raw.pointer(pointer).and_then(serde_json::Value::as_str);
        eyre::ensure!(found == Some(expected), "{pointer} is {found:?}");
    }
    eyre::ensure!(
        raw.pointer("/completedAt").is_some_and(serde_json::Value::is_string),
        "completedAt missing"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn agent_subscription_sees_only_their_tasks(harness: Harness) -> eyre::Result<()> {
    let agent = UserId::new("agent-7")?;
    let seen = Seen::default();
    let _subscription = harness
        .manager
        .subscribe(TaskFilter::Agent(agent.clone()), seen.listener())
        .await?;

    let mine = harness.manager.create(patrol("agent-7")).await?;
    harness.manager.create(patrol("agent-8")).await?;
    harness.manager.accept(mine.id()).await?;
    harness.manager.cancel(mine.id()).await?;

    let statuses = seen.statuses();
    eyre::ensure!(
        statuses
            == vec![
                TaskStatus::Pending,
                TaskStatus::InProgress,
                TaskStatus::Cancelled
            ],
        "unexpected deliveries {statuses:?}"
    );

    let listed: Vec<_> = harness
        .manager
        .list_for_agent(&agent)
        .await?
        .iter()
        .map(Task::id)
        .collect();
    eyre::ensure!(listed == vec![mine.id()], "unexpected listing {listed:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unsubscribed_listener_stops_receiving(harness: Harness) -> eyre::Result<()> {
    let created = harness.manager.create(patrol("agent-7")).await?;
    let seen = Seen::default();
    let subscription = harness
        .manager
        .subscribe(TaskFilter::Task(created.id()), seen.listener())
        .await?;

    subscription.unsubscribe();
    harness.manager.accept(created.id()).await?;

    eyre::ensure!(
        seen.statuses() == vec![TaskStatus::Pending],
        "listener kept receiving after unsubscribe"
    );
    eyre::ensure!(harness.manager.subscriber_count() == 0, "listener still attached");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_transition_leaves_stored_task_untouched(harness: Harness) -> eyre::Result<()> {
    let created = harness.manager.create(patrol("agent-7")).await?;
    let before = harness.repository.raw(created.id())?;

    let result = harness
        .manager
        .check_object(created.id(), &object("gate"), None)
        .await;

    eyre::ensure!(result.is_err(), "check on a pending task was accepted");
    eyre::ensure!(
        harness.repository.raw(created.id())? == before,
        "stored document changed"
    );
    Ok(())
}

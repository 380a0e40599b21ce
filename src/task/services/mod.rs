//! Application services for task lifecycle orchestration.

mod lifecycle;

pub use lifecycle::{
    CreateTaskRequest, TaskFilter, TaskLifecycleError, TaskLifecycleManager, TaskLifecycleResult,
};

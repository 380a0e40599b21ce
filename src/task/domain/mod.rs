//! Domain model for inspection tasks.
//!
//! A task lists the patrol objects one agent must visit. The task and each
//! of its objects follow small explicit state machines; every other edge is
//! rejected.

mod error;
mod ids;
mod object;
mod status;
mod task;

pub use error::{ParseObjectStatusError, ParseTaskStatusError, TaskDomainError};
pub use ids::{TaskId, TaskObjectId};
pub use object::{PersistedTaskObjectData, TaskObject};
pub use status::{ObjectStatus, TaskStatus};
pub use task::{NewTask, PersistedTaskData, Task};

//! In-memory adapter implementations for task lifecycle tests.

mod task;

pub use task::InMemoryTaskRepository;

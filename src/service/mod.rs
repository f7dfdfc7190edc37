//service/mod.rs
pub mod todo_service;
pub mod warmup_worker;

pub use todo_service::{TodoPage, TodoService};
pub use warmup_worker::{WarmupError, WarmupState, WarmupStatus, WarmupWorker};

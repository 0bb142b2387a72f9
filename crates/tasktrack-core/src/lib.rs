pub mod error;
pub mod task;
pub mod validate;

pub use error::CoreError;
pub use task::{Task, TaskId, TaskPriority, TaskStatus};

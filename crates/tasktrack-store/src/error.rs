use tasktrack_core::task::TaskId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] tasktrack_core::error::CoreError),

    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("task already exists: {0}")]
    Conflict(TaskId),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("task ids exhausted: no id left after {0}")]
    IdsExhausted(TaskId),

    #[error("corrupt task file: {0}")]
    CorruptFile(String),

    #[error("lock file conflict: {0}")]
    LockConflict(String),
}

impl StoreError {
    /// Validation failure raised before any mutation was attempted.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::Core(_))
    }
}

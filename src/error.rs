use thiserror::Error;

/// Failures surfaced by a [`crate::service::TaskService`].
#[derive(Debug, Error)]
pub enum TaskError {
    /// A required field was missing or malformed.
    #[error("invalid task: {0}")]
    Validation(String),

    #[error("task {0} not found")]
    NotFound(i64),

    /// The call could not complete (connection, query or decode failure).
    #[error("store unavailable: {0}")]
    Transport(#[from] sqlx::Error),
}

impl TaskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type TaskResult<T> = Result<T, TaskError>;

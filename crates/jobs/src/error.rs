use agora_core::error::CoreError;

use crate::delivery::email::EmailError;

/// Failure of a job attempt.
///
/// The runner retries retryable errors with backoff and dead-letters
/// permanent ones immediately.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid job payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Email delivery failed: {0}")]
    Email(#[from] EmailError),

    #[error("{0}")]
    Permanent(String),
}

impl JobError {
    /// Whether retrying can never succeed.
    pub fn is_permanent(&self) -> bool {
        match self {
            JobError::Payload(_) | JobError::Permanent(_) => true,
            JobError::Core(err) => matches!(
                err,
                CoreError::Validation(_) | CoreError::NotFound { .. }
            ),
            JobError::Database(_) | JobError::Email(_) => false,
        }
    }
}

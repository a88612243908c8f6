use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Scheduling conflict: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Ownership error: {0}")]
    Ownership(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl SchedulingError {
    /// Short machine-readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            SchedulingError::Validation(_) => "validation",
            SchedulingError::Conflict(_) => "conflict",
            SchedulingError::NotFound(_) => "not_found",
            SchedulingError::InvalidState(_) => "invalid_state",
            SchedulingError::Ownership(_) => "ownership",
            SchedulingError::Database(_) => "database",
            SchedulingError::Internal(_) => "internal",
        }
    }
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;

#[derive(thiserror::Error, Debug)]
pub enum JobdeskError {
    #[error("No fields to update")]
    EmptyUpdate,
    #[error("Minimum {min} cannot exceed maximum {max}")]
    InvalidRange { min: i64, max: i64 },
    #[error("No filter criteria supplied")]
    NoFilterCriteria,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, JobdeskError>;

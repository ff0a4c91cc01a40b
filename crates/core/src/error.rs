use stratus_api::BoxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StratusError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("precondition failed: {0}")]
    Precondition(String),
    #[error("duplicate logical id: {0}")]
    DuplicateLogicalId(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<BoxError> for StratusError {
    fn from(err: BoxError) -> Self {
        // Seam failures are usually file-system failures; keep them in
        // the I/O category when they are.
        match err.downcast::<std::io::Error>() {
            Ok(io) => StratusError::Io(*io),
            Err(other) => StratusError::Internal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StratusError>;

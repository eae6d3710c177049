use tracefold_core::error::{CoreError, InvariantError, ShapeError};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Batch length mismatch: sent {expected} calls, got {actual} responses")]
    BatchLength { expected: usize, actual: usize },

    #[error("Invalid syscall table: {0}")]
    Syscall(String),
}

impl From<ShapeError> for ProtocolError {
    fn from(err: ShapeError) -> Self {
        ProtocolError::Core(err.into())
    }
}

impl From<InvariantError> for ProtocolError {
    fn from(err: InvariantError) -> Self {
        ProtocolError::Core(err.into())
    }
}

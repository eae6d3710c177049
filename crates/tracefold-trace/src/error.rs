use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Core error: {0}")]
    Core(#[from] tracefold_core::CoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<tracefold_core::InvariantError> for TraceError {
    fn from(err: tracefold_core::InvariantError) -> Self {
        TraceError::Core(err.into())
    }
}

impl From<tracefold_core::ShapeError> for TraceError {
    fn from(err: tracefold_core::ShapeError) -> Self {
        TraceError::Core(err.into())
    }
}

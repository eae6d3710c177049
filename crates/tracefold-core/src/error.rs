use thiserror::Error;

/// Malformed input: wrong type, missing required field, or a value outside a
/// closed enumeration. `path` is a dotted JSON path (`$` for the root).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {message}")]
pub struct ShapeError {
    pub path: String,
    pub message: String,
}

impl ShapeError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            path: if path.is_empty() { "$".to_string() } else { path },
            message: message.into(),
        }
    }
}

/// Structurally valid input that breaks a cross-field rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("`ok=true` must not include `error`")]
    OkWithError,

    #[error("`ok=false` must include `error`")]
    NotOkWithoutError,

    #[error(
        "kernel-sourced event `{kind}` must not be marked `conclusive` unless allow_kernel_conclusive is enabled"
    )]
    KernelConclusiveNotAllowed { kind: String },

    #[error("absorbedCount must be {expected}, got {actual}")]
    AbsorbedCountMismatch { expected: usize, actual: usize },

    #[error("next context holds {actual} facts, above maxFacts={max}")]
    FactCapExceeded { max: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Shape error at {0}")]
    Shape(#[from] ShapeError),

    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl CoreError {
    pub fn is_shape(&self) -> bool {
        matches!(self, CoreError::Shape(_))
    }

    pub fn is_invariant(&self) -> bool {
        matches!(self, CoreError::Invariant(_))
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, InvariantError, ShapeError};
use crate::validate::envelope::check_result_invariant;

/// Error payload of a failed kernel run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Low-level result returned by `KernelPort::run`.
///
/// `ok=true` never carries `error`; `ok=false` always does. The wire shape can
/// express both violations, so [`KernelRunResult::outcome`] re-checks before
/// handing out a typed view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KernelRunResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

/// Typed view of a [`KernelRunResult`] that passed the invariant check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelOutcome<'a> {
    Success { output: Option<&'a Value> },
    Failure { error: &'a ErrorPayload },
}

impl KernelRunResult {
    pub fn success(output: Value) -> Self {
        Self {
            ok: true,
            output: Some(output),
            error: None,
        }
    }

    pub fn failure(error: ErrorPayload) -> Self {
        Self {
            ok: false,
            output: None,
            error: Some(error),
        }
    }

    pub fn outcome(&self) -> Result<KernelOutcome<'_>, InvariantError> {
        check_result_invariant(self.ok, self.error.is_some())?;
        match (&self.error, self.ok) {
            (Some(error), false) => Ok(KernelOutcome::Failure { error }),
            _ => Ok(KernelOutcome::Success {
                output: self.output.as_ref(),
            }),
        }
    }
}

/// Error object of a failed application call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ApplicationError {
    pub code: String,
    pub message: String,
}

/// Wire envelope returned by the engine for one application call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ApplicationEnvelope {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApplicationError>,
}

/// Validated application response. A failure is data, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ApplicationEnvelope", into = "ApplicationEnvelope")]
pub enum ApplicationResponse {
    Success {
        op: String,
        data: Value,
    },
    Failure {
        op: Option<String>,
        error: ApplicationError,
    },
}

impl ApplicationResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApplicationResponse::Success { .. })
    }

    pub fn op(&self) -> Option<&str> {
        match self {
            ApplicationResponse::Success { op, .. } => Some(op),
            ApplicationResponse::Failure { op, .. } => op.as_deref(),
        }
    }
}

impl TryFrom<ApplicationEnvelope> for ApplicationResponse {
    type Error = CoreError;

    fn try_from(envelope: ApplicationEnvelope) -> Result<Self, Self::Error> {
        check_result_invariant(envelope.ok, envelope.error.is_some())?;
        match (envelope.ok, envelope.error) {
            (false, Some(error)) => Ok(ApplicationResponse::Failure {
                op: envelope.op,
                error,
            }),
            _ => {
                let op = envelope
                    .op
                    .filter(|op| !op.is_empty())
                    .ok_or_else(|| ShapeError::new("op", "required when ok=true"))?;
                Ok(ApplicationResponse::Success {
                    op,
                    data: envelope.data.unwrap_or(Value::Null),
                })
            }
        }
    }
}

impl From<ApplicationResponse> for ApplicationEnvelope {
    fn from(response: ApplicationResponse) -> Self {
        match response {
            ApplicationResponse::Success { op, data } => ApplicationEnvelope {
                ok: true,
                op: Some(op),
                data: Some(data),
                error: None,
            },
            ApplicationResponse::Failure { op, error } => ApplicationEnvelope {
                ok: false,
                op,
                data: None,
                error: Some(error),
            },
        }
    }
}

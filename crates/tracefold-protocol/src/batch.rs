use serde_json::Value;
use tracing::debug;

use tracefold_core::error::{CoreError, ShapeError};
use tracefold_core::model::{ApplicationCall, ApplicationResponse};
use tracefold_core::validate::{parse_application_response, validate_application_call};

use crate::error::ProtocolError;

/// Serialize calls as one JSON array, in order.
pub fn encode_batch(calls: &[ApplicationCall]) -> Result<String, ProtocolError> {
    for (i, call) in calls.iter().enumerate() {
        validate_application_call(call).map_err(|e| at_index(i, e))?;
    }
    Ok(serde_json::to_string(calls)?)
}

/// Parse the engine's reply to a batch of `expected` calls. Response `i`
/// answers call `i`.
pub fn decode_batch(expected: usize, text: &str) -> Result<Vec<ApplicationResponse>, ProtocolError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(ShapeError::new("$", "expected a JSON array of responses").into());
    };
    if items.len() != expected {
        return Err(ProtocolError::BatchLength {
            expected,
            actual: items.len(),
        });
    }

    let responses = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            parse_application_response(item).map_err(|e| match e {
                CoreError::Shape(shape) => ProtocolError::from(at_index(i, shape)),
                other => ProtocolError::from(other),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(responses = responses.len(), "decoded batch");
    Ok(responses)
}

fn at_index(i: usize, err: ShapeError) -> ShapeError {
    let path = if err.path == "$" {
        format!("[{i}]")
    } else {
        format!("[{i}].{}", err.path)
    };
    ShapeError::new(path, err.message)
}

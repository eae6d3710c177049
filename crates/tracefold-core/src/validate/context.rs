use chrono::DateTime;
use serde_json::Value;
use tracing::debug;

use super::envelope::parse_kernel_run_result_at;
use super::event::{parse_trace_events_at, validate_trace_event};
use super::shape::{
    decode, expect_object, index, join, non_negative_int, one_of, optional_array, optional_object,
    optional_one_of, optional_positive_int, optional_str, required_array, required_object,
    required_str, string_items, Object,
};
use crate::config::ValidationOptions;
use crate::error::{CoreError, InvariantError, ShapeError};
use crate::model::{
    AbsorptionRequest, AbsorptionResult, AbsorptionStrategy, ContextDocument, LoopTurn,
};

const PROVENANCES: &[&str] = &["observed", "inferred"];
const STRATEGIES: &[&str] = &["append", "recompute"];

fn shape_fact(value: &Value, path: &str) -> Result<(), ShapeError> {
    let fact = expect_object(value, path)?;
    required_str(fact, path, "type")?;
    required_str(fact, path, "label")?;
    let provenance = required_str(fact, path, "provenance")?;
    one_of(provenance, PROVENANCES, join(path, "provenance"))
}

fn shape_schema(schema: &Object, path: &str) -> Result<(), ShapeError> {
    required_str(schema, path, "id")?;
    optional_str(schema, path, "name")?;
    non_negative_int(schema, path, "fieldCount")?;
    for key in ["requiredFields", "optionalFields"] {
        if let Some(fields) = optional_array(schema, path, key)? {
            string_items(fields, &join(path, key))?;
        }
    }
    Ok(())
}

fn shape_context(value: &Value, path: &str) -> Result<(), ShapeError> {
    let ctx = expect_object(value, path)?;
    required_str(ctx, path, "id")?;
    let timestamp = required_str(ctx, path, "timestamp")?;
    if DateTime::parse_from_rfc3339(timestamp).is_err() {
        return Err(ShapeError::new(
            join(path, "timestamp"),
            format!("`{timestamp}` is not an RFC 3339 timestamp"),
        ));
    }
    if let Some(facts) = optional_array(ctx, path, "facts")? {
        let facts_path = join(path, "facts");
        for (i, fact) in facts.iter().enumerate() {
            shape_fact(fact, &index(&facts_path, i))?;
        }
    }
    shape_schema(required_object(ctx, path, "schema")?, &join(path, "schema"))?;
    if let Some(goal) = optional_object(ctx, path, "goal")? {
        let goal_path = join(path, "goal");
        for key in ["id", "type", "description"] {
            required_str(goal, &goal_path, key)?;
        }
    }
    Ok(())
}

fn parse_context_document_at(value: &Value, path: &str) -> Result<ContextDocument, CoreError> {
    shape_context(value, path)?;
    Ok(decode(value, path)?)
}

pub fn parse_context_document(value: &Value) -> Result<ContextDocument, CoreError> {
    parse_context_document_at(value, "")
}

/// Checks the non-empty identifiers of a typed context.
pub fn validate_context_document(ctx: &ContextDocument) -> Result<(), ShapeError> {
    if ctx.id.is_empty() {
        return Err(ShapeError::new("id", "must be a non-empty string"));
    }
    if ctx.schema.id.is_empty() {
        return Err(ShapeError::new("schema.id", "must be a non-empty string"));
    }
    for (i, fact) in ctx.facts.iter().enumerate() {
        if fact.fact_type.is_empty() {
            return Err(ShapeError::new(
                format!("facts[{i}].type"),
                "must be a non-empty string",
            ));
        }
    }
    Ok(())
}

pub fn parse_absorption_request(
    value: &Value,
    options: &ValidationOptions,
) -> Result<AbsorptionRequest, CoreError> {
    let obj = expect_object(value, "")?;
    let previous = obj
        .get("previous")
        .ok_or_else(|| ShapeError::new("previous", "required field is missing"))?;
    parse_context_document_at(previous, "previous")?;
    let delta = required_array(obj, "", "traceDelta")?;
    parse_trace_events_at(delta, "traceDelta", options)?;
    optional_one_of(obj, "", "strategy", STRATEGIES)?;
    optional_positive_int(obj, "", "maxFacts")?;
    optional_object(obj, "", "meta")?;
    Ok(decode(value, "")?)
}

pub fn validate_absorption_request(
    request: &AbsorptionRequest,
    options: &ValidationOptions,
) -> Result<(), CoreError> {
    validate_context_document(&request.previous).map_err(|e| prefix("previous", e))?;
    if request.max_facts == Some(0) {
        return Err(ShapeError::new("maxFacts", "must be a positive integer").into());
    }
    for (i, event) in request.trace_delta.iter().enumerate() {
        validate_trace_event(event, options).map_err(|e| match e {
            CoreError::Shape(s) => prefix(&format!("traceDelta[{i}]"), s).into(),
            other => other,
        })?;
    }
    Ok(())
}

/// The AbsorptionResult contract, checked against the request that produced it.
///
/// `append` absorbs exactly `traceDelta.len()` events; `recompute` reports the
/// size of the rebuilt fact list. Either way the cap must hold.
pub fn validate_absorption_result(
    result: &AbsorptionResult,
    request: &AbsorptionRequest,
) -> Result<(), CoreError> {
    validate_context_document(&result.next).map_err(|e| prefix("next", e))?;

    let expected = match request.effective_strategy() {
        AbsorptionStrategy::Append => request.trace_delta.len(),
        AbsorptionStrategy::Recompute => result.next.facts.len(),
    };
    if result.absorbed_count != expected {
        return Err(InvariantError::AbsorbedCountMismatch {
            expected,
            actual: result.absorbed_count,
        }
        .into());
    }

    if let Some(max) = request.max_facts {
        if result.next.facts.len() > max {
            return Err(InvariantError::FactCapExceeded {
                max,
                actual: result.next.facts.len(),
            }
            .into());
        }
    }
    debug!(
        strategy = request.effective_strategy().as_str(),
        absorbed = result.absorbed_count,
        "absorption result accepted"
    );
    Ok(())
}

pub fn parse_loop_turn(value: &Value, options: &ValidationOptions) -> Result<LoopTurn, CoreError> {
    let obj = expect_object(value, "")?;
    if let Some(meta) = optional_object(obj, "", "meta")? {
        for key in ["loopId", "stepId", "note"] {
            optional_str(meta, "meta", key)?;
        }
    }
    let context = obj
        .get("context")
        .ok_or_else(|| ShapeError::new("context", "required field is missing"))?;
    parse_context_document_at(context, "context")?;
    if let Some(delta) = optional_array(obj, "", "traceDelta")? {
        parse_trace_events_at(delta, "traceDelta", options)?;
    }
    if let Some(result) = obj.get("kernelResult").filter(|v| !v.is_null()) {
        parse_kernel_run_result_at(result, "kernelResult")?;
    }
    Ok(decode(value, "")?)
}

fn prefix(parent: &str, err: ShapeError) -> ShapeError {
    let path = if err.path == "$" {
        parent.to_string()
    } else {
        join(parent, &err.path)
    };
    ShapeError::new(path, err.message)
}

use serde_json::Value;

use super::shape::{
    decode, expect_object, index, join, one_of, optional_object, optional_one_of, optional_str,
    required_array, required_str, string_items, Object,
};
use crate::config::ValidationOptions;
use crate::error::{CoreError, InvariantError, ShapeError};
use crate::model::{FactStoreOp, TraceEvent};

const ROLES: &[&str] = &["kernel", "user", "system"];
const LEVELS: &[&str] = &["tacit", "inferred", "proven", "conclusive"];

fn shape_fact_store(fs: &Object, path: &str) -> Result<(), ShapeError> {
    let op = required_str(fs, path, "op")?;
    one_of(op, &FactStoreOp::ALL, join(path, "op"))?;
    optional_str(fs, path, "kind")?;
    let ids = required_array(fs, path, "ids")?;
    string_items(ids, &join(path, "ids"))
}

/// Closed checks on the named fields. Unknown keys are left alone.
fn shape_meta(meta: &Object, path: &str) -> Result<(), ShapeError> {
    for key in ["traceId", "spanId", "parentSpanId", "engine", "timestamp"] {
        optional_str(meta, path, key)?;
    }
    optional_one_of(meta, path, "role", ROLES)?;
    optional_one_of(meta, path, "epistemicLevel", LEVELS)?;
    if let Some(fs) = optional_object(meta, path, "factStore")? {
        shape_fact_store(fs, &join(path, "factStore"))?;
    }
    optional_object(meta, path, "dialectic")?;
    optional_object(meta, path, "custom")?;
    Ok(())
}

fn shape_event(value: &Value, path: &str) -> Result<(), ShapeError> {
    let obj = expect_object(value, path)?;
    required_str(obj, path, "kind")?;
    if let Some(meta) = optional_object(obj, path, "meta")? {
        shape_meta(meta, &join(path, "meta"))?;
    }
    Ok(())
}

/// A kernel-sourced event may not claim the highest certainty tier unless the
/// caller opted in. See [`TraceEvent::is_kernel_sourced`] for which events
/// count; a `.result` event with no role does.
pub fn check_epistemic_policy(
    event: &TraceEvent,
    options: &ValidationOptions,
) -> Result<(), InvariantError> {
    if options.allow_kernel_conclusive || !event.is_kernel_sourced() {
        return Ok(());
    }
    let level = event.meta.as_ref().and_then(|m| m.epistemic_level);
    if level.is_some_and(|l| l.is_highest()) {
        return Err(InvariantError::KernelConclusiveNotAllowed {
            kind: event.kind.clone(),
        });
    }
    Ok(())
}

pub(crate) fn parse_trace_event_at(
    value: &Value,
    path: &str,
    options: &ValidationOptions,
) -> Result<TraceEvent, CoreError> {
    shape_event(value, path)?;
    let event: TraceEvent = decode(value, path)?;
    check_epistemic_policy(&event, options)?;
    Ok(event)
}

pub fn parse_trace_event(
    value: &Value,
    options: &ValidationOptions,
) -> Result<TraceEvent, CoreError> {
    parse_trace_event_at(value, "", options)
}

pub(crate) fn parse_trace_events_at(
    items: &[Value],
    path: &str,
    options: &ValidationOptions,
) -> Result<Vec<TraceEvent>, CoreError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_trace_event_at(item, &index(path, i), options))
        .collect()
}

/// Checks a typed event. Enumerations are already closed by the type, so only
/// the non-empty kind and the epistemic policy remain.
pub fn validate_trace_event(
    event: &TraceEvent,
    options: &ValidationOptions,
) -> Result<(), CoreError> {
    if event.kind.is_empty() {
        return Err(ShapeError::new("kind", "must be a non-empty string").into());
    }
    check_epistemic_policy(event, options)?;
    Ok(())
}

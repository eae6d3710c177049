use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ShapeError;

pub(crate) type Object = Map<String, Value>;

pub(crate) fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

pub(crate) fn index(parent: &str, i: usize) -> String {
    if parent.is_empty() {
        format!("[{i}]")
    } else {
        format!("{parent}[{i}]")
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(path: String, expected: &str, got: &Value) -> ShapeError {
    ShapeError::new(path, format!("expected {expected}, got {}", type_name(got)))
}

/// Null and absent are the same thing for optional fields.
fn present<'a>(obj: &'a Object, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

pub(crate) fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Object, ShapeError> {
    value
        .as_object()
        .ok_or_else(|| mismatch(path.to_string(), "object", value))
}

pub(crate) fn required_str<'a>(
    obj: &'a Object,
    parent: &str,
    key: &str,
) -> Result<&'a str, ShapeError> {
    let path = join(parent, key);
    match present(obj, key) {
        None => Err(ShapeError::new(path, "required field is missing")),
        Some(Value::String(s)) if s.is_empty() => {
            Err(ShapeError::new(path, "must be a non-empty string"))
        }
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(mismatch(path, "string", other)),
    }
}

pub(crate) fn optional_str<'a>(
    obj: &'a Object,
    parent: &str,
    key: &str,
) -> Result<Option<&'a str>, ShapeError> {
    match present(obj, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(mismatch(join(parent, key), "string", other)),
    }
}

pub(crate) fn required_bool(obj: &Object, parent: &str, key: &str) -> Result<bool, ShapeError> {
    match present(obj, key) {
        None => Err(ShapeError::new(join(parent, key), "required field is missing")),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(mismatch(join(parent, key), "boolean", other)),
    }
}

pub(crate) fn optional_bool(
    obj: &Object,
    parent: &str,
    key: &str,
) -> Result<Option<bool>, ShapeError> {
    match present(obj, key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(mismatch(join(parent, key), "boolean", other)),
    }
}

pub(crate) fn required_object<'a>(
    obj: &'a Object,
    parent: &str,
    key: &str,
) -> Result<&'a Object, ShapeError> {
    let path = join(parent, key);
    match present(obj, key) {
        None => Err(ShapeError::new(path, "required field is missing")),
        Some(value) => expect_object(value, &path),
    }
}

pub(crate) fn optional_object<'a>(
    obj: &'a Object,
    parent: &str,
    key: &str,
) -> Result<Option<&'a Object>, ShapeError> {
    match present(obj, key) {
        None => Ok(None),
        Some(value) => expect_object(value, &join(parent, key)).map(Some),
    }
}

pub(crate) fn required_array<'a>(
    obj: &'a Object,
    parent: &str,
    key: &str,
) -> Result<&'a [Value], ShapeError> {
    let path = join(parent, key);
    match present(obj, key) {
        None => Err(ShapeError::new(path, "required field is missing")),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(mismatch(path, "array", other)),
    }
}

pub(crate) fn optional_array<'a>(
    obj: &'a Object,
    parent: &str,
    key: &str,
) -> Result<Option<&'a [Value]>, ShapeError> {
    match present(obj, key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(other) => Err(mismatch(join(parent, key), "array", other)),
    }
}

pub(crate) fn string_items(items: &[Value], path: &str) -> Result<(), ShapeError> {
    for (i, item) in items.iter().enumerate() {
        if !item.is_string() {
            return Err(mismatch(index(path, i), "string", item));
        }
    }
    Ok(())
}

pub(crate) fn optional_positive_int(
    obj: &Object,
    parent: &str,
    key: &str,
) -> Result<Option<u64>, ShapeError> {
    let path = join(parent, key);
    match present(obj, key) {
        None => Ok(None),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(v) if v > 0 => Ok(Some(v)),
            _ => Err(ShapeError::new(path, "must be a positive integer")),
        },
        Some(other) => Err(mismatch(path, "positive integer", other)),
    }
}

pub(crate) fn non_negative_int(
    obj: &Object,
    parent: &str,
    key: &str,
) -> Result<u64, ShapeError> {
    let path = join(parent, key);
    match present(obj, key) {
        None => Err(ShapeError::new(path, "required field is missing")),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| ShapeError::new(path, "must be a non-negative integer")),
        Some(other) => Err(mismatch(path, "non-negative integer", other)),
    }
}

/// Check `value` against a closed enumeration.
pub(crate) fn one_of(value: &str, allowed: &[&str], path: String) -> Result<(), ShapeError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ShapeError::new(
            path,
            format!(
                "unrecognized value `{value}` (expected one of: {})",
                allowed.join(", ")
            ),
        ))
    }
}

pub(crate) fn optional_one_of(
    obj: &Object,
    parent: &str,
    key: &str,
    allowed: &[&str],
) -> Result<(), ShapeError> {
    if let Some(value) = optional_str(obj, parent, key)? {
        one_of(value, allowed, join(parent, key))?;
    }
    Ok(())
}

/// Deserialize after the shape pass. Anything serde still rejects is reported
/// against `path`.
pub(crate) fn decode<T: DeserializeOwned>(value: &Value, path: &str) -> Result<T, ShapeError> {
    T::deserialize(value).map_err(|e| ShapeError::new(path, e.to_string()))
}

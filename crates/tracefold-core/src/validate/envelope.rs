use serde_json::Value;
use tracing::debug;

use super::shape::{
    decode, expect_object, join, optional_bool, optional_object, optional_one_of, optional_str,
    required_bool, required_object, required_str, Object,
};
use crate::error::{CoreError, InvariantError, ShapeError};
use crate::model::{ApplicationCall, ApplicationResponse, KernelRunRequest, KernelRunResult};

/// The success/error biconditional shared by every result envelope.
pub fn check_result_invariant(ok: bool, has_error: bool) -> Result<(), InvariantError> {
    match (ok, has_error) {
        (true, true) => Err(InvariantError::OkWithError),
        (false, false) => Err(InvariantError::NotOkWithoutError),
        _ => Ok(()),
    }
}

fn shape_kernel_run_result(obj: &Object, parent: &str) -> Result<(), ShapeError> {
    required_bool(obj, parent, "ok")?;
    if let Some(error) = optional_object(obj, parent, "error")? {
        let path = join(parent, "error");
        optional_str(error, &path, "code")?;
        required_str(error, &path, "message")?;
    }
    Ok(())
}

pub(crate) fn parse_kernel_run_result_at(
    value: &Value,
    path: &str,
) -> Result<KernelRunResult, CoreError> {
    let obj = expect_object(value, path)?;
    shape_kernel_run_result(obj, path)?;
    let result: KernelRunResult = decode(value, path)?;
    check_result_invariant(result.ok, result.error.is_some())?;
    Ok(result)
}

/// Shape pass, then the `ok`/`error` invariant.
pub fn parse_kernel_run_result(value: &Value) -> Result<KernelRunResult, CoreError> {
    parse_kernel_run_result_at(value, "")
}

/// Checks a typed result: the invariant, and a non-empty error message.
pub fn validate_kernel_run_result(result: &KernelRunResult) -> Result<(), CoreError> {
    if let Some(error) = &result.error {
        if error.message.is_empty() {
            return Err(ShapeError::new("error.message", "must be a non-empty string").into());
        }
    }
    check_result_invariant(result.ok, result.error.is_some())?;
    Ok(())
}

pub fn parse_application_response(value: &Value) -> Result<ApplicationResponse, CoreError> {
    let obj = expect_object(value, "")?;
    let ok = required_bool(obj, "", "ok")?;
    optional_str(obj, "", "op")?;
    let error = optional_object(obj, "", "error")?;
    if let Some(error) = error {
        required_str(error, "error", "code")?;
        required_str(error, "error", "message")?;
    }
    check_result_invariant(ok, error.is_some())?;
    if ok {
        required_str(obj, "", "op")?;
    }
    // Anything left is caught by the envelope conversion.
    let response: ApplicationResponse = serde_json::from_value(value.clone())?;
    Ok(response)
}

pub fn parse_application_call(value: &Value) -> Result<ApplicationCall, CoreError> {
    let obj = expect_object(value, "")?;
    optional_one_of(obj, "", "kind", &["ApplicationForm"])?;
    required_str(obj, "", "facade")?;
    required_str(obj, "", "op")?;
    let user = required_object(obj, "", "user")?;
    required_str(user, "user", "username")?;
    optional_bool(user, "user", "isAdmin")?;
    required_str(obj, "", "databaseId")?;
    required_str(obj, "", "graphName")?;
    let call: ApplicationCall = decode(value, "")?;
    debug!(facade = %call.facade, op = %call.op, "application call accepted");
    Ok(call)
}

/// Checks a typed call: every selector and identity field must be non-empty.
pub fn validate_application_call(call: &ApplicationCall) -> Result<(), ShapeError> {
    for (path, value) in [
        ("facade", &call.facade),
        ("op", &call.op),
        ("user.username", &call.user.username),
        ("databaseId", &call.database_id),
        ("graphName", &call.graph_name),
    ] {
        if value.is_empty() {
            return Err(ShapeError::new(path, "must be a non-empty string"));
        }
    }
    Ok(())
}

pub fn parse_kernel_run_request(value: &Value) -> Result<KernelRunRequest, CoreError> {
    let obj = expect_object(value, "")?;
    let model = required_object(obj, "", "model")?;
    required_str(model, "model", "id")?;
    optional_str(model, "model", "kind")?;
    optional_str(model, "model", "version")?;
    optional_object(obj, "", "params")?;
    Ok(decode(value, "")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ErrorPayload, User};
    use serde_json::json;

    #[test]
    fn test_accepts_minimal_forms() {
        let ok = parse_kernel_run_result(&json!({"ok": true, "output": {"a": 1}})).unwrap();
        assert_eq!(ok.output, Some(json!({"a": 1})));

        let failed = parse_kernel_run_result(&json!({"ok": false, "error": {"message": "bad"}}))
            .unwrap();
        assert_eq!(failed.error.unwrap().message, "bad");
    }

    #[test]
    fn test_invariant_both_halves() {
        let err = parse_kernel_run_result(&json!({"ok": true, "error": {"message": "x"}}))
            .unwrap_err();
        assert!(err.is_invariant());
        assert!(err.to_string().contains("`ok=true` must not include `error`"));

        let err = parse_kernel_run_result(&json!({"ok": false})).unwrap_err();
        assert!(err.is_invariant());
        assert!(err.to_string().contains("`ok=false` must include `error`"));
    }

    #[test]
    fn test_shape_errors_carry_paths() {
        let err = parse_kernel_run_result(&json!({"ok": "yes"})).unwrap_err();
        match err {
            CoreError::Shape(e) => assert_eq!(e.path, "ok"),
            other => panic!("expected shape error, got {other:?}"),
        }

        let err = parse_kernel_run_result(&json!({"ok": false, "error": {"message": ""}}))
            .unwrap_err();
        match err {
            CoreError::Shape(e) => assert_eq!(e.path, "error.message"),
            other => panic!("expected shape error, got {other:?}"),
        }

        let err = parse_kernel_run_result(&json!([1])).unwrap_err();
        match err {
            CoreError::Shape(e) => assert_eq!(e.path, "$"),
            other => panic!("expected shape error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_typed_result() {
        assert!(validate_kernel_run_result(&KernelRunResult::success(json!(1))).is_ok());
        let broken = KernelRunResult {
            ok: true,
            output: None,
            error: Some(ErrorPayload::new("x")),
        };
        assert!(validate_kernel_run_result(&broken).unwrap_err().is_invariant());
        let empty = KernelRunResult::failure(ErrorPayload::new(""));
        assert!(validate_kernel_run_result(&empty).unwrap_err().is_shape());
    }

    #[test]
    fn test_application_response() {
        let resp = parse_application_response(&json!({"ok": true, "op": "list", "data": []}))
            .unwrap();
        assert!(resp.is_ok());

        let err = parse_application_response(&json!({"ok": true, "data": []})).unwrap_err();
        assert!(err.is_shape());

        let err = parse_application_response(&json!({
            "ok": false,
            "error": {"message": "no code"}
        }))
        .unwrap_err();
        match err {
            CoreError::Shape(e) => assert_eq!(e.path, "error.code"),
            other => panic!("expected shape error, got {other:?}"),
        }
    }

    #[test]
    fn test_application_call() {
        let call = parse_application_call(&json!({
            "kind": "ApplicationForm",
            "facade": "graph_store_catalog",
            "op": "list_graphs",
            "user": {"username": "alice", "isAdmin": true},
            "databaseId": "db",
            "graphName": "g",
            "verbose": true
        }))
        .unwrap();
        assert_eq!(call.args["verbose"], true);
        assert!(validate_application_call(&call).is_ok());

        let err = parse_application_call(&json!({
            "facade": "f", "op": "o", "user": {"username": "a"}, "databaseId": "db"
        }))
        .unwrap_err();
        match err {
            CoreError::Shape(e) => assert_eq!(e.path, "graphName"),
            other => panic!("expected shape error, got {other:?}"),
        }

        let err = parse_application_call(&json!({
            "kind": "Other", "facade": "f", "op": "o",
            "user": {"username": "a"}, "databaseId": "db", "graphName": "g"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("kind"));

        let blank = ApplicationCall::new("f", "", User::new("a"), "db", "g");
        assert_eq!(validate_application_call(&blank).unwrap_err().path, "op");
    }

    #[test]
    fn test_kernel_request() {
        let req = parse_kernel_run_request(&json!({
            "model": {"id": "engine.algo.pagerank", "kind": "application"},
            "input": {"x": 1},
            "params": {"iterations": 20}
        }))
        .unwrap();
        assert_eq!(req.model.kind.as_deref(), Some("application"));

        let err = parse_kernel_run_request(&json!({"model": {}})).unwrap_err();
        match err {
            CoreError::Shape(e) => assert_eq!(e.path, "model.id"),
            other => panic!("expected shape error, got {other:?}"),
        }
    }
}

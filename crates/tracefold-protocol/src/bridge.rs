use tracing::{debug, warn};

use tracefold_core::error::ShapeError;
use tracefold_core::model::{
    ApplicationCall, ApplicationError, ApplicationResponse, KernelOutcome, KernelRunRequest,
    ModelRef,
};
use tracefold_core::validate::{
    parse_application_call, parse_application_response, validate_application_call,
    validate_kernel_run_result,
};

use crate::error::ProtocolError;
use crate::ids::{operation_id, OperationId};
use crate::port::KernelPort;

/// `model.kind` stamped on requests built from application calls.
pub const APPLICATION_MODEL_KIND: &str = "application";

const KERNEL_FAILURE_CODE: &str = "KERNEL_ERROR";

/// Wrap a structural call for `KernelPort::run`. The model id is
/// `<namespace>.<facade>.<op>` and the input is the call itself.
pub fn application_call_to_kernel_request(
    call: &ApplicationCall,
    namespace: &str,
) -> Result<KernelRunRequest, ProtocolError> {
    validate_application_call(call)?;
    let mut model = ModelRef::new(operation_id(namespace, &call.facade, &call.op));
    model.kind = Some(APPLICATION_MODEL_KIND.to_string());
    Ok(KernelRunRequest {
        model,
        input: serde_json::to_value(call)?,
        params: None,
    })
}

/// Run one application call through `port`.
///
/// Both envelopes are validated. A failed kernel run and an `ok=false`
/// application envelope both come back as [`ApplicationResponse::Failure`];
/// only malformed envelopes and port errors are `Err`.
pub async fn invoke_application_call(
    port: &dyn KernelPort,
    call: &ApplicationCall,
    namespace: &str,
) -> Result<ApplicationResponse, ProtocolError> {
    let request = application_call_to_kernel_request(call, namespace)?;
    debug!(model = %request.model.id, "invoking application call");
    let result = port.run(request).await?;
    validate_kernel_run_result(&result)?;

    match result.outcome()? {
        KernelOutcome::Success { output } => {
            let envelope = output
                .ok_or_else(|| ShapeError::new("output", "required when ok=true"))?;
            Ok(parse_application_response(envelope)?)
        }
        KernelOutcome::Failure { error } => {
            warn!(op = %call.op, message = %error.message, "kernel run failed");
            Ok(ApplicationResponse::Failure {
                op: Some(call.op.clone()),
                error: ApplicationError {
                    code: error
                        .code
                        .clone()
                        .unwrap_or_else(|| KERNEL_FAILURE_CODE.to_string()),
                    message: error.message.clone(),
                },
            })
        }
    }
}

/// Recover the call from a request built by
/// [`application_call_to_kernel_request`]. The model id must route to the
/// call's own facade and op.
pub fn call_from_request(request: &KernelRunRequest) -> Result<ApplicationCall, ProtocolError> {
    let id: OperationId = request.model.id.parse()?;
    let call = parse_application_call(&request.input)?;
    if id.facade != call.facade || id.op != call.op {
        return Err(ShapeError::new(
            "model.id",
            format!("`{id}` does not route to {}.{}", call.facade, call.op),
        )
        .into());
    }
    Ok(call)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::FnKernelPort;
    use serde_json::json;
    use tracefold_core::model::{ErrorPayload, KernelRunResult, User};

    fn call() -> ApplicationCall {
        ApplicationCall::new(
            "graph_store_catalog",
            "drop_graph",
            User::new("alice"),
            "neo4j",
            "people",
        )
        .with_arg("failIfMissing", json!(true))
    }

    #[test]
    fn test_request_shape() {
        let req = application_call_to_kernel_request(&call(), "gds").unwrap();
        assert_eq!(req.model.id, "gds.graph_store_catalog.drop_graph");
        assert_eq!(req.model.kind.as_deref(), Some("application"));
        assert_eq!(req.input["graphName"], "people");
        assert_eq!(req.input["failIfMissing"], true);
        assert_eq!(call_from_request(&req).unwrap(), call());
    }

    #[test]
    fn test_call_from_request_checks_routing() {
        let mut req = application_call_to_kernel_request(&call(), "gds").unwrap();
        req.model.id = "gds.graph_store_catalog.list_graphs".into();
        let err = call_from_request(&req).unwrap_err();
        assert!(err.to_string().contains("model.id"));

        req.model.id = "drop_graph".into();
        assert!(call_from_request(&req).is_err());
    }

    #[test]
    fn test_blank_graph_name_rejected() {
        let mut bad = call();
        bad.graph_name.clear();
        let err = application_call_to_kernel_request(&bad, "gds").unwrap_err();
        assert!(err.to_string().contains("graphName"));
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let port = FnKernelPort::new(|req: KernelRunRequest| {
            KernelRunResult::success(json!({
                "ok": true,
                "op": req.input["op"],
                "data": {"dropped": req.input["graphName"]}
            }))
        });
        let response = invoke_application_call(&port, &call(), "gds").await.unwrap();
        match response {
            ApplicationResponse::Success { op, data } => {
                assert_eq!(op, "drop_graph");
                assert_eq!(data["dropped"], "people");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_domain_failure_is_data() {
        let port = FnKernelPort::new(|_| {
            KernelRunResult::success(json!({
                "ok": false,
                "op": "drop_graph",
                "error": {"code": "NOT_FOUND", "message": "no such graph"}
            }))
        });
        let response = invoke_application_call(&port, &call(), "gds").await.unwrap();
        assert!(!response.is_ok());

        let port = FnKernelPort::new(|_| KernelRunResult::failure(ErrorPayload::new("crashed")));
        match invoke_application_call(&port, &call(), "gds").await.unwrap() {
            ApplicationResponse::Failure { op, error } => {
                assert_eq!(op.as_deref(), Some("drop_graph"));
                assert_eq!(error.code, "KERNEL_ERROR");
                assert_eq!(error.message, "crashed");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_broken_envelopes_are_errors() {
        let port = FnKernelPort::new(|_| KernelRunResult {
            ok: true,
            output: Some(json!({"ok": true})),
            error: Some(ErrorPayload::new("x")),
        });
        assert!(invoke_application_call(&port, &call(), "gds").await.is_err());

        let port = FnKernelPort::new(|_| KernelRunResult {
            ok: true,
            output: None,
            error: None,
        });
        let err = invoke_application_call(&port, &call(), "gds").await.unwrap_err();
        assert!(err.to_string().contains("output"));

        let port = FnKernelPort::new(|_| KernelRunResult::success(json!({"ok": true, "data": 1})));
        assert!(invoke_application_call(&port, &call(), "gds").await.is_err());
    }
}

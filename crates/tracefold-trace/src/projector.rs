use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use tracefold_core::model::{
    ApplicationCall, ApplicationResponse, EventMeta, FactStoreMeta, KernelRunRequest,
    KernelRunResult, TraceEvent,
};

use crate::error::TraceError;

pub use tracefold_core::model::event::{REQUEST_SUFFIX, RESULT_SUFFIX};

pub const KERNEL_RUN_KIND: &str = "kernel.run";
pub const APPLICATION_CALL_KIND: &str = "application.call";

fn correlated(run_id: &str) -> EventMeta {
    EventMeta::with_fact_store(FactStoreMeta::assert(vec![run_id.to_string()]))
}

/// Project one exchange into `[request, result]`.
///
/// Both events assert `run_id` in `meta.factStore.ids`. The result event is
/// emitted whatever `result` says; a failed run is data.
pub fn project(kind: &str, call: Value, result: Value, run_id: &str) -> [TraceEvent; 2] {
    debug!(%kind, %run_id, "projecting exchange");
    [
        TraceEvent::new(format!("{kind}{REQUEST_SUFFIX}"), call).with_meta(correlated(run_id)),
        TraceEvent::new(format!("{kind}{RESULT_SUFFIX}"), result).with_meta(correlated(run_id)),
    ]
}

fn project_typed<C: Serialize, R: Serialize>(
    kind: &str,
    call: &C,
    result: &R,
    run_id: &str,
) -> Result<[TraceEvent; 2], TraceError> {
    Ok(project(
        kind,
        serde_json::to_value(call)?,
        serde_json::to_value(result)?,
        run_id,
    ))
}

/// `kernel.run.request` / `kernel.run.result` for one `KernelPort::run`.
pub fn project_kernel_run(
    request: &KernelRunRequest,
    result: &KernelRunResult,
    run_id: &str,
) -> Result<[TraceEvent; 2], TraceError> {
    project_typed(KERNEL_RUN_KIND, request, result, run_id)
}

pub fn project_application_call(
    call: &ApplicationCall,
    response: &ApplicationResponse,
    run_id: &str,
) -> Result<[TraceEvent; 2], TraceError> {
    project_typed(APPLICATION_CALL_KIND, call, response, run_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracefold_core::model::{ErrorPayload, FactStoreOp, ModelRef};

    fn request() -> KernelRunRequest {
        KernelRunRequest {
            model: ModelRef::new("engine.pregel.rank"),
            input: json!({"graph": "g://demo"}),
            params: None,
        }
    }

    #[test]
    fn test_projects_request_then_result() {
        let [req, res] =
            project_kernel_run(&request(), &KernelRunResult::success(json!({"n": 3})), "run-1")
                .unwrap();
        assert_eq!(req.kind, "kernel.run.request");
        assert_eq!(res.kind, "kernel.run.result");
        assert_eq!(req.payload["model"]["id"], "engine.pregel.rank");
        assert_eq!(res.payload["output"]["n"], 3);
        for event in [&req, &res] {
            let fs = event.meta.as_ref().unwrap().fact_store.as_ref().unwrap();
            assert_eq!(fs.op, FactStoreOp::Assert);
            assert_eq!(fs.ids, vec!["run-1".to_string()]);
        }
    }

    #[test]
    fn test_failed_run_still_emits_result() {
        let failed = KernelRunResult::failure(ErrorPayload::new("kernel crashed"));
        let events = project_kernel_run(&request(), &failed, "run-2").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].payload["ok"], false);
        assert_eq!(events[1].payload["error"]["message"], "kernel crashed");
        assert_eq!(events[1].fact_store_ids(), ["run-2".to_string()]);
    }

    #[test]
    fn test_application_call_kinds() {
        let call = ApplicationCall::new(
            "graph_store_catalog",
            "list_graphs",
            tracefold_core::model::User::new("alice"),
            "db",
            "people",
        );
        let response = ApplicationResponse::Success {
            op: "list_graphs".into(),
            data: json!({"entries": []}),
        };
        let [req, res] = project_application_call(&call, &response, "r").unwrap();
        assert_eq!(req.kind, "application.call.request");
        assert_eq!(req.payload["facade"], "graph_store_catalog");
        assert_eq!(res.kind, "application.call.result");
        assert_eq!(res.payload["ok"], true);
    }

    #[test]
    fn test_raw_projection_is_total() {
        let [a, b] = project("x", Value::Null, json!("anything"), "");
        assert_eq!(a.kind, "x.request");
        assert_eq!(b.payload, "anything");
        assert_eq!(b.fact_store_ids(), ["".to_string()]);
    }
}

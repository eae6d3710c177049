use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use tracefold_core::model::{
    AbsorptionRequest, AbsorptionResult, ApplicationCall, ApplicationResponse, ContextDocument,
    ContextStamp, JsonMap, KernelRunRequest, KernelRunResult, KnowledgeDelta, KnowledgeSnapshot,
    LoopMeta, LoopTurn, TraceEvent,
};
use tracefold_core::validate::{
    validate_absorption_request, validate_kernel_run_result, validate_trace_event,
};
use tracefold_core::{TracefoldConfig, ValidationOptions};
use tracefold_knowledge::{compute_knowledge_delta_weighted, delta_trace_event};
use tracefold_protocol::{invoke_application_call, KernelPort};
use tracefold_trace::{absorb, project_application_call, project_kernel_run};

use crate::error::SdkError;

/// One agent loop: the current context, the events recorded since the last
/// absorption, and the port that reaches the engine.
///
/// Every kernel exchange gets a fresh run id and is projected into the pending
/// delta. [`LoopSession::absorb`] folds that delta into the next context.
pub struct LoopSession {
    port: Box<dyn KernelPort>,
    config: TracefoldConfig,
    loop_id: String,
    step: u64,
    context: ContextDocument,
    pending: Vec<TraceEvent>,
    last_result: Option<KernelRunResult>,
}

impl LoopSession {
    pub fn begin(port: impl KernelPort + 'static, context: ContextDocument) -> Self {
        Self {
            port: Box::new(port),
            config: TracefoldConfig::default(),
            loop_id: format!("loop-{}", Uuid::new_v4().simple()),
            step: 0,
            context,
            pending: Vec::new(),
            last_result: None,
        }
    }

    pub fn config(&mut self, config: TracefoldConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn loop_id(&mut self, loop_id: &str) -> &mut Self {
        self.loop_id = loop_id.to_string();
        self
    }

    pub fn context(&self) -> &ContextDocument {
        &self.context
    }

    pub fn pending(&self) -> &[TraceEvent] {
        &self.pending
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    fn options(&self) -> ValidationOptions {
        self.config.validation()
    }

    /// Queue a caller event. It is validated now, not at absorption.
    pub fn record(&mut self, event: TraceEvent) -> Result<&mut Self, SdkError> {
        validate_trace_event(&event, &self.options())?;
        self.pending.push(event);
        Ok(self)
    }

    /// Run `request`, project the exchange under a new run id, and return the
    /// result. A failed run is returned as a value and still projected.
    pub async fn run_kernel(
        &mut self,
        request: KernelRunRequest,
    ) -> Result<KernelRunResult, SdkError> {
        let run_id = Uuid::new_v4().simple().to_string();
        info!(loop_id = %self.loop_id, %run_id, model = %request.model.id, "kernel run");

        let result = self.port.run(request.clone()).await?;
        validate_kernel_run_result(&result)?;

        let events = project_kernel_run(&request, &result, &run_id)?;
        self.pending.extend(events);
        self.last_result = Some(result.clone());
        Ok(result)
    }

    /// Send one application call through the port and project it.
    pub async fn call(&mut self, call: &ApplicationCall) -> Result<ApplicationResponse, SdkError> {
        let run_id = Uuid::new_v4().simple().to_string();
        info!(
            loop_id = %self.loop_id,
            %run_id,
            facade = %call.facade,
            op = %call.op,
            "application call"
        );

        let response =
            invoke_application_call(self.port.as_ref(), call, &self.config.namespace).await?;
        let events = project_application_call(call, &response, &run_id)?;
        self.pending.extend(events);
        Ok(response)
    }

    /// Score a computation pass and queue its `knowledge.delta` event when it
    /// produced anything.
    pub fn knowledge(
        &mut self,
        before: &KnowledgeSnapshot,
        after: &KnowledgeSnapshot,
    ) -> KnowledgeDelta {
        let delta = compute_knowledge_delta_weighted(before, after, &self.config.weights);
        if let Some(event) = delta_trace_event(&delta) {
            self.pending.push(event);
        }
        delta
    }

    /// Snapshot of the current exchange bundle.
    pub fn turn(&self) -> LoopTurn {
        LoopTurn {
            meta: Some(LoopMeta {
                loop_id: Some(self.loop_id.clone()),
                step_id: Some(format!("s{}", self.step)),
                ..Default::default()
            }),
            context: self.context.clone(),
            trace_delta: self.pending.clone(),
            kernel_result: self.last_result.clone(),
        }
    }

    /// Fold the pending events into the next context stamped by the caller.
    ///
    /// On error the session is left unchanged.
    pub fn absorb(&mut self, stamp: ContextStamp) -> Result<AbsorptionResult, SdkError> {
        let mut meta = JsonMap::new();
        meta.insert("loopId".into(), json!(self.loop_id));
        meta.insert("stepId".into(), json!(format!("s{}", self.step)));

        let request = AbsorptionRequest {
            previous: self.context.clone(),
            trace_delta: self.pending.clone(),
            strategy: Some(self.config.default_strategy),
            max_facts: self.config.max_facts,
            meta: Some(meta),
        };
        validate_absorption_request(&request, &self.options())?;

        let result = absorb(&request, stamp)?;

        debug!(
            loop_id = %self.loop_id,
            step = self.step,
            absorbed = result.absorbed_count,
            "turn closed"
        );
        self.context = result.next.clone();
        self.pending.clear();
        self.last_result = None;
        self.step += 1;
        Ok(result)
    }

    /// [`absorb`](Self::absorb) with a stamp derived from the loop id, the
    /// step counter and the current time.
    pub fn absorb_now(&mut self) -> Result<AbsorptionResult, SdkError> {
        let id = format!("{}-ctx-{}", self.loop_id, self.step + 1);
        self.absorb(ContextStamp::new(id, Utc::now()))
    }
}

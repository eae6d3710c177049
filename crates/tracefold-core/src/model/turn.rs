use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::context::ContextDocument;
use super::event::TraceEvent;
use super::result::KernelRunResult;
use super::JsonMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoopMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// The exchange bundle of one perceive → act → absorb cycle: the context the
/// agent consumed, the events emitted since the prior turn, and the kernel
/// result when the turn ran one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoopTurn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<LoopMeta>,
    pub context: ContextDocument,
    #[serde(default)]
    pub trace_delta: Vec<TraceEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_result: Option<KernelRunResult>,
}

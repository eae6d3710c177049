use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::JsonMap;

/// Suffix of the event that records a call going out.
pub const REQUEST_SUFFIX: &str = ".request";
/// Suffix of the event that records what the engine sent back.
pub const RESULT_SUFFIX: &str = ".result";

/// Recognized fact-store operations. Closed: anything else is a shape error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FactStoreOp {
    Assert,
    Retract,
}

impl FactStoreOp {
    pub const ALL: [&'static str; 2] = ["assert", "retract"];

}

/// Fact-store annotation: which ids an event asserts or retracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FactStoreMeta {
    pub op: FactStoreOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub ids: Vec<String>,
}

impl FactStoreMeta {
    pub fn assert(ids: Vec<String>) -> Self {
        Self {
            op: FactStoreOp::Assert,
            kind: None,
            ids,
        }
    }
}

/// Who produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventRole {
    Kernel,
    User,
    System,
}

/// Epistemic certainty tiers, lowest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EpistemicLevel {
    Tacit,
    Inferred,
    Proven,
    Conclusive,
}

impl EpistemicLevel {
    pub fn is_highest(&self) -> bool {
        *self == EpistemicLevel::Conclusive
    }
}

/// Metadata attached to a [`TraceEvent`].
///
/// Named fields are validated; every other top-level key lands in `extra` and
/// is carried verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<EventRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epistemic_level: Option<EpistemicLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact_store: Option<FactStoreMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialectic: Option<JsonMap>,
    /// Opaque caller data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<JsonMap>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl EventMeta {
    pub fn with_fact_store(fact_store: FactStoreMeta) -> Self {
        Self {
            fact_store: Some(fact_store),
            ..Default::default()
        }
    }
}

/// One discrete happening. Created once, never mutated; order across a
/// sequence is causal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TraceEvent {
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMeta>,
}

impl TraceEvent {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: EventMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Correlation ids from `meta.factStore.ids`, empty when absent.
    pub fn fact_store_ids(&self) -> &[String] {
        self.meta
            .as_ref()
            .and_then(|m| m.fact_store.as_ref())
            .map(|fs| fs.ids.as_slice())
            .unwrap_or(&[])
    }

    /// An explicit `meta.role` decides. Without one, a `.result` event is
    /// taken to come from the engine.
    pub fn is_kernel_sourced(&self) -> bool {
        match self.meta.as_ref().and_then(|m| m.role) {
            Some(role) => role == EventRole::Kernel,
            None => self.kind.ends_with(RESULT_SUFFIX),
        }
    }
}

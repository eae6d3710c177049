use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::context::{ContextDocument, SchemaDescriptor};
use super::event::TraceEvent;
use super::JsonMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AbsorptionStrategy {
    /// Previous facts followed by the delta's facts.
    #[default]
    Append,
    /// Facts rebuilt from the delta alone.
    Recompute,
}

impl AbsorptionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbsorptionStrategy::Append => "append",
            AbsorptionStrategy::Recompute => "recompute",
        }
    }
}

impl std::str::FromStr for AbsorptionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(AbsorptionStrategy::Append),
            "recompute" => Ok(AbsorptionStrategy::Recompute),
            other => Err(format!(
                "unknown strategy `{other}` (expected append or recompute)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbsorptionRequest {
    pub previous: ContextDocument,
    pub trace_delta: Vec<TraceEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<AbsorptionStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_facts: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<JsonMap>,
}

impl AbsorptionRequest {
    pub fn new(previous: ContextDocument, trace_delta: Vec<TraceEvent>) -> Self {
        Self {
            previous,
            trace_delta,
            strategy: None,
            max_facts: None,
            meta: None,
        }
    }

    pub fn with_strategy(mut self, strategy: AbsorptionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_max_facts(mut self, max_facts: usize) -> Self {
        self.max_facts = Some(max_facts);
        self
    }

    pub fn effective_strategy(&self) -> AbsorptionStrategy {
        self.strategy.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbsorptionResult {
    pub next: ContextDocument,
    pub absorbed_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<JsonMap>,
}

/// Identity of the next context, supplied by the calling runtime.
///
/// `schema` falls back to the previous context's schema when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextStamp {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub schema: Option<SchemaDescriptor>,
}

impl ContextStamp {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timestamp,
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: SchemaDescriptor) -> Self {
        self.schema = Some(schema);
        self
    }
}

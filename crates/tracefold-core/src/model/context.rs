use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a fact came from: given by the caller, or produced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Observed,
    Inferred,
}

/// A context entry derived from exactly one trace event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Fact {
    #[serde(rename = "type")]
    pub fact_type: String,
    pub label: String,
    pub provenance: Provenance,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub field_count: usize,
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub optional_fields: Vec<String>,
}

impl SchemaDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            field_count: 0,
            required_fields: Vec::new(),
            optional_fields: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Goal {
    pub id: String,
    #[serde(rename = "type")]
    pub goal_type: String,
    pub description: String,
}

/// The agent's working context for one turn. Superseded, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContextDocument {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub facts: Vec<Fact>,
    pub schema: SchemaDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
}

impl ContextDocument {
    /// A context with no facts yet.
    pub fn empty(id: impl Into<String>, timestamp: DateTime<Utc>, schema: SchemaDescriptor) -> Self {
        Self {
            id: id.into(),
            timestamp,
            facts: Vec::new(),
            schema,
            goal: None,
        }
    }

    pub fn facts_with_label<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Fact> + 'a {
        self.facts.iter().filter(move |f| f.label == label)
    }
}

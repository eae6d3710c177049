use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::JsonMap;

/// The identity a call is made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_admin: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FormKind {
    ApplicationForm,
}

/// One structured request to the external engine, addressed by `facade` + `op`.
///
/// Op-specific fields (e.g. `failIfMissing`, `program`) live in `args` and are
/// flattened onto the wire object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FormKind>,
    pub facade: String,
    pub op: String,
    pub user: User,
    pub database_id: String,
    pub graph_name: String,
    #[serde(flatten)]
    pub args: JsonMap,
}

impl ApplicationCall {
    pub fn new(
        facade: impl Into<String>,
        op: impl Into<String>,
        user: User,
        database_id: impl Into<String>,
        graph_name: impl Into<String>,
    ) -> Self {
        Self {
            kind: Some(FormKind::ApplicationForm),
            facade: facade.into(),
            op: op.into(),
            user,
            database_id: database_id.into(),
            graph_name: graph_name.into(),
            args: JsonMap::new(),
        }
    }

    /// Attach an op-specific field.
    pub fn with_arg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.args.insert(key.into(), value);
        self
    }
}

/// Reference to a model the kernel port can run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ModelRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ModelRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: None,
            version: None,
        }
    }
}

/// Request accepted by `KernelPort::run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KernelRunRequest {
    pub model: ModelRef,
    #[serde(default)]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<JsonMap>,
}

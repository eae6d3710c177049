use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tracefold_core::model::ModelRef;

use crate::error::ProtocolError;

/// A capability the owning agent may invoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Syscall {
    #[serde(rename = "tool")]
    Tool {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", rename = "inputSchema")]
        input_schema: Option<Value>,
    },
    #[serde(rename = "kernel.run")]
    KernelRun {
        model: ModelRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

/// Declared syscalls, checked once at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct SyscallTable {
    entries: Vec<Syscall>,
}

impl SyscallTable {
    /// Names and model ids must be non-empty; tool names must be unique.
    pub fn new(entries: Vec<Syscall>) -> Result<Self, ProtocolError> {
        let mut tools = HashSet::new();
        for (i, entry) in entries.iter().enumerate() {
            match entry {
                Syscall::Tool { name, .. } => {
                    if name.is_empty() {
                        return Err(ProtocolError::Syscall(format!("[{i}].name is empty")));
                    }
                    if !tools.insert(name.as_str()) {
                        return Err(ProtocolError::Syscall(format!(
                            "[{i}] duplicate tool `{name}`"
                        )));
                    }
                }
                Syscall::KernelRun { model, .. } => {
                    if model.id.is_empty() {
                        return Err(ProtocolError::Syscall(format!("[{i}].model.id is empty")));
                    }
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let entries: Vec<Syscall> = serde_json::from_str(text)?;
        Self::new(entries)
    }

    pub fn tool(&self, name: &str) -> Option<&Syscall> {
        self.entries
            .iter()
            .find(|s| matches!(s, Syscall::Tool { name: n, .. } if n == name))
    }

    pub fn allows_model(&self, id: &str) -> bool {
        self.entries
            .iter()
            .any(|s| matches!(s, Syscall::KernelRun { model, .. } if model.id == id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for SyscallTable {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<Syscall>::deserialize(deserializer)?;
        SyscallTable::new(entries).map_err(serde::de::Error::custom)
    }
}

//! Runtime configuration.
//!
//! Library functions take [`ValidationOptions`] and [`DeltaWeights`] as
//! arguments; only the SDK and the CLI read a [`TracefoldConfig`].

mod loader;

pub use loader::{
    apply_env_overrides, deep_merge, load_config, load_config_from_path, parse_bool,
    parse_positive_usize, CONFIG_FILE_NAME,
};

use serde::{Deserialize, Serialize};

use crate::model::{AbsorptionStrategy, DeltaWeights};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TracefoldConfig {
    /// First segment of every routed model id.
    pub namespace: String,
    pub default_strategy: AbsorptionStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_facts: Option<usize>,
    pub allow_kernel_conclusive: bool,
    pub weights: DeltaWeights,
}

impl Default for TracefoldConfig {
    fn default() -> Self {
        Self {
            namespace: "engine".to_string(),
            default_strategy: AbsorptionStrategy::Append,
            max_facts: None,
            allow_kernel_conclusive: false,
            weights: DeltaWeights::default(),
        }
    }
}

impl TracefoldConfig {
    pub fn validation(&self) -> ValidationOptions {
        ValidationOptions::from(self)
    }
}

/// Policy switches for the validators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Let kernel-sourced events claim the `conclusive` tier.
    pub allow_kernel_conclusive: bool,
}

impl From<&TracefoldConfig> for ValidationOptions {
    fn from(config: &TracefoldConfig) -> Self {
        Self {
            allow_kernel_conclusive: config.allow_kernel_conclusive,
        }
    }
}

//! Layered loading: compiled defaults, then an optional JSON file merged over
//! them, then `TRACEFOLD_*` environment variables.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use super::TracefoldConfig;
use crate::error::CoreError;
use crate::model::AbsorptionStrategy;

pub const CONFIG_FILE_NAME: &str = "tracefold.json";

/// Load `tracefold.json` from the working directory when present.
pub fn load_config() -> Result<TracefoldConfig, CoreError> {
    load_config_from_path(Path::new(CONFIG_FILE_NAME))
}

/// A missing file yields defaults. A file that is not valid JSON is an error.
pub fn load_config_from_path(path: &Path) -> Result<TracefoldConfig, CoreError> {
    let defaults = serde_json::to_value(TracefoldConfig::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading config file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "config file not found, using defaults");
        defaults
    };

    let mut config: TracefoldConfig = serde_json::from_value(merged)
        .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Objects merge per key, everything else is replaced. Nulls in `source` are
/// skipped.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `TRACEFOLD_*` overrides read through `lookup`. Unparseable values
/// are logged and ignored.
pub fn apply_env_overrides<F>(config: &mut TracefoldConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("TRACEFOLD_NAMESPACE").filter(|v| !v.trim().is_empty()) {
        config.namespace = v.trim().to_string();
    }
    if let Some(v) = lookup("TRACEFOLD_STRATEGY") {
        match v.trim().parse::<AbsorptionStrategy>() {
            Ok(strategy) => config.default_strategy = strategy,
            Err(reason) => warn!(%reason, "ignoring TRACEFOLD_STRATEGY"),
        }
    }
    if let Some(v) = lookup("TRACEFOLD_MAX_FACTS") {
        match parse_positive_usize(&v) {
            Some(n) => config.max_facts = Some(n),
            None => warn!(value = %v, "ignoring TRACEFOLD_MAX_FACTS"),
        }
    }
    if let Some(v) = lookup("TRACEFOLD_ALLOW_KERNEL_CONCLUSIVE") {
        match parse_bool(&v) {
            Some(b) => config.allow_kernel_conclusive = b,
            None => warn!(value = %v, "ignoring TRACEFOLD_ALLOW_KERNEL_CONCLUSIVE"),
        }
    }
}

/// `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`, case-insensitive.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_positive_usize(val: &str) -> Option<usize> {
    val.trim().parse::<usize>().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_deep_merge() {
        let merged = deep_merge(
            json!({"namespace": "engine", "weights": {"relation": 1.0, "property": 0.5}}),
            json!({"weights": {"property": 0.25}, "namespace": null}),
        );
        assert_eq!(merged["namespace"], "engine");
        assert_eq!(merged["weights"]["relation"], 1.0);
        assert_eq!(merged["weights"]["property"], 0.25);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.namespace, TracefoldConfig::default().namespace);
    }

    #[test]
    fn test_file_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"defaultStrategy": "recompute", "maxFacts": 50}"#).unwrap();
        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.default_strategy, AbsorptionStrategy::Recompute);
        assert_eq!(config.max_facts, Some(50));
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_config_from_path(&path).is_err());

        std::fs::write(&path, r#"{"defaultStrategy": "merge"}"#).unwrap();
        let err = load_config_from_path(&path).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = TracefoldConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("TRACEFOLD_NAMESPACE", "gds"),
                ("TRACEFOLD_STRATEGY", "recompute"),
                ("TRACEFOLD_MAX_FACTS", "12"),
                ("TRACEFOLD_ALLOW_KERNEL_CONCLUSIVE", "yes"),
            ]),
        );
        assert_eq!(config.namespace, "gds");
        assert_eq!(config.default_strategy, AbsorptionStrategy::Recompute);
        assert_eq!(config.max_facts, Some(12));
        assert!(config.allow_kernel_conclusive);
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = TracefoldConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("TRACEFOLD_NAMESPACE", "  "),
                ("TRACEFOLD_STRATEGY", "merge"),
                ("TRACEFOLD_MAX_FACTS", "0"),
                ("TRACEFOLD_ALLOW_KERNEL_CONCLUSIVE", "maybe"),
            ]),
        );
        assert_eq!(config, TracefoldConfig::default());
    }

    #[test]
    fn test_parsers() {
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("2"), None);
        assert_eq!(parse_positive_usize(" 7 "), Some(7));
        assert_eq!(parse_positive_usize("-1"), None);
    }
}

pub mod absorb;
pub mod context;
pub mod delta;
pub mod demo;
pub mod project;
pub mod schema;
pub mod validate;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::Value;

use tracefold_core::model::TraceEvent;
use tracefold_core::validate::parse_trace_event;
use tracefold_core::ValidationOptions;

#[derive(Subcommand)]
pub enum Commands {
    /// Check a JSON document against one of the protocol contracts
    Validate(validate::ValidateArgs),
    /// Turn a request/result pair into trace events
    Project(project::ProjectArgs),
    /// Build a context document from a list of trace events
    Context(context::ContextArgs),
    /// Score the knowledge gained between two snapshots
    Delta(delta::DeltaArgs),
    /// Fold a trace delta into the next context
    Absorb(absorb::AbsorbArgs),
    /// Print the JSON Schema of a contract
    Schema(schema::SchemaArgs),
    /// Run one perceive, act, absorb cycle against a built-in engine
    Demo(demo::DemoArgs),
}

/// Read a JSON document from a file, or from stdin when `path` is `-`.
pub fn read_json(path: &Path) -> Result<Value> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("'{}' is not valid JSON", path.display()))
}

/// Parse a JSON array of trace events, naming the failing index.
pub fn parse_events(value: &Value, options: &ValidationOptions) -> Result<Vec<TraceEvent>> {
    let items = value
        .as_array()
        .context("expected a JSON array of trace events")?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            parse_trace_event(item, options).with_context(|| format!("event [{i}] is invalid"))
        })
        .collect()
}

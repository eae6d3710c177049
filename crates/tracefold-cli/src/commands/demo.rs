use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use serde_json::{json, Value};
use tracing::info;

use tracefold_core::model::{
    ErrorPayload, EventMeta, FactStoreMeta, Goal, KnowledgeItem, ModalityKind, SchemaDescriptor,
};
use tracefold_core::TracefoldConfig;
use tracefold_sdk::{
    FnKernelPort, KernelRunRequest, KernelRunResult, KnowledgeSnapshot, LoopSession, ModelRef,
    TraceEvent,
};
use tracefold_trace::ContextBuilder;

use crate::output::format::{format_absorption, format_delta, format_events};
use crate::output::OutputFormat;

const RANK_MODEL: &str = "gds.pregel.rank";

#[derive(Args)]
pub struct DemoArgs {
    /// Model id to run. Anything other than the built-in rank model fails
    #[arg(long, default_value = RANK_MODEL)]
    pub model: String,

    /// Pregel iterations passed as a param
    #[arg(long, default_value = "10")]
    pub iterations: u32,
}

/// Stand-in engine: ranks the seed entities, rejects every other model.
fn demo_engine(request: KernelRunRequest) -> KernelRunResult {
    if request.model.id != RANK_MODEL {
        return KernelRunResult::failure(
            ErrorPayload::new(format!("unknown model `{}`", request.model.id))
                .with_code("NOT_FOUND"),
        );
    }
    let seeds = request.input["seed"].as_array().cloned().unwrap_or_default();
    let share = 1.0 / seeds.len().max(1) as f64;
    let ranks: serde_json::Map<String, Value> = seeds
        .iter()
        .filter_map(Value::as_str)
        .map(|id| (id.to_string(), json!(share)))
        .collect();
    KernelRunResult::success(json!({
        "graph": request.input["graph"],
        "ranks": ranks,
        "iterations": request.params.as_ref().and_then(|p| p.get("iterations")).cloned()
    }))
}

fn asserted(kind: &str, store_kind: &str, id: &str) -> TraceEvent {
    let mut store = FactStoreMeta::assert(vec![id.to_string()]);
    store.kind = Some(store_kind.to_string());
    TraceEvent::new(kind, json!({"id": id})).with_meta(EventMeta::with_fact_store(store))
}

fn base_trace() -> Vec<TraceEvent> {
    vec![
        TraceEvent::new("shape.create", json!({"name": "demo"})),
        asserted("entity.assert", "entity", "e1"),
        asserted("relation.assert", "relation", "r1"),
    ]
}

pub fn run(args: &DemoArgs, config: &TracefoldConfig, format: OutputFormat) -> Result<()> {
    let schema = SchemaDescriptor::new("trace:demo-loop").with_name("Demo Loop Trace");
    let context = ContextBuilder::new("demo-ctx-0", Utc::now(), schema)
        .goal(Goal {
            id: "g-demo-1".into(),
            goal_type: "demo".into(),
            description: "Rank the seed entities and absorb the result".into(),
        })
        .build(&base_trace());

    let mut session = LoopSession::begin(FnKernelPort::new(demo_engine), context);
    session.config(config.clone()).loop_id("demo");

    let mut model = ModelRef::new(&args.model);
    model.kind = Some("gds".into());
    model.version = Some("1".into());
    let mut params = serde_json::Map::new();
    params.insert("iterations".into(), json!(args.iterations));
    let request = KernelRunRequest {
        model,
        input: json!({"graph": "g://demo", "seed": ["e1"]}),
        params: Some(params),
    };

    info!(model = %args.model, iterations = args.iterations, "running demo turn");
    let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
    let result = rt
        .block_on(session.run_kernel(request))
        .context("Kernel run failed")?;

    let before = KnowledgeSnapshot::default();
    let after = KnowledgeSnapshot {
        relations: if result.ok {
            vec![KnowledgeItem::new("r1").with_modality(ModalityKind::Actual)]
        } else {
            Vec::new()
        },
        properties: Vec::new(),
    };
    let delta = session.knowledge(&before, &after);
    let turn = session.turn();
    let absorbed = session.absorb_now()?;

    match format {
        OutputFormat::Json => {
            let report = json!({
                "turn": turn,
                "knowledge": delta,
                "absorption": absorbed,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("Trace delta:");
            println!("{}", format_events(&turn.trace_delta, format));
            println!("{}", format_delta(&delta, format).trim_end());
            println!();
            println!("{}", format_absorption(&absorbed, format).trim_end());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str) -> KernelRunRequest {
        KernelRunRequest {
            model: ModelRef::new(id),
            input: json!({"graph": "g://demo", "seed": ["e1", "e2"]}),
            params: None,
        }
    }

    #[test]
    fn test_demo_engine_ranks_seeds() {
        let result = demo_engine(request(RANK_MODEL));
        assert!(result.ok);
        let output = result.output.unwrap();
        assert!((output["ranks"]["e1"].as_f64().unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(output["graph"], "g://demo");
    }

    #[test]
    fn test_demo_engine_rejects_unknown_model() {
        let result = demo_engine(request("gds.pregel.louvain"));
        assert!(!result.ok);
        assert_eq!(result.error.unwrap().code.as_deref(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_base_trace_annotates_store_kind() {
        let trace = base_trace();
        assert_eq!(trace.len(), 3);
        assert_eq!(trace[2].fact_store_ids(), ["r1".to_string()]);
        let kind = trace[2]
            .meta
            .as_ref()
            .and_then(|m| m.fact_store.as_ref())
            .and_then(|f| f.kind.as_deref());
        assert_eq!(kind, Some("relation"));
    }
}

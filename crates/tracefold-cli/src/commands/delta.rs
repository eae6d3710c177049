use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use tracefold_core::model::KnowledgeSnapshot;
use tracefold_core::TracefoldConfig;
use tracefold_knowledge::{compute_knowledge_delta_weighted, delta_trace_event};

use super::read_json;
use crate::output::format::{format_delta, format_events};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct DeltaArgs {
    /// Snapshot before the computation pass
    pub before: PathBuf,

    /// Snapshot after the computation pass
    pub after: PathBuf,

    /// Print the `knowledge.delta` trace event instead of the delta
    #[arg(long)]
    pub event: bool,
}

fn snapshot(path: &Path) -> Result<KnowledgeSnapshot> {
    serde_json::from_value(read_json(path)?)
        .with_context(|| format!("'{}' is not a knowledge snapshot", path.display()))
}

pub fn run(args: &DeltaArgs, config: &TracefoldConfig, format: OutputFormat) -> Result<()> {
    let before = snapshot(&args.before)?;
    let after = snapshot(&args.after)?;
    let delta = compute_knowledge_delta_weighted(&before, &after, &config.weights);

    if args.event {
        let events: Vec<_> = delta_trace_event(&delta).into_iter().collect();
        println!("{}", format_events(&events, format).trim_end());
    } else {
        println!("{}", format_delta(&delta, format).trim_end());
    }
    Ok(())
}

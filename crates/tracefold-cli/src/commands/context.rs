use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;

use tracefold_core::model::{Goal, SchemaDescriptor};
use tracefold_core::validate::validate_context_document;
use tracefold_core::TracefoldConfig;
use tracefold_trace::ContextBuilder;

use super::{parse_events, read_json};
use crate::output::format::format_context;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct ContextArgs {
    /// JSON array of trace events (`-` for stdin)
    pub events: PathBuf,

    /// Id of the new context
    #[arg(long)]
    pub id: String,

    /// Schema id
    #[arg(long, default_value = "trace:default")]
    pub schema: String,

    /// Human-readable schema name
    #[arg(long)]
    pub schema_name: Option<String>,

    /// Goal description (requires --goal-id)
    #[arg(long, requires = "goal_id")]
    pub goal: Option<String>,

    #[arg(long, requires = "goal")]
    pub goal_id: Option<String>,

    #[arg(long, default_value = "task")]
    pub goal_type: String,

    /// RFC 3339 timestamp (defaults to now)
    #[arg(long)]
    pub timestamp: Option<DateTime<Utc>>,
}

pub fn run(args: &ContextArgs, config: &TracefoldConfig, format: OutputFormat) -> Result<()> {
    let events = parse_events(&read_json(&args.events)?, &config.validation())
        .with_context(|| format!("Invalid trace in '{}'", args.events.display()))?;

    let mut schema = SchemaDescriptor::new(&args.schema);
    if let Some(name) = &args.schema_name {
        schema = schema.with_name(name);
    }

    let mut builder =
        ContextBuilder::new(&args.id, args.timestamp.unwrap_or_else(Utc::now), schema);
    if let (Some(description), Some(id)) = (&args.goal, &args.goal_id) {
        builder = builder.goal(Goal {
            id: id.clone(),
            goal_type: args.goal_type.clone(),
            description: description.clone(),
        });
    }

    let ctx = builder.build(&events);
    validate_context_document(&ctx)?;
    println!("{}", format_context(&ctx, format).trim_end());
    Ok(())
}

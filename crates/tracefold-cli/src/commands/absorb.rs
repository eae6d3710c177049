use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;

use tracefold_core::model::{AbsorptionStrategy, ContextStamp, SchemaDescriptor};
use tracefold_core::validate::parse_absorption_request;
use tracefold_core::TracefoldConfig;
use tracefold_trace::absorb;

use super::read_json;
use crate::output::format::format_absorption;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct AbsorbArgs {
    /// Absorption request JSON file (`-` for stdin)
    pub request: PathBuf,

    /// Id of the next context
    #[arg(long)]
    pub id: String,

    /// RFC 3339 timestamp of the next context (defaults to now)
    #[arg(long)]
    pub timestamp: Option<DateTime<Utc>>,

    /// Replace the schema id carried over from the previous context
    #[arg(long)]
    pub schema: Option<String>,

    /// Strategy to use when the request names none
    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Fact cap to use when the request names none
    #[arg(long)]
    pub max_facts: Option<usize>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Strategy {
    Append,
    Recompute,
}

impl From<Strategy> for AbsorptionStrategy {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::Append => AbsorptionStrategy::Append,
            Strategy::Recompute => AbsorptionStrategy::Recompute,
        }
    }
}

pub fn run(args: &AbsorbArgs, config: &TracefoldConfig, format: OutputFormat) -> Result<()> {
    if args.max_facts == Some(0) {
        anyhow::bail!("--max-facts must be a positive integer");
    }
    let value = read_json(&args.request)?;
    let mut request = parse_absorption_request(&value, &config.validation())
        .with_context(|| format!("Invalid absorption request '{}'", args.request.display()))?;

    if request.strategy.is_none() {
        request.strategy = Some(args.strategy.map(Into::into).unwrap_or(config.default_strategy));
    }
    if request.max_facts.is_none() {
        request.max_facts = args.max_facts.or(config.max_facts);
    }

    let mut stamp = ContextStamp::new(&args.id, args.timestamp.unwrap_or_else(Utc::now));
    if let Some(schema) = &args.schema {
        stamp = stamp.with_schema(SchemaDescriptor::new(schema));
    }

    let result = absorb(&request, stamp).context("Absorption failed")?;
    println!("{}", format_absorption(&result, format).trim_end());
    Ok(())
}

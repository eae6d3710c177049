use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::Value;

use tracefold_core::validate::{
    parse_absorption_request, parse_application_call, parse_application_response,
    parse_context_document, parse_kernel_run_request, parse_kernel_run_result, parse_loop_turn,
    parse_trace_event,
};
use tracefold_core::TracefoldConfig;
use tracefold_protocol::{operation_id, SyscallTable};

use super::{parse_events, read_json};
use crate::output::OutputFormat;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Document {
    /// A single trace event
    Event,
    /// A JSON array of trace events
    Events,
    /// A kernel run request
    Request,
    /// A kernel run result
    Result,
    /// An application call
    Call,
    /// An application response envelope
    Response,
    /// A context document
    Context,
    /// An absorption request
    AbsorptionRequest,
    /// A loop turn bundle
    LoopTurn,
    /// A syscall table
    Syscalls,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Contract to check against
    #[arg(value_enum)]
    pub document: Document,

    /// JSON file to check (`-` for stdin)
    pub file: PathBuf,
}

pub fn run(args: &ValidateArgs, config: &TracefoldConfig, format: OutputFormat) -> Result<()> {
    let value = read_json(&args.file)?;
    let name = args
        .document
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default();

    let (normalized, summary) = check(args.document, &value, config)
        .with_context(|| format!("'{}' is not a valid {name}", args.file.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&normalized)?),
        OutputFormat::Text => println!("ok: {name} ({summary})"),
    }
    Ok(())
}

/// Parse `value` as `document`, returning its canonical form and a one-line
/// summary.
fn check(document: Document, value: &Value, config: &TracefoldConfig) -> Result<(Value, String)> {
    let options = config.validation();
    let checked = match document {
        Document::Event => {
            let event = parse_trace_event(value, &options)?;
            let summary = event.kind.clone();
            (serde_json::to_value(event)?, summary)
        }
        Document::Events => {
            let events = parse_events(value, &options)?;
            let summary = format!("{} event(s)", events.len());
            (serde_json::to_value(events)?, summary)
        }
        Document::Request => {
            let request = parse_kernel_run_request(value)?;
            let summary = request.model.id.clone();
            (serde_json::to_value(request)?, summary)
        }
        Document::Result => {
            let result = parse_kernel_run_result(value)?;
            let summary = if result.ok { "ok" } else { "failed" }.to_string();
            (serde_json::to_value(result)?, summary)
        }
        Document::Call => {
            let call = parse_application_call(value)?;
            let summary = operation_id(&config.namespace, &call.facade, &call.op);
            (serde_json::to_value(call)?, summary)
        }
        Document::Response => {
            let response = parse_application_response(value)?;
            let summary = if response.is_ok() { "ok" } else { "failed" }.to_string();
            (serde_json::to_value(response)?, summary)
        }
        Document::Context => {
            let ctx = parse_context_document(value)?;
            let summary = format!("{}, {} fact(s)", ctx.id, ctx.facts.len());
            (serde_json::to_value(ctx)?, summary)
        }
        Document::AbsorptionRequest => {
            let request = parse_absorption_request(value, &options)?;
            let summary = format!(
                "{} event(s), {}",
                request.trace_delta.len(),
                request.effective_strategy().as_str()
            );
            (serde_json::to_value(request)?, summary)
        }
        Document::LoopTurn => {
            let turn = parse_loop_turn(value, &options)?;
            let summary = format!("{} event(s)", turn.trace_delta.len());
            (serde_json::to_value(turn)?, summary)
        }
        Document::Syscalls => {
            let table: SyscallTable = serde_json::from_value(value.clone())?;
            let summary = format!("{} syscall(s)", table.len());
            (serde_json::to_value(table)?, summary)
        }
    };
    Ok(checked)
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use uuid::Uuid;

use tracefold_core::validate::{
    parse_application_call, parse_application_response, parse_kernel_run_request,
    parse_kernel_run_result,
};
use tracefold_trace::{
    project, project_application_call, project_kernel_run, APPLICATION_CALL_KIND,
    KERNEL_RUN_KIND,
};

use super::read_json;
use crate::output::format::format_events;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct ProjectArgs {
    /// Request (or call) JSON file
    pub request: PathBuf,

    /// Result (or response) JSON file
    pub result: PathBuf,

    /// Exchange kind. `kernel.run` and `application.call` are validated first
    #[arg(short, long, default_value = KERNEL_RUN_KIND)]
    pub kind: String,

    /// Correlation id (a fresh one is minted when omitted)
    #[arg(long)]
    pub run_id: Option<String>,
}

pub fn run(args: &ProjectArgs, format: OutputFormat) -> Result<()> {
    if args.kind.is_empty() {
        anyhow::bail!("--kind must not be empty");
    }
    let request = read_json(&args.request)?;
    let result = read_json(&args.result)?;
    let run_id = args
        .run_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

    let events = match args.kind.as_str() {
        KERNEL_RUN_KIND => {
            let request = parse_kernel_run_request(&request).context("Invalid kernel request")?;
            let result = parse_kernel_run_result(&result).context("Invalid kernel result")?;
            project_kernel_run(&request, &result, &run_id)?
        }
        APPLICATION_CALL_KIND => {
            let call = parse_application_call(&request).context("Invalid application call")?;
            let response =
                parse_application_response(&result).context("Invalid application response")?;
            project_application_call(&call, &response, &run_id)?
        }
        kind => project(kind, request, result, &run_id),
    };

    println!("{}", format_events(&events, format).trim_end());
    Ok(())
}

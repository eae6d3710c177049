use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use tracefold_core::config::{load_config, load_config_from_path};
use tracefold_core::TracefoldConfig;

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "tracefold",
    version,
    about = "Validate, project and absorb agent trace events"
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: output::OutputFormat,

    /// Settings file (defaults to ./tracefold.json when present)
    #[arg(long, global = true, env = "TRACEFOLD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn config(path: Option<&PathBuf>) -> Result<TracefoldConfig> {
    debug!(?path, "resolving config");
    match path {
        Some(path) => load_config_from_path(path)
            .with_context(|| format!("Failed to load config '{}'", path.display())),
        None => load_config().context("Failed to load tracefold.json"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = config(cli.config.as_ref())?;

    match &cli.command {
        commands::Commands::Validate(args) => commands::validate::run(args, &config, cli.format),
        commands::Commands::Project(args) => commands::project::run(args, cli.format),
        commands::Commands::Context(args) => commands::context::run(args, &config, cli.format),
        commands::Commands::Delta(args) => commands::delta::run(args, &config, cli.format),
        commands::Commands::Absorb(args) => commands::absorb::run(args, &config, cli.format),
        commands::Commands::Schema(args) => commands::schema::run(args),
        commands::Commands::Demo(args) => commands::demo::run(args, &config, cli.format),
    }
}

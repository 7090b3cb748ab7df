//! rostersync: keep a contacts API in step with the company directory.
//!
//! # Usage
//!
//! ```text
//! rostersync [--config PATH] [-v] init [--force]
//! rostersync [--config PATH] [-v] plan [--json]
//! rostersync [--config PATH] [-v] sync [--dry-run] [--create-lists] [--json]
//! rostersync [--config PATH] [-v] lists [--create] [--json]
//! ```

mod commands;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{init::InitArgs, lists::ListsArgs, plan::PlanArgs, sync::SyncArgs};
use rostersync_core::{config, Config};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "rostersync",
    version,
    about = "Sync directory users into a contacts API, keyed by mobile number",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Config file to use instead of ~/.rostersync/config.yaml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence when set).
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Load and return the config; validation is left to the engine.
    pub fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => config::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => config::load().context("failed to load config")?,
        };
        tracing::debug!("config loaded ({} base lists)", config.list_ids.len());
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a commented config template.
    Init(InitArgs),

    /// Show what a sync would change, without writing anything.
    Plan(PlanArgs),

    /// Reconcile and apply (dry-run unless disabled in the config).
    Sync(SyncArgs),

    /// Show contact lists and offices that have none.
    Lists(ListsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    match cli.command {
        Commands::Init(args) => args.run(&cli.global),
        Commands::Plan(args) => args.run(&cli.global),
        Commands::Sync(args) => args.run(&cli.global),
        Commands::Lists(args) => args.run(&cli.global),
    }
}

/// Log to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

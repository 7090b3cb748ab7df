//! `rostersync plan`: a forced dry run.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use rostersync_sync::{pipeline, Overrides};

use crate::{report, GlobalArgs};

/// Arguments for `rostersync plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Emit the full run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let config = global.load_config()?;
        let overrides = Overrides {
            dry_run: Some(true),
            ..Overrides::default()
        };
        let run = pipeline::run_with_config(&config, overrides).context("plan aborted")?;

        if self.json {
            report::print_json(&run)?;
        } else {
            report::print_run(&run);
        }
        Ok(ExitCode::SUCCESS)
    }
}

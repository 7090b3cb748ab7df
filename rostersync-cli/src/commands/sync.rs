//! `rostersync sync`: reconcile and apply.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use rostersync_sync::{pipeline, Overrides};

use crate::{report, GlobalArgs};

/// Arguments for `rostersync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Compute and report without writing, whatever the config says.
    #[arg(long)]
    pub dry_run: bool,

    /// Create a contact list for every office that has none.
    #[arg(long)]
    pub create_lists: bool,

    /// Emit the full run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    /// Exits 1 when any contact or list write failed.
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let config = global.load_config()?;
        let overrides = Overrides {
            dry_run: self.dry_run.then_some(true),
            create_missing_lists: self.create_lists.then_some(true),
        };
        let run = pipeline::run_with_config(&config, overrides).context("sync aborted")?;

        if self.json {
            report::print_json(&run)?;
        } else {
            report::print_run(&run);
        }

        if run.has_failures() {
            Ok(ExitCode::FAILURE)
        } else {
            Ok(ExitCode::SUCCESS)
        }
    }
}

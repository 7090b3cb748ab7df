//! `rostersync lists [--create]`

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use rostersync_sync::pipeline;

use crate::{report, GlobalArgs};

/// Arguments for `rostersync lists`.
#[derive(Args, Debug)]
pub struct ListsArgs {
    /// Create the missing lists. Applies even when the config has `dry_run: true`.
    #[arg(long)]
    pub create: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ListsArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let config = global.load_config()?;
        let lists =
            pipeline::lists_with_config(&config, self.create).context("list inspection aborted")?;

        if self.json {
            report::print_json(&lists)?;
        } else {
            report::print_lists(&lists);
        }

        if lists.has_failures() {
            Ok(ExitCode::FAILURE)
        } else {
            Ok(ExitCode::SUCCESS)
        }
    }
}

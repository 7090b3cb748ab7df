//! `rostersync init [--force]`

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use rostersync_core::config;

use crate::GlobalArgs;

/// Write a config template to `--config` or ~/.rostersync/config.yaml.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Replace an existing config file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let path = match &global.config {
            Some(path) => {
                config::write_template(path, self.force)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                path.clone()
            }
            None => config::init(self.force).context("failed to write config template")?,
        };

        println!("✓ Wrote config template to {}", path.display());
        println!("  Set api_key, list_ids and the directory section, then run `rostersync plan`.");
        Ok(ExitCode::SUCCESS)
    }
}

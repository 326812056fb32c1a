//! Running external programs (used for the Forge installer).

use anyhow::{Context, Result, bail};
use log::debug;
use std::path::Path;
use std::process::Command;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_command_impl(&self, program: &str, args: &[String], cwd: &Path) -> Result<()> {
        debug!("Running {} {:?} in {:?}", program, args, cwd);
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .status()
            .with_context(|| format!("Failed to start {}", program))?;

        if !status.success() {
            bail!("{} exited with {}", program, status);
        }
        Ok(())
    }
}

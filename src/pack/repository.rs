//! Saved pack definitions.
//!
//! After every install or update the definition is written to
//! `<install_path>/gopacked.json`, so later updates and uninstalls can
//! recover the tree that is actually on disk.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::runtime::Runtime;

use super::GoPack;

pub const DEFINITION_FILE: &str = "gopacked.json";

pub struct PackRepository<'a, R: Runtime> {
    runtime: &'a R,
    install_path: PathBuf,
}

impl<'a, R: Runtime> PackRepository<'a, R> {
    pub fn new(runtime: &'a R, install_path: PathBuf) -> Self {
        Self {
            runtime,
            install_path,
        }
    }

    /// Returns: `<install_path>/gopacked.json`
    pub fn definition_path(&self) -> PathBuf {
        self.install_path.join(DEFINITION_FILE)
    }

    pub fn is_installed(&self) -> bool {
        self.runtime.exists(&self.definition_path())
    }

    /// Load the saved definition.
    ///
    /// Returns `None` if nothing has been saved at this install path.
    pub fn load(&self) -> Result<Option<GoPack>> {
        if !self.is_installed() {
            return Ok(None);
        }
        GoPack::load(self.runtime, &self.definition_path()).map(Some)
    }

    /// Load the saved definition, returning an error if there is none.
    pub fn load_required(&self) -> Result<GoPack> {
        self.load()?.ok_or_else(|| {
            anyhow::anyhow!(
                "No goPack is installed at {:?} ({} not found)",
                self.install_path,
                DEFINITION_FILE
            )
        })
    }

    pub fn save(&self, pack: &GoPack) -> Result<()> {
        let path = self.definition_path();

        if !self.runtime.exists(&self.install_path) {
            self.runtime.create_dir_all(&self.install_path)?;
        }

        let content = pack.to_json_pretty()?;
        self.runtime
            .write(&path, content.as_bytes())
            .with_context(|| format!("Failed to save goPack definition to {:?}", path))
    }
}

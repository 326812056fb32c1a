//! Forge installer download and invocation.

use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;

use crate::download::Downloader;
use crate::pack::Side;
use crate::runtime::Runtime;

pub const DEFAULT_FORGE_MAVEN: &str = "https://maven.minecraftforge.net";

/// Where the installer jar is kept while it runs, inside the install path.
pub const INSTALLER_JAR: &str = "forge-installer.jar";

#[derive(Debug, Clone)]
pub struct ForgeLoader {
    maven_url: String,
}

impl Default for ForgeLoader {
    fn default() -> Self {
        Self::new(DEFAULT_FORGE_MAVEN)
    }
}

impl ForgeLoader {
    pub fn new(maven_url: impl Into<String>) -> Self {
        Self {
            maven_url: maven_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn installer_url(&self, version: &str) -> String {
        format!(
            "{}/net/minecraftforge/forge/{v}/forge-{v}-installer.jar",
            self.maven_url,
            v = version
        )
    }

    /// Download the Forge installer for `version` and run it in `install_path`.
    ///
    /// The jar is deleted afterwards whether or not the installer succeeded.
    #[tracing::instrument(skip(self, runtime, downloader))]
    pub async fn install<R: Runtime + 'static, D: Downloader>(
        &self,
        runtime: &R,
        downloader: &D,
        version: &str,
        install_path: &Path,
        side: Side,
    ) -> Result<()> {
        info!("Downloading Forge v{} installer", version);
        let jar = install_path.join(INSTALLER_JAR);
        downloader
            .fetch_to_file(runtime, &self.installer_url(version), &jar)
            .await
            .with_context(|| format!("Failed to download Forge v{} installer", version))?;

        let mut args = vec!["-jar".to_string(), jar.to_string_lossy().into_owned()];
        if side == Side::Server {
            args.push("--installServer".to_string());
        }

        info!("Starting Forge installer...");
        let result = runtime.run_command("java", &args, install_path);

        if let Err(e) = runtime.remove_file(&jar) {
            warn!("Failed to remove {:?}: {:#}", jar, e);
        }

        result.context("Forge installer failed")?;
        info!("Forge installer finished");
        Ok(())
    }
}

//! Pack install, update and uninstall.
//!
//! This use case coordinates:
//! - The tool version gate and confirmation prompts
//! - Launcher profile registration (client side)
//! - Reconciling the launcher version tree and the pack's files
//! - The optional Forge installer
//! - Persisting the definition for later updates

use anyhow::{Context, Result};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use crate::archive::ArchiveExtractor;
use crate::download::Downloader;
use crate::pack::{FileEntry, GoPack, LauncherProfiles, PackRepository, Side, TOOL_VERSION};
use crate::reconcile::{Reconciler, Summary};
use crate::runtime::Runtime;

use super::ForgeLoader;

/// Where and how a pack is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallContext {
    /// Game directory of the pack
    pub install_path: PathBuf,
    /// Launcher directory (holds `launcher_profiles.json` and `versions/`)
    pub minecraft_path: PathBuf,
    pub side: Side,
    /// Answer yes to every confirmation prompt
    pub assume_yes: bool,
}

pub struct PackInstaller<'a, R: Runtime, D: Downloader, E: ArchiveExtractor> {
    runtime: &'a R,
    downloader: &'a D,
    extractor: &'a E,
    forge: ForgeLoader,
}

impl<'a, R: Runtime + 'static, D: Downloader, E: ArchiveExtractor> PackInstaller<'a, R, D, E> {
    pub fn new(runtime: &'a R, downloader: &'a D, extractor: &'a E, forge: ForgeLoader) -> Self {
        Self {
            runtime,
            downloader,
            extractor,
            forge,
        }
    }

    /// Install `pack` from scratch.
    ///
    /// Returns `None` when the user declined to continue.
    #[tracing::instrument(skip(self, pack), fields(pack = %pack.name))]
    pub async fn install(&self, pack: &GoPack, ctx: &InstallContext) -> Result<Option<Summary>> {
        if !self.check_compatibility(pack, ctx)? {
            info!("Installation cancelled");
            return Ok(None);
        }

        let (install_path, minecraft_path) = self.resolve_paths(ctx)?;
        info!(
            "Installing {} v{} by {} to {:?} ({}-side)",
            pack.name, pack.version, pack.author, install_path, ctx.side
        );

        let reconciler = self.reconciler(ctx.side);
        let mut summary = Summary::default();

        if ctx.side == Side::Client {
            self.register_profile(pack, &install_path, &minecraft_path);
            if let Some(mcl_version) = &pack.mcl_version {
                summary += reconciler
                    .install("", mcl_version, &pack.versions_dir(&minecraft_path))
                    .await;
            }
        }
        if let Some(files) = &pack.files {
            summary += reconciler.install("", files, &install_path).await;
        }

        if let Some(forge_version) = &pack.forge_version {
            self.offer_forge(forge_version, &install_path, ctx).await?;
        }

        self.save(pack, &install_path);
        info!("Installed {} v{}: {}", pack.name, pack.version, summary);
        Ok(Some(summary))
    }

    /// Move an installation of `old` to `new`.
    ///
    /// Returns `None` when the user declined to continue.
    #[tracing::instrument(skip(self, old, new), fields(pack = %new.name))]
    pub async fn update(
        &self,
        old: &GoPack,
        new: &GoPack,
        ctx: &InstallContext,
    ) -> Result<Option<Summary>> {
        if !self.check_compatibility(new, ctx)? {
            info!("Update cancelled");
            return Ok(None);
        }

        let (install_path, minecraft_path) = self.resolve_paths(ctx)?;
        info!(
            "Updating {} by {} from v{} to v{} ({}-side)",
            new.name, new.author, old.version, new.version, ctx.side
        );

        let reconciler = self.reconciler(ctx.side);
        let mut summary = Summary::default();

        if ctx.side == Side::Client {
            if old.name != new.name {
                self.unregister_profile(&old.name, &minecraft_path);
            }
            self.register_profile(new, &install_path, &minecraft_path);
            summary += update_tree(
                &reconciler,
                old.mcl_version.as_ref(),
                new.mcl_version.as_ref(),
                &old.versions_dir(&minecraft_path),
                &new.versions_dir(&minecraft_path),
            )
            .await;
        }
        summary += update_tree(
            &reconciler,
            old.files.as_ref(),
            new.files.as_ref(),
            &install_path,
            &install_path,
        )
        .await;

        if let Some(forge_version) = &new.forge_version
            && old.forge_version.as_ref() != Some(forge_version)
        {
            self.offer_forge(forge_version, &install_path, ctx).await?;
        }

        self.save(new, &install_path);
        info!("Updated {} to v{}: {}", new.name, new.version, summary);
        Ok(Some(summary))
    }

    /// Remove everything `pack` installed, including the install directory.
    ///
    /// Returns `None` when the user declined.
    #[tracing::instrument(skip(self, pack), fields(pack = %pack.name))]
    pub async fn uninstall(&self, pack: &GoPack, ctx: &InstallContext) -> Result<Option<Summary>> {
        let prompt = format!(
            "Are you sure you wish to uninstall {} v{}",
            pack.name, pack.version
        );
        if !self.confirm(&prompt, ctx)? {
            info!("Uninstall cancelled");
            return Ok(None);
        }

        let install_path = self.absolute(&ctx.install_path)?;
        let minecraft_path = self.absolute(&ctx.minecraft_path)?;
        info!(
            "Uninstalling {} v{} by {} from {:?} ({}-side)",
            pack.name, pack.version, pack.author, install_path, ctx.side
        );

        let reconciler = self.reconciler(ctx.side);
        let mut summary = Summary::default();

        if ctx.side == Side::Client {
            self.unregister_profile(&pack.name, &minecraft_path);
            if let Some(mcl_version) = &pack.mcl_version {
                summary += reconciler.remove("", mcl_version, &pack.versions_dir(&minecraft_path));
            }
        }
        if let Some(files) = &pack.files {
            summary += reconciler.remove("", files, &install_path);
        }

        if self.runtime.exists(&install_path) {
            info!("Removing {:?}", install_path);
            if let Err(e) = self.runtime.remove_dir_all(&install_path) {
                error!("Failed to remove {:?}: {:#}", install_path, e);
                summary.failed += 1;
            }
        }

        info!("Uninstalled {}: {}", pack.name, summary);
        Ok(Some(summary))
    }

    fn reconciler(&self, side: Side) -> Reconciler<'_, R, D, E> {
        Reconciler::new(self.runtime, self.downloader, self.extractor, side)
    }

    fn confirm(&self, prompt: &str, ctx: &InstallContext) -> Result<bool> {
        if ctx.assume_yes {
            info!("{} [y/N] y", prompt);
            return Ok(true);
        }
        self.runtime.confirm(prompt)
    }

    /// Warn about a tool version outside the pack's supported range and ask
    /// whether to go on anyway.
    fn check_compatibility(&self, pack: &GoPack, ctx: &InstallContext) -> Result<bool> {
        let warnings = pack.compatibility_warnings(TOOL_VERSION);
        if warnings.is_empty() {
            return Ok(true);
        }
        for warning in &warnings {
            warn!("{}", warning);
        }
        self.confirm("Would you like to continue anyway", ctx)
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        self.runtime
            .absolute(path)
            .with_context(|| format!("Failed to resolve {:?}", path))
    }

    /// Absolute install and launcher paths. The install directory is created.
    fn resolve_paths(&self, ctx: &InstallContext) -> Result<(PathBuf, PathBuf)> {
        let install_path = self.absolute(&ctx.install_path)?;
        let minecraft_path = self.absolute(&ctx.minecraft_path)?;
        self.runtime
            .create_dir_all(&install_path)
            .with_context(|| format!("Failed to create install directory {:?}", install_path))?;
        Ok((install_path, minecraft_path))
    }

    fn register_profile(&self, pack: &GoPack, install_path: &Path, minecraft_path: &Path) {
        let profiles = LauncherProfiles::new(self.runtime, minecraft_path.to_path_buf());
        if let Err(e) = profiles.register(pack, install_path) {
            error!("Profile install failed: {:#}", e);
        }
    }

    fn unregister_profile(&self, name: &str, minecraft_path: &Path) {
        let profiles = LauncherProfiles::new(self.runtime, minecraft_path.to_path_buf());
        if let Err(e) = profiles.unregister(name) {
            error!("Profile uninstall failed: {:#}", e);
        }
    }

    async fn offer_forge(
        &self,
        forge_version: &str,
        install_path: &Path,
        ctx: &InstallContext,
    ) -> Result<()> {
        let prompt = format!("Would you like to install Forge v{}", forge_version);
        if !self.confirm(&prompt, ctx)? {
            return Ok(());
        }
        if let Err(e) = self
            .forge
            .install(self.runtime, self.downloader, forge_version, install_path, ctx.side)
            .await
        {
            error!("Forge install failed: {:#}", e);
        }
        Ok(())
    }

    fn save(&self, pack: &GoPack, install_path: &Path) {
        let repository = PackRepository::new(self.runtime, install_path.to_path_buf());
        info!("Saving goPack definition to {:?}", repository.definition_path());
        if let Err(e) = repository.save(pack) {
            error!("goPack definition save failed: {:#}", e);
        }
    }
}

/// Reconcile an optional subtree of the old definition with the new one.
async fn update_tree<R: Runtime + 'static, D: Downloader, E: ArchiveExtractor>(
    reconciler: &Reconciler<'_, R, D, E>,
    old: Option<&FileEntry>,
    new: Option<&FileEntry>,
    old_path: &Path,
    new_path: &Path,
) -> Summary {
    match (old, new) {
        (Some(old), Some(new)) => reconciler.update("", old, new, old_path, new_path).await,
        (None, Some(new)) => reconciler.install("", new, new_path).await,
        (Some(old), None) => reconciler.remove("", old, old_path),
        (None, None) => Summary::default(),
    }
}

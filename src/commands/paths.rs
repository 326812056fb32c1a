use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::pack::Side;
use crate::runtime::Runtime;

/// Get the default launcher directory for `side`.
///
/// Servers outside Windows default to the home directory.
#[tracing::instrument(skip(runtime))]
pub fn default_minecraft_path<R: Runtime>(runtime: &R, side: Side) -> Result<PathBuf> {
    if side == Side::Server && !cfg!(windows) {
        return runtime.home_dir().context("Could not find home directory");
    }
    launcher_dir(runtime)
}

#[cfg(target_os = "windows")]
fn launcher_dir<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let app_data = runtime
        .data_dir()
        .context("Could not find the AppData directory")?;
    Ok(app_data.join(".minecraft"))
}

#[cfg(target_os = "macos")]
fn launcher_dir<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let app_support = runtime
        .data_dir()
        .context("Could not find the Application Support directory")?;
    Ok(app_support.join("minecraft"))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn launcher_dir<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home_dir = runtime
        .home_dir()
        .context("Could not find home directory")?;
    Ok(home_dir.join(".minecraft"))
}

/// Where packs are installed when no path is given.
///
/// Returns: `<minecraft_path>/gopacked/<simplename>`
pub fn default_install_path(minecraft_path: &Path, simplename: &str) -> PathBuf {
    minecraft_path.join("gopacked").join(simplename)
}

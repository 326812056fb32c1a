use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};

use super::{FileEntry, Version};

/// Version of this tool, checked against a pack's supported range.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A modpack definition, as fetched from its update URL or saved next to
/// an installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GoPack {
    pub name: String,
    pub simplename: String,
    #[serde(default)]
    pub update_url: String,
    #[serde(default)]
    pub author: String,
    pub version: Version,
    /// Forge version the pack runs on, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forge_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gopacked_version_minimum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gopacked_version_maximum: Option<String>,
    /// Extra keys merged into the launcher profile.
    #[serde(default)]
    pub profile_settings: Map<String, Value>,
    /// Launcher version definition, installed under `versions/<simplename>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcl_version: Option<FileEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<FileEntry>,
}

impl GoPack {
    /// Parse and validate a definition document.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let pack: GoPack =
            serde_json::from_slice(data).context("Failed to parse goPack definition")?;
        pack.validate()?;
        Ok(pack)
    }

    #[tracing::instrument(skip(runtime))]
    pub fn load<R: crate::runtime::Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        Self::from_slice(content.as_bytes())
            .with_context(|| format!("Invalid goPack definition at {:?}", path))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize goPack definition")
    }

    /// `simplename` names directories, so it has to be one plain path component.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("goPack definition has an empty name");
        }

        let mut components = Path::new(&self.simplename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None)
                if !self.simplename.contains(['/', '\\']) => {}
            _ => bail!(
                "goPack simplename {:?} must be a single non-empty path component",
                self.simplename
            ),
        }
        Ok(())
    }

    /// Directory of the launcher version definition inside `minecraft_path`.
    pub fn versions_dir(&self, minecraft_path: &Path) -> PathBuf {
        minecraft_path.join("versions").join(&self.simplename)
    }

    /// Problems with running this pack on `tool_version`.
    /// An empty list means the tool is within the supported range.
    pub fn compatibility_warnings(&self, tool_version: &str) -> Vec<String> {
        let mut warnings = Vec::new();
        let tool = match tool_version.parse::<Version>() {
            Ok(tool) => tool,
            Err(e) => {
                warnings.push(format!("Failed to parse goPacked version: {}", e));
                return warnings;
            }
        };

        if let Some(max) = &self.gopacked_version_maximum {
            match max.parse::<Version>() {
                Ok(max) if tool.is_greater(&max) => warnings.push(format!(
                    "goPacked v{} is newer than the maximum v{} supported by {}",
                    tool, max, self.name
                )),
                Ok(_) => {}
                Err(e) => warnings.push(format!(
                    "Failed to parse maximum supported goPacked version: {}",
                    e
                )),
            }
        }

        if let Some(min) = &self.gopacked_version_minimum {
            match min.parse::<Version>() {
                Ok(min) if tool.is_smaller(&min) => warnings.push(format!(
                    "goPacked v{} is older than the minimum v{} required by {}",
                    tool, min, self.name
                )),
                Ok(_) => {}
                Err(e) => warnings.push(format!(
                    "Failed to parse minimum supported goPacked version: {}",
                    e
                )),
            }
        }

        warnings
    }
}

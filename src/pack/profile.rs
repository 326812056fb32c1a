//! Launcher profile registration in `launcher_profiles.json`.
//!
//! The document belongs to the launcher, so it is edited as untyped JSON and
//! every key this tool does not own is preserved.

use anyhow::{Context, Result, anyhow};
use log::info;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

use super::GoPack;

pub const PROFILES_FILE: &str = "launcher_profiles.json";

pub struct LauncherProfiles<'a, R: Runtime> {
    runtime: &'a R,
    minecraft_path: PathBuf,
}

impl<'a, R: Runtime> LauncherProfiles<'a, R> {
    pub fn new(runtime: &'a R, minecraft_path: PathBuf) -> Self {
        Self {
            runtime,
            minecraft_path,
        }
    }

    /// Returns: `<minecraft_path>/launcher_profiles.json`
    pub fn path(&self) -> PathBuf {
        self.minecraft_path.join(PROFILES_FILE)
    }

    /// Add or refresh the profile named after `pack`, playing from `game_dir`.
    #[tracing::instrument(skip(self, pack), fields(pack = %pack.name))]
    pub fn register(&self, pack: &GoPack, game_dir: &Path) -> Result<()> {
        let mut document = self.read()?;
        info!("Adding {} to {}", pack.name, PROFILES_FILE);

        let profiles = profiles_mut(&mut document)?;
        let slot = profiles.entry(pack.name.clone()).or_insert(Value::Null);
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let profile = slot
            .as_object_mut()
            .context("Launcher profile is not a JSON object")?;

        profile.insert("name".into(), Value::String(pack.name.clone()));
        profile.insert(
            "gameDir".into(),
            Value::String(game_dir.to_string_lossy().into_owned()),
        );
        profile.insert(
            "lastVersionId".into(),
            Value::String(pack.simplename.clone()),
        );
        for (key, value) in &pack.profile_settings {
            profile.insert(key.clone(), value.clone());
        }

        self.write(&document)
    }

    /// Drop the profile called `name`. A missing profile is not an error.
    #[tracing::instrument(skip(self))]
    pub fn unregister(&self, name: &str) -> Result<()> {
        let mut document = self.read()?;
        info!("Removing {} from {}", name, PROFILES_FILE);

        if profiles_mut(&mut document)?.remove(name).is_none() {
            log::debug!("No launcher profile named {:?}", name);
        }

        self.write(&document)
    }

    fn read(&self) -> Result<Value> {
        let path = self.path();
        let content = self.runtime.read_to_string(&path)?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    fn write(&self, document: &Value) -> Result<()> {
        let path = self.path();
        let content = serde_json::to_string_pretty(document)?;
        self.runtime
            .write(&path, content.as_bytes())
            .with_context(|| format!("Failed to save {:?}", path))
    }
}

fn profiles_mut(document: &mut Value) -> Result<&mut Map<String, Value>> {
    let root = document
        .as_object_mut()
        .ok_or_else(|| anyhow!("{} is not a JSON object", PROFILES_FILE))?;
    root.entry("profiles")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| anyhow!("\"profiles\" in {} is not a JSON object", PROFILES_FILE))
}

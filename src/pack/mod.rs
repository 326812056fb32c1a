//! Pack definitions and the state they leave on disk.
//!
//! This module provides the modpack manifest model (the [`GoPack`] record
//! and its [`FileEntry`] trees), version handling, the saved copy of an
//! installed definition, and the launcher profile registration.

mod definition;
mod entry;
mod profile;
mod repository;
mod version;

pub use definition::{GoPack, TOOL_VERSION};
pub use entry::{DirectorySpec, FileEntry, FileSpec, NO_NESTING, Side};
pub use profile::{LauncherProfiles, PROFILES_FILE};
pub use repository::{DEFINITION_FILE, PackRepository};
pub use version::{ParseVersionError, Version};

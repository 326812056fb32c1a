//! Application layer - use cases that coordinate the pack model, the
//! reconciler and the launcher.
//!
//! This layer sits between the CLI flows in `commands` and the domain
//! services, and owns everything that happens once the definitions are known.

mod installer;
mod loader;

pub use installer::{InstallContext, PackInstaller};
pub use loader::{DEFAULT_FORGE_MAVEN, ForgeLoader, INSTALLER_JAR};

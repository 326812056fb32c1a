//! Well-known directory lookups.

use std::path::PathBuf;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn home_dir_impl(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    /// Roaming application data on Windows, `~/Library/Application Support`
    /// on macOS, XDG data home elsewhere.
    #[tracing::instrument(skip(self))]
    pub(crate) fn data_dir_impl(&self) -> Option<PathBuf> {
        dirs::data_dir()
    }
}

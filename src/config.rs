//! Configuration for a download run.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for scanning and downloading a share.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Directory the remote tree is mirrored into.
    pub save_dir: PathBuf,
    /// Whole-request timeout applied to every HTTP call. `None` means
    /// requests may block indefinitely, matching the upstream behavior.
    pub timeout: Option<Duration>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("."),
            timeout: None,
        }
    }
}

impl DownloadConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the save directory.
    #[must_use]
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

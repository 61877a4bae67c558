//! Project layout model: where the configuration inputs live and where the
//! compiled compose document is written.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;

/// Resolved locations of every file the generator reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPaths {
    /// Project root directory.
    pub root: PathBuf,
    /// Application configuration file.
    pub app_config: PathBuf,
    /// Services configuration file (optional on disk).
    pub services_config: PathBuf,
    /// Composer lock file.
    pub composer_lock: PathBuf,
    /// Output path of the compose document.
    pub compose_file: PathBuf,
}

impl ProjectPaths {
    /// Builds the default layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            app_config: root.join(constants::APP_CONFIG_FILE),
            services_config: root.join(constants::SERVICES_CONFIG_FILE),
            composer_lock: root.join(constants::COMPOSER_LOCK_FILE),
            compose_file: root.join(constants::DEFAULT_COMPOSE_FILE),
            root,
        }
    }

    /// Overrides the compose output path. Relative paths resolve against the root.
    #[must_use]
    pub fn with_compose_file(mut self, path: &Path) -> Self {
        self.compose_file = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        self
    }
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self::new(".")
    }
}

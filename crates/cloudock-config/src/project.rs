//! Aggregated project configuration.
//!
//! Precedence for every service version: explicit override, then the
//! project files, then the platform defaults applied by the compiler.

use std::path::Path;

use cloudock_common::config::ProjectPaths;
use cloudock_common::constants::{COMPOSER_CACHE_DIR, LEGACY_COMPOSER_CACHE};
use cloudock_common::error::Result;
use cloudock_common::types::{ApplicationVersion, ServiceName};
use cloudock_compose::request::{CompileRequest, ServiceRequest};

use crate::app::AppConfig;
use crate::{composer, services};

/// Values supplied on the command line that beat the project files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Service versions; absent entries fall through to the files.
    pub services: ServiceRequest,
    /// Application version used instead of the one in `composer.lock`.
    pub application: Option<String>,
}

/// Everything read from a project checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Application version.
    pub application: ApplicationVersion,
    /// Application config, when the project has one.
    pub app: Option<AppConfig>,
    /// Merged service versions.
    pub services: ServiceRequest,
    /// Host-side composer cache mount source.
    pub composer_cache: String,
}

impl ProjectConfig {
    /// Loads the project at `paths`, applying `overrides`.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be read or parsed, or no
    /// application version is available.
    pub fn load(paths: &ProjectPaths, overrides: &Overrides) -> Result<Self> {
        let application = match overrides.application.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => ApplicationVersion::parse(raw)?,
            _ => composer::load(&paths.composer_lock)?,
        };

        let app = if paths.app_config.exists() {
            Some(AppConfig::load(&paths.app_config)?)
        } else {
            tracing::warn!(
                path = %paths.app_config.display(),
                "application config not found; using platform defaults"
            );
            None
        };

        let mut from_files = services::load(&paths.services_config)?;
        if let Some(app) = &app {
            from_files.set(ServiceName::Php, app.php_version.as_str());
        }
        let services = from_files.merged_with(&overrides.services);

        let home = std::env::var_os("HOME");
        let composer_cache = composer_cache_dir(home.as_deref().map(Path::new));

        tracing::info!(
            root = %paths.root.display(),
            application = %application,
            services = services.entries().len(),
            "project configuration loaded"
        );
        Ok(Self {
            application,
            app,
            services,
            composer_cache,
        })
    }

    /// Builds the compiler input.
    #[must_use]
    pub fn to_compile_request(&self) -> CompileRequest {
        let mut request = CompileRequest::new(self.application.clone());
        request.services = self.services.clone();
        request.composer_cache.clone_from(&self.composer_cache);
        if let Some(app) = &self.app {
            request.extensions = app.extensions.clone();
            request.crons = app.crons.clone();
        }
        request
    }
}

/// Chooses the composer cache mount source: the XDG location when it exists
/// under `home`, the legacy location otherwise.
#[must_use]
pub fn composer_cache_dir(home: Option<&Path>) -> String {
    match home {
        Some(home) if home.join(COMPOSER_CACHE_DIR).exists() => {
            format!("~/{COMPOSER_CACHE_DIR}")
        }
        _ => LEGACY_COMPOSER_CACHE.to_string(),
    }
}

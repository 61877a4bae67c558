//! The application config: declared runtime, PHP extensions, and crons.

use std::path::Path;

use cloudock_common::error::{CloudockError, Result};
use cloudock_compose::cron::CronJob;
use cloudock_compose::extension::ExtensionConfig;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::fs;

/// Runtime type accepted in the `type` key.
const RUNTIME_TYPE: &str = "php";

/// Release-candidate suffix dropped from the declared runtime version.
const RC_SUFFIX: &str = "-rc";

#[derive(Debug, Deserialize)]
struct RawAppConfig {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    runtime: RawRuntime,
    #[serde(default)]
    crons: IndexMap<String, RawCron>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRuntime {
    #[serde(default)]
    extensions: Vec<ExtensionEntry>,
    #[serde(default)]
    disabled_extensions: Vec<String>,
}

/// Extensions are listed either by name or as a mapping with a `name` key
/// (and extension-specific settings that are ignored here).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExtensionEntry {
    Name(String),
    Detailed { name: String },
}

impl ExtensionEntry {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Detailed { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCron {
    spec: String,
    cmd: String,
}

/// Values read from the application config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Declared runtime version, e.g. `7.2`.
    pub php_version: String,
    /// Enabled and disabled extensions.
    pub extensions: ExtensionConfig,
    /// Cron jobs, in file order.
    pub crons: Vec<CronJob>,
}

impl AppConfig {
    /// Reads and parses the application config at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or declares a
    /// runtime other than PHP.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read(path)?;
        let config = Self::parse(&content, path)?;
        tracing::debug!(
            path = %path.display(),
            php = %config.php_version,
            crons = config.crons.len(),
            "application config loaded"
        );
        Ok(config)
    }

    /// Parses application config text; `origin` is used in error messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the runtime type is not
    /// supported.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let raw: RawAppConfig = fs::parse_yaml(content, origin)?;
        let php_version = runtime_version(&raw.kind)?;

        let extensions = ExtensionConfig {
            enabled: raw
                .runtime
                .extensions
                .into_iter()
                .map(ExtensionEntry::into_name)
                .collect(),
            disabled: raw.runtime.disabled_extensions,
        };
        let crons = raw
            .crons
            .into_iter()
            .map(|(name, cron)| CronJob {
                name,
                spec: cron.spec,
                cmd: cron.cmd,
            })
            .collect();

        Ok(Self {
            php_version,
            extensions,
            crons,
        })
    }
}

/// Extracts the runtime version from a `php:<version>` type declaration.
fn runtime_version(kind: &str) -> Result<String> {
    let (runtime, version) = kind.split_once(':').unwrap_or((kind, ""));
    let runtime = runtime.trim();
    if runtime != RUNTIME_TYPE {
        return Err(CloudockError::Config {
            message: format!("Type \"{runtime}\" is not supported"),
        });
    }
    let version = version.trim();
    let version = version.strip_suffix(RC_SUFFIX).unwrap_or(version);
    if version.is_empty() {
        return Err(CloudockError::Config {
            message: format!("Type \"{kind}\" does not declare a version"),
        });
    }
    Ok(version.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<AppConfig> {
        AppConfig::parse(content, Path::new(".magento.app.yaml"))
    }

    #[test]
    fn reads_runtime_version() {
        let config = parse("type: php:7.1\n").expect("parse");
        assert_eq!(config.php_version, "7.1");
        assert!(config.extensions.enabled.is_empty());
        assert!(config.crons.is_empty());
    }

    #[test]
    fn release_candidate_suffix_is_dropped() {
        assert_eq!(runtime_version("php:7.3-rc").expect("version"), "7.3");
    }

    #[test]
    fn non_php_type_is_rejected() {
        let err = runtime_version("node:10").expect_err("must fail");
        assert_eq!(
            err.to_string(),
            "invalid configuration: Type \"node\" is not supported"
        );
    }

    #[test]
    fn missing_version_is_rejected() {
        assert!(runtime_version("php").is_err());
        assert!(runtime_version("php:").is_err());
    }

    #[test]
    fn extensions_accept_both_forms() {
        let config = parse(
            r"
type: php:7.2
runtime:
  extensions:
    - xsl
    - name: newrelic
      configuration:
        license: abc
  disabled_extensions:
    - sockets
",
        )
        .expect("parse");
        assert_eq!(config.extensions.enabled, vec!["xsl", "newrelic"]);
        assert_eq!(config.extensions.disabled, vec!["sockets"]);
    }

    #[test]
    fn crons_keep_file_order() {
        let config = parse(
            r"
type: php:7.2
crons:
  magento:
    spec: '* * * * *'
    cmd: 'php bin/magento cron:run'
  cleanup:
    spec: '0 0 * * *'
    cmd: 'rm -rf var/tmp'
",
        )
        .expect("parse");
        let names: Vec<&str> = config.crons.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["magento", "cleanup"]);
        assert_eq!(config.crons[0].spec, "* * * * *");
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = parse("type: [php").expect_err("must fail");
        assert!(matches!(err, CloudockError::Yaml { .. }));
    }
}

//! PHP extension catalog and the effective extension set.
//!
//! The effective set is `(defaults ∪ enabled) − disabled`. Every member must
//! be in the catalog and its supported runtime range must contain the
//! resolved runtime version.

use indexmap::{IndexMap, IndexSet};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::{ConfigurationError, Result};

/// Extensions installed when the application config does not say otherwise.
pub const DEFAULT_PHP_EXTENSIONS: &[&str] = &[
    "bcmath",
    "bz2",
    "calendar",
    "exif",
    "gd",
    "gettext",
    "intl",
    "mysqli",
    "pcntl",
    "pdo_mysql",
    "soap",
    "sockets",
    "sysvmsg",
    "sysvsem",
    "sysvshm",
    "opcache",
    "zip",
];

/// Known extensions and the runtime versions they are available for.
pub const AVAILABLE_PHP_EXTENSIONS: &[(&str, &str)] = &[
    ("bcmath", "7.*"),
    ("bz2", "7.*"),
    ("calendar", "7.*"),
    ("exif", "7.*"),
    ("gd", "7.*"),
    ("geoip", "7.*"),
    ("gettext", "7.*"),
    ("gmp", "7.*"),
    ("igbinary", "7.*"),
    ("imagick", "7.*"),
    ("imap", "7.*"),
    ("intl", "7.*"),
    ("ldap", "7.*"),
    ("mailparse", "7.*"),
    ("mcrypt", "7.0.* | 7.1.*"),
    ("msgpack", "7.*"),
    ("mysqli", "7.*"),
    ("oauth", "7.*"),
    ("opcache", "7.*"),
    ("pdo_mysql", "7.*"),
    ("propro", "7.*"),
    ("pspell", "7.*"),
    ("raphf", "7.*"),
    ("recode", "7.*"),
    ("redis", "7.*"),
    ("shmop", "7.*"),
    ("soap", "7.*"),
    ("sockets", "7.*"),
    ("sodium", "7.*"),
    ("ssh2", "7.*"),
    ("sysvmsg", "7.*"),
    ("sysvsem", "7.*"),
    ("sysvshm", "7.*"),
    ("tidy", "7.*"),
    ("xdebug", "7.*"),
    ("xmlrpc", "7.*"),
    ("xsl", "7.*"),
    ("yaml", "7.*"),
    ("zip", "7.*"),
    ("pcntl", "7.*"),
];

/// Extension lists from the application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Extensions enabled on top of the defaults.
    #[serde(default)]
    pub enabled: Vec<String>,
    /// Extensions removed from the final set.
    #[serde(default)]
    pub disabled: Vec<String>,
}

/// The effective, validated extension set in installation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhpExtensionSet(IndexSet<String>);

impl PhpExtensionSet {
    /// Returns whether `name` is in the set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Iterates the extensions in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Space-separated list, as consumed by the runtime image.
    #[must_use]
    pub fn to_env_value(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }
}

/// Catalog of known extensions with their supported runtime ranges.
#[derive(Debug, Clone)]
pub struct ExtensionCatalog {
    defaults: Vec<String>,
    available: IndexMap<String, Constraint>,
}

impl ExtensionCatalog {
    /// Builds a catalog from default names and `(name, runtime range)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if a range fails to parse.
    pub fn new(defaults: &[&str], available: &[(&str, &str)]) -> Result<Self> {
        let available = available
            .iter()
            .map(|(name, range)| Ok(((*name).to_string(), Constraint::parse(range)?)))
            .collect::<Result<IndexMap<_, _>>>()?;
        Ok(Self {
            defaults: defaults.iter().map(ToString::to_string).collect(),
            available,
        })
    }

    /// Builds the catalog shipped with cloudock.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in range fails to parse.
    pub fn builtin() -> Result<Self> {
        Self::new(DEFAULT_PHP_EXTENSIONS, AVAILABLE_PHP_EXTENSIONS)
    }

    /// Computes and validates the effective extension set for runtime `php`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnsupportedExtension`] for the first
    /// unknown member, or [`ConfigurationError::ExtensionVersionMismatch`]
    /// for the first member unavailable for `php`.
    pub fn resolve(&self, php: &Version, config: &ExtensionConfig) -> Result<PhpExtensionSet> {
        let mut set: IndexSet<String> = self
            .defaults
            .iter()
            .chain(config.enabled.iter())
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        set.retain(|name| !config.disabled.iter().any(|d| d.trim() == name));

        for name in &set {
            let Some(range) = self.available.get(name) else {
                return Err(ConfigurationError::UnsupportedExtension { name: name.clone() });
            };
            if !range.matches(php) {
                return Err(ConfigurationError::ExtensionVersionMismatch {
                    name: name.clone(),
                    php: php.to_string(),
                    constraint: range.to_string(),
                });
            }
        }

        tracing::debug!(count = set.len(), php = %php, "extension set resolved");
        Ok(PhpExtensionSet(set))
    }
}

//! Version compatibility validation.
//!
//! Checks every requested `(service, version)` pair against the constraint
//! table for the application version. Problems are collected, never raised
//! one at a time: the caller receives the full list in request order.

use std::fmt;

use cloudock_common::types::ApplicationVersion;

use crate::table::{ConstraintTable, GapPolicy};

/// One compatibility problem for one requested service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The service has no entry in the constraint table at all.
    UnsupportedService {
        /// Requested service name.
        service: String,
        /// Application version.
        application: String,
    },
    /// The requested version does not satisfy the matched rule.
    VersionMismatch {
        /// Requested service name.
        service: String,
        /// Application version.
        application: String,
        /// Requested service version.
        requested: String,
        /// Allowed range of the matched rule.
        constraint: String,
    },
    /// No rule covers the application version and the table is strict.
    MissingRule {
        /// Requested service name.
        service: String,
        /// Application version.
        application: String,
    },
}

impl ValidationError {
    /// Returns the service the error is about.
    #[must_use]
    pub fn service(&self) -> &str {
        match self {
            Self::UnsupportedService { service, .. }
            | Self::VersionMismatch { service, .. }
            | Self::MissingRule { service, .. } => service,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedService {
                service,
                application,
            } => write!(
                f,
                "Service \"{service}\" is not supported for application \"{application}\""
            ),
            Self::VersionMismatch {
                service,
                application,
                requested,
                constraint,
            } => write!(
                f,
                "Application \"{application}\" does not support version \"{requested}\" for service \"{service}\". \
                 Service version should satisfy \"{constraint}\" constraint."
            ),
            Self::MissingRule {
                service,
                application,
            } => write!(
                f,
                "Application \"{application}\" has no compatibility rule for service \"{service}\""
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates requested service versions against a [`ConstraintTable`].
#[derive(Debug, Clone)]
pub struct Validator {
    table: ConstraintTable,
}

impl Validator {
    /// Creates a validator over `table`.
    #[must_use]
    pub const fn new(table: ConstraintTable) -> Self {
        Self { table }
    }

    /// Creates a validator over the built-in table.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in table fails to load.
    pub fn builtin() -> crate::error::Result<Self> {
        Ok(Self::new(ConstraintTable::builtin()?))
    }

    /// Returns the underlying table.
    #[must_use]
    pub const fn table(&self) -> &ConstraintTable {
        &self.table
    }

    /// Validates `requested` pairs in iteration order.
    ///
    /// Entries with an empty version are skipped. A version that cannot be
    /// parsed counts as not satisfying the matched range. An empty result
    /// means the request is fully compatible.
    pub fn validate<'a, I>(
        &self,
        application: &ApplicationVersion,
        requested: I,
    ) -> Vec<ValidationError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut errors = Vec::new();

        for (service, version) in requested {
            let version = version.trim();
            if version.is_empty() {
                continue;
            }
            if let Some(error) = self.check(application, service, version) {
                tracing::debug!(service, version, %error, "service version rejected");
                errors.push(error);
            }
        }

        tracing::info!(
            application = %application,
            errors = errors.len(),
            "service versions validated"
        );
        errors
    }

    fn check(
        &self,
        application: &ApplicationVersion,
        service: &str,
        version: &str,
    ) -> Option<ValidationError> {
        if !self.table.knows(service) {
            return Some(ValidationError::UnsupportedService {
                service: service.to_string(),
                application: application.to_string(),
            });
        }

        let Some(rule) = self.table.rule_for(service, application.version()) else {
            return match self.table.gap_policy() {
                GapPolicy::Permissive => None,
                GapPolicy::Strict => Some(ValidationError::MissingRule {
                    service: service.to_string(),
                    application: application.to_string(),
                }),
            };
        };

        match rule.allowed.allows(version) {
            Ok(true) => None,
            Ok(false) | Err(_) => Some(ValidationError::VersionMismatch {
                service: service.to_string(),
                application: application.to_string(),
                requested: version.to_string(),
                constraint: rule.allowed.to_string(),
            }),
        }
    }
}

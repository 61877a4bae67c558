//! Fatal configuration errors raised by the compiler core.

use cloudock_common::error::CloudockError;
use thiserror::Error;

use crate::validator::ValidationError;

/// Umbrella error for everything that prevents a topology from being built.
///
/// Compilation is all-or-nothing: any of these aborts the compile and no
/// partial topology is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The requested service versions are incompatible with the application.
    #[error("{}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// An enabled extension is not in the extension catalog.
    #[error("PHP extension \"{name}\" is not supported")]
    UnsupportedExtension {
        /// Extension name.
        name: String,
    },

    /// A known extension is not available for the resolved runtime version.
    #[error(
        "PHP extension \"{name}\" is not available for PHP version \"{php}\" (requires \"{constraint}\")"
    )]
    ExtensionVersionMismatch {
        /// Extension name.
        name: String,
        /// Resolved runtime version.
        php: String,
        /// Supported runtime range of the extension.
        constraint: String,
    },

    /// Service options could not be interpreted.
    #[error("invalid service options: {message}")]
    InvalidOptions {
        /// Description of the problem.
        message: String,
    },

    /// A version string could not be parsed.
    #[error("invalid version \"{value}\"")]
    InvalidVersion {
        /// The offending input.
        value: String,
    },

    /// A constraint expression could not be parsed.
    #[error("invalid version constraint \"{expression}\": {message}")]
    InvalidConstraint {
        /// The offending expression.
        expression: String,
        /// Parser diagnostic.
        message: String,
    },

    /// A service depends on a service that is not part of the topology.
    #[error("service \"{service}\" depends on undefined service \"{dependency}\"")]
    UnknownDependency {
        /// Dependent service.
        service: String,
        /// Missing dependency.
        dependency: String,
    },

    /// The `depends_on` edges form a cycle.
    #[error("cyclic dependency detected in service topology")]
    DependencyCycle,
}

impl ConfigurationError {
    /// Returns the aggregated validation errors, if this is a validation failure.
    #[must_use]
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<ConfigurationError> for CloudockError {
    fn from(err: ConfigurationError) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

/// Convenience alias for results of the compiler core.
pub type Result<T> = std::result::Result<T, ConfigurationError>;

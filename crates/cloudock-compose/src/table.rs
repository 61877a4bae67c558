//! The version constraint table.
//!
//! An ordered list of rules `(service, application range, allowed range)`.
//! For a given service and application version the first rule whose
//! application range matches applies; table order is the matching contract.

use semver::Version;

use crate::constraint::Constraint;
use crate::error::Result;

/// Built-in compatibility rules: `(service, application range, allowed service range)`.
pub const BUILTIN_RULES: &[(&str, &str, &str)] = &[
    ("php", "<2.2.0", "~7.0.0"),
    ("php", ">=2.2.0 <2.3.0", "~7.0.0 || ~7.1.0"),
    ("php", ">=2.3.0 <2.3.3", "~7.1.0 || ~7.2.0"),
    ("php", ">=2.3.3", "~7.1.0 || ~7.2.0 || ~7.3.0"),
    ("mysql", "*", "~10.0.0 || ~10.1.0 || ~10.2.0"),
    ("nginx", "*", "~1.9.0"),
    ("varnish", "*", "~4.0 || ~5.0 || ~6.2"),
    ("redis", "*", "~3.0.0 || ~3.2.0 || ~4.0.0 || ~5.0.0"),
    ("elasticsearch", "<2.2.0", "~1.7.0 || ~2.4.0"),
    (
        "elasticsearch",
        ">=2.2.0 <2.2.8 || 2.3.0",
        "~1.7.0 || ~2.4.0 || ~5.2.0",
    ),
    (
        "elasticsearch",
        ">=2.2.8 <2.3.0 || >=2.3.1",
        "~1.7.0 || ~2.4.0 || ~5.2.0 || ~6.5.0",
    ),
    ("rabbitmq", "<2.3.0", "~3.5.0"),
    ("rabbitmq", ">=2.3.0", "~3.5.0 || ~3.7.0"),
    ("node", "*", "~6.0 || ~8.0 || ~10.0 || ~11.0"),
];

/// What to do when a known service has no rule covering the application version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GapPolicy {
    /// Treat the gap as "no constraint": any version passes.
    #[default]
    Permissive,
    /// Report the gap as a validation error.
    Strict,
}

/// One compatibility rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    /// Service the rule applies to.
    pub service: String,
    /// Application versions the rule covers.
    pub application: Constraint,
    /// Service versions allowed under the rule.
    pub allowed: Constraint,
}

/// Ordered rule list with first-match lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintTable {
    rules: Vec<VersionConstraint>,
    gap_policy: GapPolicy,
}

impl ConstraintTable {
    /// Builds a table from `(service, application range, allowed range)` triples.
    ///
    /// # Errors
    ///
    /// Returns an error if any range expression fails to parse.
    pub fn from_rules(rules: &[(&str, &str, &str)]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|(service, application, allowed)| {
                Ok(VersionConstraint {
                    service: (*service).to_string(),
                    application: Constraint::parse(application)?,
                    allowed: Constraint::parse(allowed)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(rules = rules.len(), "constraint table loaded");
        Ok(Self {
            rules,
            gap_policy: GapPolicy::default(),
        })
    }

    /// Builds the table shipped with cloudock.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in expression fails to parse.
    pub fn builtin() -> Result<Self> {
        Self::from_rules(BUILTIN_RULES)
    }

    /// Sets the policy for application versions no rule covers.
    #[must_use]
    pub const fn with_gap_policy(mut self, policy: GapPolicy) -> Self {
        self.gap_policy = policy;
        self
    }

    /// Returns the configured gap policy.
    #[must_use]
    pub const fn gap_policy(&self) -> GapPolicy {
        self.gap_policy
    }

    /// Returns whether the table has any rule for `service`.
    #[must_use]
    pub fn knows(&self, service: &str) -> bool {
        self.rules.iter().any(|r| r.service == service)
    }

    /// Returns the first rule for `service` whose application range contains `application`.
    #[must_use]
    pub fn rule_for(&self, service: &str, application: &Version) -> Option<&VersionConstraint> {
        self.rules
            .iter()
            .filter(|r| r.service == service)
            .find(|r| r.application.matches(application))
    }

    /// Returns every rule in table order.
    #[must_use]
    pub fn rules(&self) -> &[VersionConstraint] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ConstraintTable {
        ConstraintTable::builtin().expect("builtin table")
    }

    #[test]
    fn builtin_rules_all_parse() {
        assert_eq!(table().rules().len(), BUILTIN_RULES.len());
    }

    #[test]
    fn lookup_uses_first_matching_rule() {
        let rules = [
            ("redis", ">=2.0", "~5.0.0"),
            ("redis", "*", "~3.0.0"),
        ];
        let table = ConstraintTable::from_rules(&rules).expect("table");
        let rule = table
            .rule_for("redis", &Version::new(2, 3, 0))
            .expect("rule");
        assert_eq!(rule.allowed.as_str(), "~5.0.0");
        let rule = table
            .rule_for("redis", &Version::new(1, 0, 0))
            .expect("rule");
        assert_eq!(rule.allowed.as_str(), "~3.0.0");
    }

    #[test]
    fn elasticsearch_bracket_for_2_2_6() {
        let table = table();
        let rule = table
            .rule_for("elasticsearch", &Version::new(2, 2, 6))
            .expect("rule");
        assert_eq!(rule.allowed.as_str(), "~1.7.0 || ~2.4.0 || ~5.2.0");
    }

    #[test]
    fn elasticsearch_2_3_0_is_an_explicit_exception() {
        let table = table();
        let rule = table
            .rule_for("elasticsearch", &Version::new(2, 3, 0))
            .expect("rule");
        assert_eq!(rule.allowed.as_str(), "~1.7.0 || ~2.4.0 || ~5.2.0");
    }

    #[test]
    fn unknown_service_is_not_known() {
        let table = table();
        assert!(table.knows("php"));
        assert!(!table.knows("nonexistent"));
        assert!(table.rule_for("nonexistent", &Version::new(2, 3, 0)).is_none());
    }

    #[test]
    fn gap_returns_no_rule() {
        let rules = [("php", ">=2.3.0", "~7.2.0")];
        let table = ConstraintTable::from_rules(&rules).expect("table");
        assert!(table.knows("php"));
        assert!(table.rule_for("php", &Version::new(2, 1, 0)).is_none());
    }

    #[test]
    fn invalid_rule_fails_to_load() {
        let rules = [("php", ">=", "~7.2.0")];
        assert!(ConstraintTable::from_rules(&rules).is_err());
    }

    #[test]
    fn gap_policy_defaults_to_permissive() {
        assert_eq!(table().gap_policy(), GapPolicy::Permissive);
        assert_eq!(
            table().with_gap_policy(GapPolicy::Strict).gap_policy(),
            GapPolicy::Strict
        );
    }
}

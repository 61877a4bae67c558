//! Version range expressions.
//!
//! A [`Constraint`] is a disjunction of alternatives, each alternative a
//! conjunction of [`Comparator`]s over [`semver::Version`]. The accepted
//! syntax follows Composer conventions: `~1.2`, `^1.2.3`, `>=2.2 <2.3`,
//! `7.0.* | 7.1.*`, `1.0 - 2.0`, `*`.

pub mod lexer;

use std::fmt;

use cloudock_common::types::parse_version;
use semver::Version;

use self::lexer::{Operator, Token};
use crate::error::{ConfigurationError, Result};

/// Version values that satisfy every constraint.
const ANY_VERSION: [&str; 2] = ["latest", "*"];

/// A single bound on a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    op: Bound,
    version: Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparator {
    const fn new(op: Bound, version: Version) -> Self {
        Self { op, version }
    }

    /// Returns whether `version` satisfies this bound.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        match self.op {
            Bound::Eq => version == &self.version,
            Bound::Ne => version != &self.version,
            Bound::Gt => version > &self.version,
            Bound::Ge => version >= &self.version,
            Bound::Lt => version < &self.version,
            Bound::Le => version <= &self.version,
        }
    }
}

/// A parsed version range expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    source: String,
    alternatives: Vec<Vec<Comparator>>,
}

impl Constraint {
    /// Parses a constraint expression.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidConstraint`] if the expression is
    /// empty or malformed.
    pub fn parse(expression: &str) -> Result<Self> {
        let tokens = lexer::tokenize(expression)?;
        let invalid = |message: &str| ConfigurationError::InvalidConstraint {
            expression: expression.to_string(),
            message: message.to_string(),
        };
        if tokens.is_empty() {
            return Err(invalid("empty constraint"));
        }

        let mut alternatives = Vec::new();
        for group in tokens.split(|t| *t == Token::Or) {
            if group.is_empty() {
                return Err(invalid("empty alternative"));
            }
            alternatives.push(parse_alternative(group).map_err(|m| invalid(&m))?);
        }

        Ok(Self {
            source: expression.trim().to_string(),
            alternatives,
        })
    }

    /// Returns whether `version` satisfies at least one alternative.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives
            .iter()
            .any(|all| all.iter().all(|c| c.matches(version)))
    }

    /// Returns whether a raw version string satisfies the constraint.
    ///
    /// `latest` and `*` satisfy every constraint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidVersion`] if the string is not a
    /// recognizable version.
    pub fn allows(&self, raw: &str) -> Result<bool> {
        if is_any_version(raw) {
            return Ok(true);
        }
        let version = parse_version(raw).ok_or_else(|| ConfigurationError::InvalidVersion {
            value: raw.to_string(),
        })?;
        Ok(self.matches(&version))
    }

    /// Returns the expression as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Returns whether `raw` names the floating "any version" release.
#[must_use]
pub fn is_any_version(raw: &str) -> bool {
    let raw = raw.trim();
    ANY_VERSION.iter().any(|any| raw.eq_ignore_ascii_case(any))
}

/// A version literal with optional trailing wildcard, e.g. `7.0.*`.
#[derive(Debug)]
struct Partial {
    parts: Vec<u64>,
    wildcard: bool,
}

impl Partial {
    fn parse(literal: &str) -> std::result::Result<Self, String> {
        let literal = literal
            .strip_prefix(['v', 'V'])
            .unwrap_or(literal);
        let core = literal.split(['-', '+']).next().unwrap_or_default();
        let mut parts = Vec::new();
        let mut wildcard = false;
        for piece in core.split('.') {
            if matches!(piece, "*" | "x" | "X") {
                wildcard = true;
                break;
            }
            if parts.len() == 3 {
                break;
            }
            parts.push(
                piece
                    .parse()
                    .map_err(|_| format!("invalid version literal \"{literal}\""))?,
            );
        }
        Ok(Self { parts, wildcard })
    }

    fn filled(&self) -> Version {
        let part = |i: usize| self.parts.get(i).copied().unwrap_or(0);
        Version::new(part(0), part(1), part(2))
    }

    /// Smallest version above everything this literal covers when its
    /// last given component is treated as significant.
    fn bump_last(&self) -> Option<Version> {
        match self.parts.as_slice() {
            [] => None,
            [major] => Some(Version::new(major + 1, 0, 0)),
            [major, minor] => Some(Version::new(*major, minor + 1, 0)),
            [major, minor, patch, ..] => Some(Version::new(*major, *minor, patch + 1)),
        }
    }
}

fn parse_alternative(tokens: &[Token]) -> std::result::Result<Vec<Comparator>, String> {
    let mut comparators = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        match &tokens[pos] {
            Token::Comma => {
                pos += 1;
            }
            Token::Op(op) => {
                let Some(Token::Version(literal)) = tokens.get(pos + 1) else {
                    return Err(format!("expected version after {op:?}"));
                };
                comparators.extend(expand_operator(*op, &Partial::parse(literal)?));
                pos += 2;
            }
            Token::Version(low) => {
                if tokens.get(pos + 1) == Some(&Token::Hyphen) {
                    let Some(Token::Version(high)) = tokens.get(pos + 2) else {
                        return Err("expected upper bound of hyphen range".into());
                    };
                    comparators.extend(expand_hyphen(&Partial::parse(low)?, &Partial::parse(high)?));
                    pos += 3;
                } else {
                    comparators.extend(expand_exact(&Partial::parse(low)?));
                    pos += 1;
                }
            }
            other => return Err(format!("unexpected token {other:?}")),
        }
    }

    Ok(comparators)
}

fn expand_exact(partial: &Partial) -> Vec<Comparator> {
    if !partial.wildcard {
        return vec![Comparator::new(Bound::Eq, partial.filled())];
    }
    let mut bounds = Vec::new();
    if !partial.parts.is_empty() {
        bounds.push(Comparator::new(Bound::Ge, partial.filled()));
    }
    if let Some(upper) = partial.bump_last() {
        bounds.push(Comparator::new(Bound::Lt, upper));
    }
    bounds
}

fn expand_operator(op: Operator, partial: &Partial) -> Vec<Comparator> {
    let version = partial.filled();
    match op {
        Operator::Eq => expand_exact(partial),
        Operator::Ne => vec![Comparator::new(Bound::Ne, version)],
        Operator::Gt => vec![Comparator::new(Bound::Gt, version)],
        Operator::Ge => vec![Comparator::new(Bound::Ge, version)],
        Operator::Lt => vec![Comparator::new(Bound::Lt, version)],
        Operator::Le => vec![Comparator::new(Bound::Le, version)],
        Operator::Tilde => {
            let upper = match partial.parts.as_slice() {
                [] => return Vec::new(),
                [major] | [major, _] => Version::new(major + 1, 0, 0),
                [major, minor, ..] => Version::new(*major, minor + 1, 0),
            };
            vec![
                Comparator::new(Bound::Ge, version),
                Comparator::new(Bound::Lt, upper),
            ]
        }
        Operator::Caret => {
            let upper = match partial.parts.as_slice() {
                [] => return Vec::new(),
                [0] => Version::new(1, 0, 0),
                [0, 0] => Version::new(0, 1, 0),
                [0, 0, patch, ..] => Version::new(0, 0, patch + 1),
                [0, minor, ..] => Version::new(0, minor + 1, 0),
                [major, ..] => Version::new(major + 1, 0, 0),
            };
            vec![
                Comparator::new(Bound::Ge, version),
                Comparator::new(Bound::Lt, upper),
            ]
        }
    }
}

fn expand_hyphen(low: &Partial, high: &Partial) -> Vec<Comparator> {
    let mut bounds = vec![Comparator::new(Bound::Ge, low.filled())];
    if high.parts.len() >= 3 && !high.wildcard {
        bounds.push(Comparator::new(Bound::Le, high.filled()));
    } else if let Some(upper) = high.bump_last() {
        bounds.push(Comparator::new(Bound::Lt, upper));
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allows(expression: &str, version: &str) -> bool {
        Constraint::parse(expression)
            .expect("parse")
            .allows(version)
            .expect("version")
    }

    #[test]
    fn tilde_with_patch_locks_minor() {
        assert!(allows("~1.7.0", "1.7.9"));
        assert!(!allows("~1.7.0", "1.8.0"));
        assert!(!allows("~1.7.0", "1.6.9"));
    }

    #[test]
    fn tilde_with_minor_locks_major() {
        assert!(allows("~4.0", "4.5"));
        assert!(allows("~4.0", "4.0.9"));
        assert!(!allows("~4.0", "5.0"));
    }

    #[test]
    fn caret_locks_first_nonzero_component() {
        assert!(allows("^1.2.3", "1.9.0"));
        assert!(!allows("^1.2.3", "2.0.0"));
        assert!(allows("^0.3", "0.3.7"));
        assert!(!allows("^0.3", "0.4.0"));
    }

    #[test]
    fn space_separated_comparators_are_conjunctive() {
        assert!(allows(">=2.2.0 <2.3.0", "2.2.8"));
        assert!(!allows(">=2.2.0 <2.3.0", "2.3.0"));
        assert!(allows(">=2.2.0, <2.3.0", "2.2.0"));
    }

    #[test]
    fn alternatives_are_disjunctive() {
        let c = Constraint::parse(">=2.2.0 <2.2.8 || 2.3.0").expect("parse");
        assert!(c.allows("2.2.4").expect("version"));
        assert!(c.allows("2.3.0").expect("version"));
        assert!(!c.allows("2.3.1").expect("version"));
        assert!(!c.allows("2.2.8").expect("version"));
    }

    #[test]
    fn single_pipe_wildcards() {
        assert!(allows("7.0.* | 7.1.*", "7.1.22"));
        assert!(!allows("7.0.* | 7.1.*", "7.2"));
    }

    #[test]
    fn major_wildcard_covers_all_minors() {
        assert!(allows("7.*", "7.3.1"));
        assert!(!allows("7.*", "8.0"));
        assert!(!allows("7.*", "5.6"));
    }

    #[test]
    fn star_matches_everything() {
        assert!(allows("*", "0.0.1"));
        assert!(allows("*", "99.1"));
    }

    #[test]
    fn hyphen_range_partial_upper_bound_is_exclusive_bump() {
        assert!(allows("1.0 - 2.0", "2.0.5"));
        assert!(!allows("1.0 - 2.0", "2.1.0"));
        assert!(allows("1.0.0 - 2.0.0", "2.0.0"));
        assert!(!allows("1.0.0 - 2.0.0", "2.0.1"));
    }

    #[test]
    fn latest_satisfies_any_constraint() {
        assert!(allows("~1.9.0", "latest"));
        assert!(allows("~1.9.0", "*"));
    }

    #[test]
    fn not_equal_excludes_single_version() {
        assert!(allows(">=1.0 !=1.5.0", "1.4.0"));
        assert!(!allows(">=1.0 !=1.5.0", "1.5.0"));
    }

    #[test]
    fn invalid_version_is_reported() {
        let c = Constraint::parse("~1.0").expect("parse");
        let err = c.allows("banana").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvalidVersion {
                value: "banana".into()
            }
        );
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        assert!(Constraint::parse("").is_err());
        assert!(Constraint::parse("~1.0 ||").is_err());
        assert!(Constraint::parse(">=").is_err());
        assert!(Constraint::parse("1.0 -").is_err());
    }

    #[test]
    fn display_keeps_source_text() {
        let c = Constraint::parse(" ~1.7.0 || ~2.4.0 ").expect("parse");
        assert_eq!(c.to_string(), "~1.7.0 || ~2.4.0");
    }
}

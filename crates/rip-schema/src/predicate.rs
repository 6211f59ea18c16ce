//! Version ranges and the named presence predicates built from them.

use std::fmt;

use rip_model::Version;
use serde::Deserialize;

/// Half-open version range: `since` is inclusive, `until` exclusive.
///
/// A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionRange {
    #[serde(default)]
    pub since: Option<Version>,
    #[serde(default)]
    pub until: Option<Version>,
}

impl VersionRange {
    /// Range admitting every version.
    pub const ALL: Self = Self {
        since: None,
        until: None,
    };

    #[must_use]
    pub const fn since(version: Version) -> Self {
        Self {
            since: Some(version),
            until: None,
        }
    }

    #[must_use]
    pub fn contains(&self, version: &Version) -> bool {
        self.since.is_none_or(|since| *version >= since)
            && self.until.is_none_or(|until| *version < until)
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.since.is_none() && self.until.is_none()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.since, self.until) {
            (None, None) => f.write_str("all"),
            (Some(since), None) => write!(f, ">= {since}"),
            (None, Some(until)) => write!(f, "< {until}"),
            (Some(since), Some(until)) => write!(f, "{since} .. {until}"),
        }
    }
}

/// A resolved `when` clause: a named range, optionally negated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    name: String,
    range: VersionRange,
    negated: bool,
}

impl Condition {
    #[must_use]
    pub fn new(name: impl Into<String>, range: VersionRange, negated: bool) -> Self {
        Self {
            name: name.into(),
            range,
            negated,
        }
    }

    /// Split a `when` reference into its predicate name and negation flag.
    #[must_use]
    pub fn parse_reference(reference: &str) -> (&str, bool) {
        match reference.trim().strip_prefix('!') {
            Some(name) => (name.trim(), true),
            None => (reference.trim(), false),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    #[must_use]
    pub fn holds(&self, version: &Version) -> bool {
        self.range.contains(version) != self.negated
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Version {
        text.parse().unwrap()
    }

    #[test]
    fn test_range_bounds() {
        let range = VersionRange {
            since: Some(v("5.5")),
            until: Some(v("5.6")),
        };
        assert!(!range.contains(&v("5.4.6f1")));
        assert!(range.contains(&v("5.5.0a1")));
        assert!(range.contains(&v("5.5.4p3")));
        assert!(!range.contains(&v("5.6.0a0")));
        assert!(!range.contains(&v("2017.1.0f3")));
        assert!(VersionRange::ALL.contains(&v("1.0.0f1")));
        assert_eq!(range.to_string(), "5.5.0a0 .. 5.6.0a0");
    }

    #[test]
    fn test_negated_condition() {
        let range = VersionRange::since(v("5.3"));
        let (name, negated) = Condition::parse_reference("!short_modes");
        assert_eq!(name, "short_modes");
        let condition = Condition::new(name, range, negated);
        assert!(condition.holds(&v("4.7.2f1")));
        assert!(!condition.holds(&v("5.3.0f1")));
        assert_eq!(condition.to_string(), "!short_modes");
    }

    #[test]
    fn test_deserialize_range() {
        let range: VersionRange = toml::from_str(r#"since = "2017.1.0b2""#).unwrap();
        assert_eq!(range.since, Some(v("2017.1.0b2")));
        assert_eq!(range.until, None);
        assert!(toml::from_str::<VersionRange>(r#"from = "5.0""#).is_err());
    }
}

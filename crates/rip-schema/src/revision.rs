//! Schema revision (`serializedVersion`) selection.

use rip_model::Version;
use serde::Deserialize;

/// One `(minimum version, revision)` rule.
///
/// A rule without `since` matches every version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevisionRule {
    #[serde(default)]
    pub since: Option<Version>,
    pub revision: u32,
}

impl RevisionRule {
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.since.is_none_or(|since| *version >= since)
    }
}

/// Pick the revision for `version`.
///
/// The matching rule with the highest threshold wins. With `topmost` set the
/// highest declared revision is returned whatever the version. `None` means
/// no rule matches, including when there are no rules at all.
#[must_use]
pub fn select_revision(rules: &[RevisionRule], version: &Version, topmost: bool) -> Option<u32> {
    if topmost {
        return rules.iter().map(|rule| rule.revision).max();
    }
    rules
        .iter()
        .filter(|rule| rule.matches(version))
        .max_by_key(|rule| rule.since)
        .map(|rule| rule.revision)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Version {
        text.parse().unwrap()
    }

    fn particle_rules() -> Vec<RevisionRule> {
        vec![
            RevisionRule {
                since: None,
                revision: 1,
            },
            RevisionRule {
                since: Some(v("5.5")),
                revision: 2,
            },
            RevisionRule {
                since: Some(v("5.6")),
                revision: 3,
            },
            RevisionRule {
                since: Some(v("2017.1.0b2")),
                revision: 4,
            },
        ]
    }

    #[test]
    fn test_highest_matching_threshold_wins() {
        let rules = particle_rules();
        assert_eq!(select_revision(&rules, &v("4.7.2f1"), false), Some(1));
        assert_eq!(select_revision(&rules, &v("5.4.6f3"), false), Some(1));
        assert_eq!(select_revision(&rules, &v("5.5.0f3"), false), Some(2));
        assert_eq!(select_revision(&rules, &v("5.6.1f1"), false), Some(3));
        assert_eq!(select_revision(&rules, &v("2017.1.0b1"), false), Some(3));
        assert_eq!(select_revision(&rules, &v("2017.1.0b2"), false), Some(4));
    }

    #[test]
    fn test_topmost_ignores_version() {
        let rules = particle_rules();
        assert_eq!(select_revision(&rules, &v("4.7.2f1"), true), Some(4));
    }

    #[test]
    fn test_no_match() {
        let rules = vec![RevisionRule {
            since: Some(v("3.5")),
            revision: 4,
        }];
        assert_eq!(select_revision(&rules, &v("3.4.0f5"), false), None);
        assert_eq!(select_revision(&[], &v("5.0.0f1"), false), None);
    }
}

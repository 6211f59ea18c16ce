//! Engine version descriptor.
//!
//! A [`Version`] is the producing engine's `major.minor.patch` triple plus a
//! release type and build ordinal, e.g. `5.5.0f3` or `2017.1.0b2`. The
//! ordering is total: the numeric triple first, then the release type rank
//! (`a < b < f < p < c`), then the build ordinal.
//!
//! Thresholds are ordinary versions whose omitted components take their
//! minimum value, so `Version::from((5, 3))` is `5.3.0a0` and admits every
//! 5.3 release.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Release type of an engine build, declared in rank order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum VersionType {
    #[default]
    Alpha,
    Beta,
    Final,
    Patch,
    China,
}

impl VersionType {
    /// Suffix letter used in version strings.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Alpha => 'a',
            Self::Beta => 'b',
            Self::Final => 'f',
            Self::Patch => 'p',
            Self::China => 'c',
        }
    }

    /// Parse a suffix letter.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'a' => Some(Self::Alpha),
            'b' => Some(Self::Beta),
            'f' => Some(Self::Final),
            'p' => Some(Self::Patch),
            'c' => Some(Self::China),
            _ => None,
        }
    }
}

/// Immutable engine version.
///
/// Field order matters: the derived `Ord` compares major, minor, patch,
/// release type and build in that sequence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u16,
    minor: u16,
    patch: u16,
    kind: VersionType,
    build: u16,
}

impl Version {
    /// Construct a fully specified version.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16, kind: VersionType, build: u16) -> Self {
        Self {
            major,
            minor,
            patch,
            kind,
            build,
        }
    }

    /// Lowest version sharing the given numeric triple.
    #[must_use]
    pub const fn threshold(major: u16, minor: u16, patch: u16) -> Self {
        Self::new(major, minor, patch, VersionType::Alpha, 0)
    }

    #[must_use]
    pub const fn major(&self) -> u16 {
        self.major
    }

    #[must_use]
    pub const fn minor(&self) -> u16 {
        self.minor
    }

    #[must_use]
    pub const fn patch(&self) -> u16 {
        self.patch
    }

    #[must_use]
    pub const fn kind(&self) -> VersionType {
        self.kind
    }

    #[must_use]
    pub const fn build(&self) -> u16 {
        self.build
    }

    /// Total order between two versions.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// `self >= threshold`.
    #[must_use]
    pub fn is_greater_equal(&self, threshold: impl Into<Version>) -> bool {
        *self >= threshold.into()
    }

    /// `self < threshold`.
    #[must_use]
    pub fn is_less(&self, threshold: impl Into<Version>) -> bool {
        *self < threshold.into()
    }
}

impl From<u16> for Version {
    fn from(major: u16) -> Self {
        Self::threshold(major, 0, 0)
    }
}

impl From<(u16, u16)> for Version {
    fn from((major, minor): (u16, u16)) -> Self {
        Self::threshold(major, minor, 0)
    }
}

impl From<(u16, u16, u16)> for Version {
    fn from((major, minor, patch): (u16, u16, u16)) -> Self {
        Self::threshold(major, minor, patch)
    }
}

impl From<(u16, u16, u16, VersionType, u16)> for Version {
    fn from((major, minor, patch, kind, build): (u16, u16, u16, VersionType, u16)) -> Self {
        Self::new(major, minor, patch, kind, build)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}{}{}",
            self.major,
            self.minor,
            self.patch,
            self.kind.as_char(),
            self.build
        )
    }
}

impl FromStr for Version {
    type Err = ModelError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ModelError::version_parse(input, "empty version"));
        }

        let split = text
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(text.len());
        let (numbers, suffix) = text.split_at(split);

        let mut components = [0u16; 3];
        let mut count = 0usize;
        for part in numbers.split('.') {
            if count == components.len() {
                return Err(ModelError::version_parse(input, "too many components"));
            }
            components[count] = part
                .parse()
                .map_err(|_| ModelError::version_parse(input, "invalid numeric component"))?;
            count += 1;
        }

        let (kind, build) = match suffix.chars().next() {
            None => (VersionType::Alpha, 0),
            Some(letter) => {
                if count != components.len() {
                    return Err(ModelError::version_parse(
                        input,
                        "release type requires major.minor.patch",
                    ));
                }
                let kind = VersionType::from_char(letter)
                    .ok_or_else(|| ModelError::version_parse(input, "unknown release type"))?;
                let digits = &suffix[letter.len_utf8()..];
                let build = if digits.is_empty() {
                    0
                } else {
                    digits
                        .parse()
                        .map_err(|_| ModelError::version_parse(input, "invalid build ordinal"))?
                };
                (kind, build)
            }
        };

        let [major, minor, patch] = components;
        Ok(Self::new(major, minor, patch, kind, build))
    }
}

impl TryFrom<String> for Version {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}
